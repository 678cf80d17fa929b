pub mod accumulate;
pub mod adjust;
pub mod engine;
pub mod expr;
pub mod normalize;
pub mod rules;
pub mod validation;

pub use accumulate::{accumulate, Tally};
pub use engine::{score, ScoreReport};
pub use expr::ScaleExpr;
pub use normalize::ArchetypeScore;
pub use rules::{compile_rules, Condition, SelectionRef};
pub use validation::{config_warnings, validate_config};
