mod formatter;

pub use formatter::{format_report, format_tsv, should_use_colors};
