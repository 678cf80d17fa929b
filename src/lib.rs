pub mod answers;
pub mod config;
pub mod output;
pub mod scoring;
