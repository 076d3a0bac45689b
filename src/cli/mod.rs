//! CLI argument parsing and command handling.

mod args;
pub mod help;
pub mod validators;

pub use args::{ClassifyArgs, Cli, Command, ConfigAction, VariantsAction};
