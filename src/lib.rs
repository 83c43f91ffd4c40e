//! Libover - inspect folder library overrides from the command line

pub mod cli;

pub use cli::{execute, Cli, Commands, Outcome};
