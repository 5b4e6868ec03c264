//! Tooling & Integration Layer
//!
//! Command-line entry points over the core reconciler. Keeps argument
//! parsing and output rendering out of the core modules.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
