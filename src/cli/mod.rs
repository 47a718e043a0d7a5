//! Command-line interface for adsage
//!
//! - `args`: clap argument definitions
//! - `run`: entry point and command dispatch
//! - `commands`: command implementations

pub mod args;
mod commands;
mod run;

#[cfg(test)]
mod tests;

pub use args::{Cli, Commands};
pub use run::run;
