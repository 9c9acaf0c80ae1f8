//! Command-line interface for parmap
//!
//! A thin front end over the library: each subcommand loads configuration,
//! drives [`ParallelMap`](crate::parallel::ParallelMap) or reports on it, and
//! prints results to stdout.

pub mod commands;
mod output;

pub use commands::Cli;
pub use output::Output;
