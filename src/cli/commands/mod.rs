//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that work on a single
//! package resolve it through [`context::PackageContext`].

pub mod completions;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod doctor;
pub mod parse;
pub mod sync_deps;
pub mod version;

pub use context::PackageContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
