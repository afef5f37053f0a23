//! monorel - Release automation for Python workspace monorepos.
//!
//! monorel releases one package of a uv workspace at a time: it reads the
//! commits that touched the package since its last tag, decides the next
//! version from their conventional commit types, updates `pyproject.toml`
//! and the changelog, tags, and publishes a hosting release.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`commit`] - Conventional commit parsing with monorepo path filters
//! - [`config`] - `[tool.semantic_release]` configuration
//! - [`error`] - Error types and result aliases
//! - [`git`] - Git repository access
//! - [`release`] - Version planning, changelog, hosting API and publishing
//! - [`secrets`] - Hosting token handling and output masking
//! - [`shell`] - Shell command execution
//! - [`ui`] - Prompts, spinners, and terminal output
//! - [`workspace`] - Workspace layout, manifests and dependency pinning
//!
//! # Example
//!
//! ```
//! use monorel::commit::{LevelBump, MessageParser, ParserOptions};
//!
//! let parser = MessageParser::new(ParserOptions::default()).unwrap();
//! let parsed = parser.parse("feat(api): add endpoint").unwrap();
//! assert_eq!(parsed.bump, LevelBump::Minor);
//! assert_eq!(parsed.scope.as_deref(), Some("api"));
//! ```
//!
//! For workspace-level behaviour, see the integration tests.

pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod release;
pub mod secrets;
pub mod shell;
pub mod ui;
pub mod workspace;

pub use error::{MonorelError, Result};
