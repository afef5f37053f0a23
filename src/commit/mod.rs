//! Conventional commit parsing for monorepo packages.
//!
//! - [`bump`] - Version bump levels
//! - [`options`] - Parser options read from `pyproject.toml`
//! - [`paths`] - Path filters selecting a package's files
//! - [`message`] - Commit message grammar
//! - [`parser`] - Combined message and changed-file classification

pub mod bump;
pub mod message;
pub mod options;
pub mod parser;
pub mod paths;

pub use bump::LevelBump;
pub use message::{long_type_name, parse_paragraphs, sort_numerically, MessageParser, ParsedMessage};
pub use options::ParserOptions;
pub use parser::{MonorepoParser, ParseError, ParseResult, ParsedCommit};
pub use paths::PathFilters;
