//! Error types for monorel operations.
//!
//! This module defines [`MonorelError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `MonorelError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `MonorelError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for monorel operations.
#[derive(Debug, Error)]
pub enum MonorelError {
    /// A package manifest was not found at the expected location.
    #[error("Missing pyproject.toml for {package} (looked in {path})")]
    ManifestNotFound { package: String, path: PathBuf },

    /// Failed to parse a package manifest.
    #[error("Failed to parse {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// The manifest is missing a field monorel needs.
    #[error("{path} is missing `{field}`")]
    ManifestFieldMissing { path: PathBuf, field: String },

    /// Commit parser options cannot be used to build a parser.
    #[error("Invalid commit parser options: {message}")]
    InvalidParserOptions { message: String },

    /// A version string could not be parsed.
    #[error("Invalid version '{version}'")]
    InvalidVersion { version: String },

    /// A tag template has no `{version}` placeholder.
    #[error("Invalid tag format '{format}': it must contain {{version}} exactly once")]
    InvalidTagFormat { format: String },

    /// A git command exited unsuccessfully.
    #[error("git {args} failed: {stderr}")]
    GitCommandFailed { args: String, stderr: String },

    /// The remote URL could not be understood.
    #[error("Unrecognized remote URL: {url}")]
    InvalidRemoteUrl { url: String },

    /// The hosting token environment variable is not set.
    #[error("No hosting token found; export {var} with a token that has contents read/write access")]
    TokenMissing { var: String },

    /// The hosting API rejected a request.
    #[error("Hosting API request to {endpoint} failed with status {status}: {message}")]
    HostingApi {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for monorel operations.
pub type Result<T> = std::result::Result<T, MonorelError>;
