//! Release configuration.
//!
//! Configuration lives in each package's `pyproject.toml` under
//! `[tool.semantic_release]`:
//!
//! ```toml
//! [tool.semantic_release]
//! tag_format = "core-v{version}"
//!
//! [tool.semantic_release.commit_parser_options]
//! scope_prefix = "core-"
//! path_filters = ["."]
//!
//! [tool.semantic_release.publish]
//! upload_to_pypi = false
//! upload_to_release = true
//! ```
//!
//! # Example
//!
//! ```
//! use monorel::config::ReleaseConfig;
//!
//! let config: ReleaseConfig = toml::from_str("tag_format = \"core-v{version}\"").unwrap();
//! assert_eq!(config.tag_format_for("core", false), "core-v{version}");
//! assert!(config.publish.upload_to_release);
//! ```

pub mod release;

pub use release::{PublishConfig, ReleaseConfig, RemoteConfig, DEFAULT_TOKEN_VAR};
