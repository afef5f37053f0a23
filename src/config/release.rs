//! Release configuration schema.
//!
//! Maps `[tool.semantic_release]` in a package's `pyproject.toml`. Key names
//! match the release tool the workspace docs describe, so an existing
//! configuration keeps working.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::commit::ParserOptions;

/// Default environment variable holding the hosting token.
pub const DEFAULT_TOKEN_VAR: &str = "GH_TOKEN";

/// Release settings for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Tag template containing `{version}`; derived from the package name when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_format: Option<String>,

    /// Whether breaking changes on 0.x bump the major version.
    ///
    /// When false, a breaking change on 0.x bumps the minor version instead.
    pub major_on_zero: bool,

    /// Changelog file, relative to the package directory.
    pub changelog_file: String,

    /// Release commit message; `{tag}`, `{version}` and `{package}` are substituted.
    pub commit_message: String,

    /// Commit classification.
    pub commit_parser_options: ParserOptions,

    /// Where the release is published.
    pub publish: PublishConfig,

    /// Remote and token settings.
    pub remote: RemoteConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            tag_format: None,
            major_on_zero: true,
            changelog_file: "CHANGELOG.md".to_string(),
            commit_message: "chore(release): {tag} [skip ci]".to_string(),
            commit_parser_options: ParserOptions::default(),
            publish: PublishConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl ReleaseConfig {
    /// Tag template for a package, falling back to `{name}-v{version}` (or `v{version}` for the root).
    pub fn tag_format_for(&self, package: &str, is_root: bool) -> String {
        match &self.tag_format {
            Some(format) => format.clone(),
            None if is_root => "v{version}".to_string(),
            None => format!("{}-v{{version}}", package),
        }
    }

    /// Render the release commit message.
    pub fn render_commit_message(&self, package: &str, version: &str, tag: &str) -> String {
        self.commit_message
            .replace("{tag}", tag)
            .replace("{version}", version)
            .replace("{package}", package)
    }
}

/// `[tool.semantic_release.publish]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PublishConfig {
    /// Build and upload distributions to the package index.
    pub upload_to_pypi: bool,

    /// Create a release on the hosting platform.
    pub upload_to_release: bool,

    /// Build command run in the package directory before uploading.
    pub build_command: String,

    /// Upload command run in the package directory; the built files are appended.
    pub upload_command: String,

    /// Directory, relative to the package, the build command writes to.
    pub dist_dir: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            upload_to_pypi: false,
            upload_to_release: true,
            build_command: "uv build --out-dir dist".to_string(),
            upload_command: "uv publish".to_string(),
            dist_dir: "dist".to_string(),
        }
    }
}

/// `[tool.semantic_release.remote]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RemoteConfig {
    /// Git remote to push to.
    pub name: String,

    /// Environment variable holding the hosting token.
    pub token_var: String,

    /// Hosting API base URL; the `GITHUB_API_URL` environment variable wins when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            name: "origin".to_string(),
            token_var: DEFAULT_TOKEN_VAR.to_string(),
            api_url: None,
        }
    }
}
