//! `pyproject.toml` reading and format-preserving edits.
//!
//! Reads go through `toml` into plain tables; writes go through `toml_edit`
//! so comments, ordering, and whitespace survive a version bump or a
//! dependency pin.

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use toml_edit::DocumentMut;

use crate::config::ReleaseConfig;
use crate::error::{MonorelError, Result};

use super::requirement::normalize_name;

/// A loaded package manifest.
#[derive(Debug, Clone)]
pub struct Pyproject {
    path: PathBuf,
    text: String,
    table: Table,
}

impl Pyproject {
    /// Read and parse a manifest.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file can't be read and `ManifestParseError` if the
    /// TOML is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(path, text)
    }

    /// Parse manifest text that came from `path`.
    pub fn parse(path: &Path, text: String) -> Result<Self> {
        let table: Table = toml::from_str(&text).map_err(|e| MonorelError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            table,
        })
    }

    /// Location of the manifest.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw manifest text.
    pub fn text(&self) -> &str {
        &self.text
    }

    fn project(&self) -> Option<&Table> {
        self.table.get("project").and_then(Value::as_table)
    }

    /// `project.name`, if present.
    pub fn name(&self) -> Option<&str> {
        self.project()?.get("name")?.as_str()
    }

    /// `project.version`.
    pub fn version(&self) -> Result<&str> {
        self.project()
            .and_then(|p| p.get("version"))
            .and_then(Value::as_str)
            .ok_or_else(|| MonorelError::ManifestFieldMissing {
                path: self.path.clone(),
                field: "project.version".to_string(),
            })
    }

    /// Whether this manifest declares a uv workspace (`[tool.uv.workspace]`).
    pub fn is_workspace_root(&self) -> bool {
        self.table
            .get("tool")
            .and_then(|t| t.get("uv"))
            .and_then(|t| t.get("workspace"))
            .is_some()
    }

    /// `project.dependencies`, or `None` when the key is absent.
    pub fn dependencies(&self) -> Option<Vec<String>> {
        let deps = self.project()?.get("dependencies")?.as_array()?;
        Some(
            deps.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Normalized names of `[tool.uv.sources]` entries that are exactly `{ workspace = true }`.
    pub fn workspace_sources(&self) -> Vec<String> {
        let Some(sources) = self
            .table
            .get("tool")
            .and_then(|t| t.get("uv"))
            .and_then(|t| t.get("sources"))
            .and_then(Value::as_table)
        else {
            return Vec::new();
        };

        sources
            .iter()
            .filter(|(_, source)| is_workspace_source(source))
            .map(|(name, _)| normalize_name(name))
            .collect()
    }

    /// `[tool.semantic_release]`, with defaults for anything missing.
    pub fn release_config(&self) -> Result<ReleaseConfig> {
        let Some(section) = self
            .table
            .get("tool")
            .and_then(|t| t.get("semantic_release"))
        else {
            return Ok(ReleaseConfig::default());
        };

        section
            .clone()
            .try_into::<ReleaseConfig>()
            .map_err(|e: toml::de::Error| MonorelError::ManifestParseError {
                path: self.path.clone(),
                message: format!("[tool.semantic_release]: {}", e),
            })
    }
}

fn is_workspace_source(source: &Value) -> bool {
    match source.as_table() {
        Some(table) => {
            table.len() == 1 && table.get("workspace").and_then(Value::as_bool) == Some(true)
        }
        None => false,
    }
}

/// Parse manifest text for editing.
pub(crate) fn edit_document(path: &Path, text: &str) -> Result<DocumentMut> {
    text.parse::<DocumentMut>()
        .map_err(|e| MonorelError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Replace a string value in place, keeping its surrounding whitespace and comments.
pub(crate) fn replace_string(value: &mut toml_edit::Value, new: &str) {
    let decor = value.decor().clone();
    let mut replacement = toml_edit::Value::from(new);
    *replacement.decor_mut() = decor;
    *value = replacement;
}

/// Rewrite `project.version`, preserving formatting.
pub fn set_project_version(path: &Path, text: &str, version: &str) -> Result<String> {
    let mut doc = edit_document(path, text)?;

    let value = doc
        .get_mut("project")
        .and_then(|p| p.get_mut("version"))
        .and_then(|v| v.as_value_mut())
        .ok_or_else(|| MonorelError::ManifestFieldMissing {
            path: path.to_path_buf(),
            field: "project.version".to_string(),
        })?;
    replace_string(value, version);

    Ok(doc.to_string())
}
