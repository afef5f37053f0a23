//! Workspace dependency pinning.
//!
//! After a member package is released, every package that depends on it
//! through `[tool.uv.sources]` (`{ workspace = true }`) should pin the new
//! version in `project.dependencies`, so the published wheel requires the
//! exact sibling it was tested with.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;

use super::pyproject::{edit_document, replace_string};
use super::requirement::Requirement;
use super::Workspace;

/// One dependency whose pin changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyUpdate {
    /// Dependency name as written in the manifest.
    pub name: String,
    /// Previously pinned version, if there was one.
    pub from: Option<String>,
    /// New pinned version.
    pub to: String,
}

/// Result of a dependency sync.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Manifest that was examined.
    pub manifest: PathBuf,
    /// Whether the manifest has a `project.dependencies` array.
    pub has_dependencies: bool,
    /// Pins that changed.
    pub updates: Vec<DependencyUpdate>,
    /// Workspace dependencies left alone because they use a range specifier.
    pub skipped: Vec<String>,
    /// Dependency list after the sync.
    pub dependencies: Vec<String>,
}

impl SyncReport {
    /// Whether the manifest was rewritten.
    pub fn changed(&self) -> bool {
        !self.updates.is_empty()
    }
}

/// Pin the workspace dependencies of `package` to their current versions.
///
/// The manifest is rewritten only when a pin changes; untouched entries keep
/// their exact formatting.
///
/// # Errors
///
/// Fails if the package or any referenced workspace package has no
/// manifest, or if a referenced manifest has no version.
pub fn sync_dependencies(workspace: &Workspace, package: &str) -> Result<SyncReport> {
    let pkg = workspace.package(package)?;
    let manifest_path = pkg.manifest.path().to_path_buf();

    let Some(dependencies) = pkg.manifest.dependencies() else {
        tracing::debug!("No dependencies found in {}", manifest_path.display());
        return Ok(SyncReport {
            manifest: manifest_path,
            ..Default::default()
        });
    };

    let sources = pkg.manifest.workspace_sources();
    let mut rewrites: HashMap<String, String> = HashMap::new();
    let mut updates = Vec::new();
    let mut skipped = Vec::new();

    for dep in &dependencies {
        let Some(req) = Requirement::parse(dep) else {
            tracing::warn!("Ignoring unparsable dependency '{}'", dep);
            continue;
        };
        if !sources.contains(&req.normalized_name()) {
            continue;
        }
        if !req.is_pinnable() {
            tracing::debug!(
                "Leaving '{}' alone: only bare names and == pins are synced",
                dep
            );
            skipped.push(dep.clone());
            continue;
        }

        let sibling = workspace.package(&req.name)?;
        let version = sibling.manifest.version()?.to_string();
        let current = req.pinned_version().map(str::to_string);

        if current.as_deref() != Some(version.as_str()) {
            tracing::debug!(
                "Updating {} from {} to {}",
                req.name,
                current.as_deref().unwrap_or("None"),
                version
            );
            rewrites.insert(dep.clone(), req.pinned_to(&version).to_string());
            updates.push(DependencyUpdate {
                name: req.name.clone(),
                from: current,
                to: version,
            });
        }
    }

    let final_dependencies: Vec<String> = dependencies
        .iter()
        .map(|d| rewrites.get(d).cloned().unwrap_or_else(|| d.clone()))
        .collect();

    if !rewrites.is_empty() {
        let mut doc = edit_document(&manifest_path, pkg.manifest.text())?;
        if let Some(array) = doc
            .get_mut("project")
            .and_then(|p| p.get_mut("dependencies"))
            .and_then(|d| d.as_array_mut())
        {
            for value in array.iter_mut() {
                let replacement = value.as_str().and_then(|s| rewrites.get(s)).cloned();
                if let Some(new) = replacement {
                    replace_string(value, &new);
                }
            }
        }
        fs::write(&manifest_path, doc.to_string())?;
    } else {
        tracing::debug!("No dependency updates needed.");
    }

    Ok(SyncReport {
        manifest: manifest_path,
        has_dependencies: true,
        updates,
        skipped,
        dependencies: final_dependencies,
    })
}
