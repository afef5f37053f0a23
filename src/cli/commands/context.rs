//! Package resolution shared by the release commands.
//!
//! Every command that works on one package resolves it the same way: the
//! workspace is discovered from the project directory, and when no package
//! is named, the package containing that directory is used.

use std::path::Path;

use anyhow::Context;

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::git::{GitRepo, RemoteUrl};
use crate::workspace::{Package, Workspace};

/// A resolved package with its release configuration.
#[derive(Debug, Clone)]
pub struct PackageContext {
    pub workspace: Workspace,
    pub package: Package,
    pub config: ReleaseConfig,
}

impl PackageContext {
    /// Resolve `name` (or the package at `project_root`) in the enclosing workspace.
    pub fn load(project_root: &Path, prefix: &str, name: Option<&str>) -> Result<Self> {
        let start = project_root
            .canonicalize()
            .with_context(|| format!("Project directory {} not found", project_root.display()))?;
        let workspace = Workspace::discover(&start, prefix);
        let name = match name {
            Some(name) => name.to_string(),
            None => workspace.package_at(&start),
        };
        tracing::debug!("resolved package '{}'", name);

        let package = workspace.package(&name)?;
        let config = package.manifest.release_config()?;
        Ok(Self {
            workspace,
            package,
            config,
        })
    }

    /// The git repository holding the package.
    pub fn repo(&self) -> Result<GitRepo> {
        GitRepo::discover(&self.package.dir)
    }

    /// Tag template for this package.
    pub fn tag_format(&self) -> String {
        self.config
            .tag_format_for(self.package.display_name(), self.package.is_root())
    }

    /// Parsed URL of the configured remote, if it exists and is understood.
    pub fn remote(&self, repo: &GitRepo) -> Option<RemoteUrl> {
        repo.remote_url(&self.config.remote.name)
            .ok()
            .flatten()
            .and_then(|url| url.parse().ok())
    }

    /// Base URL for commit links in release notes.
    pub fn commit_url(&self, repo: &GitRepo) -> Option<String> {
        self.remote(repo)
            .map(|r| format!("https://{}/{}/commit", r.host, r.slug()))
    }

    /// Path relative to the workspace root, for display.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(self.workspace.root())
            .unwrap_or(path)
            .display()
    }
}
