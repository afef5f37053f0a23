//! uv workspace layout and package manifests.
//!
//! A workspace has a root project at the top level and member packages under
//! `packages/<dir>`. Package names may carry a common prefix that is not part
//! of the directory name (`acme-core` lives in `packages/core`).

pub mod pyproject;
pub mod requirement;
pub mod sync;

pub use pyproject::{set_project_version, Pyproject};
pub use requirement::{normalize_name, Requirement};
pub use sync::{sync_dependencies, DependencyUpdate, SyncReport};

use std::path::{Path, PathBuf};

use crate::error::{MonorelError, Result};

/// Name used on the command line for the workspace root project.
pub const ROOT_PACKAGE: &str = "root";

/// Directory holding member packages.
pub const PACKAGES_DIR: &str = "packages";

/// A workspace rooted at a directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    prefix: String,
}

impl Workspace {
    /// Create a workspace view.
    ///
    /// `prefix` is stripped from package names to find their directories.
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Find the workspace enclosing `start`.
    ///
    /// Walks up to the nearest `pyproject.toml` with `[tool.uv.workspace]`;
    /// without one, `start` itself is treated as the root.
    pub fn discover(start: &Path, prefix: impl Into<String>) -> Self {
        let root = start
            .ancestors()
            .find(|dir| {
                let manifest = dir.join("pyproject.toml");
                manifest.is_file()
                    && Pyproject::load(&manifest)
                        .map(|m| m.is_workspace_root())
                        .unwrap_or(false)
            })
            .unwrap_or(start);
        tracing::debug!("workspace root: {}", root.display());
        Self::new(root, prefix)
    }

    /// Package containing `dir`: a member when `dir` is inside
    /// `packages/<dir>`, otherwise the root project.
    pub fn package_at(&self, dir: &Path) -> String {
        let member = dir
            .strip_prefix(self.root.join(PACKAGES_DIR))
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        match member {
            Some(name) => format!("{}{}", self.prefix, name),
            None => ROOT_PACKAGE.to_string(),
        }
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Package name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `name` refers to the root project.
    pub fn is_root(name: &str) -> bool {
        name == ROOT_PACKAGE
    }

    /// Directory of a package.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        if Self::is_root(name) {
            return self.root.clone();
        }
        let dir_name = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        self.root.join(PACKAGES_DIR).join(dir_name)
    }

    /// Path of a package's `pyproject.toml`.
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.package_dir(name).join("pyproject.toml")
    }

    /// Load a package.
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` if the package has no `pyproject.toml`.
    pub fn package(&self, name: &str) -> Result<Package> {
        let path = self.manifest_path(name);
        if !path.is_file() {
            return Err(MonorelError::ManifestNotFound {
                package: name.to_string(),
                path,
            });
        }

        Ok(Package {
            name: name.to_string(),
            dir: self.package_dir(name),
            manifest: Pyproject::load(&path)?,
        })
    }

    /// Names of member packages found under `packages/`, sorted.
    pub fn member_dirs(&self) -> Result<Vec<String>> {
        let dir = self.root.join(PACKAGES_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.path().join("pyproject.toml").is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A workspace package with its manifest.
#[derive(Debug, Clone)]
pub struct Package {
    /// Name as given on the command line (`root` for the root project).
    pub name: String,
    /// Package directory.
    pub dir: PathBuf,
    /// Parsed manifest.
    pub manifest: Pyproject,
}

impl Package {
    /// Whether this is the workspace root project.
    pub fn is_root(&self) -> bool {
        Workspace::is_root(&self.name)
    }

    /// Distribution name from the manifest, falling back to the CLI name.
    pub fn display_name(&self) -> &str {
        self.manifest.name().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn root_package_dir_is_workspace_root() {
        let ws = Workspace::new("/repo", "");
        assert_eq!(ws.package_dir("root"), PathBuf::from("/repo"));
        assert_eq!(ws.manifest_path("root"), PathBuf::from("/repo/pyproject.toml"));
    }

    #[test]
    fn member_dir_strips_prefix() {
        let ws = Workspace::new("/repo", "acme-");
        assert_eq!(ws.package_dir("acme-core"), PathBuf::from("/repo/packages/core"));
        assert_eq!(ws.package_dir("svc1"), PathBuf::from("/repo/packages/svc1"));
    }

    #[test]
    fn package_at_maps_directories() {
        let ws = Workspace::new("/repo", "acme-");
        assert_eq!(ws.package_at(Path::new("/repo/packages/core/src")), "acme-core");
        assert_eq!(ws.package_at(Path::new("/repo/packages/core")), "acme-core");
        assert_eq!(ws.package_at(Path::new("/repo")), "root");
        assert_eq!(ws.package_at(Path::new("/repo/docs")), "root");
    }

    #[test]
    fn discover_walks_up_to_workspace_root() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"mono\"\nversion = \"1.0.0\"\n\n[tool.uv.workspace]\nmembers = [\"packages/*\"]\n",
        )
        .unwrap();
        let member = temp.path().join("packages/core");
        fs::create_dir_all(&member).unwrap();
        fs::write(
            member.join("pyproject.toml"),
            "[project]\nname = \"core\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let ws = Workspace::discover(&member, "");
        assert_eq!(ws.root(), temp.path());
        assert_eq!(ws.package_at(&member), "core");
    }

    #[test]
    fn discover_without_workspace_uses_start() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::discover(temp.path(), "");
        assert_eq!(ws.root(), temp.path());
    }

    #[test]
    fn missing_manifest_is_reported() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path(), "");
        let err = ws.package("core").unwrap_err();
        assert!(matches!(err, MonorelError::ManifestNotFound { .. }));
        assert!(err.to_string().contains("core"));
    }

    #[test]
    fn loads_package() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("packages/core");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("pyproject.toml"),
            "[project]\nname = \"acme-core\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let ws = Workspace::new(temp.path(), "acme-");
        let pkg = ws.package("acme-core").unwrap();
        assert_eq!(pkg.display_name(), "acme-core");
        assert_eq!(pkg.manifest.version().unwrap(), "0.1.0");
        assert!(!pkg.is_root());
        assert_eq!(ws.member_dirs().unwrap(), vec!["core".to_string()]);
    }
}
