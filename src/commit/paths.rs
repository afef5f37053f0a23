//! Path filters deciding which changed files belong to a package.
//!
//! Filters follow gitignore conventions loosely: a plain path selects the
//! path itself and everything below it, a trailing `/` selects only the
//! contents of a directory, a trailing `*` is taken as written, and a leading
//! `!` turns the filter into an exclusion. Matching is fnmatch-like, so `*`
//! also crosses directory separators.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{MonorelError, Result};

/// Compiled selection and exclusion filters.
#[derive(Debug, Clone)]
pub struct PathFilters {
    select: GlobSet,
    ignore: GlobSet,
    select_patterns: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl PathFilters {
    /// Compile filters written relative to `base_dir` into repo-relative globs.
    ///
    /// Both directories should already be canonical; filters that resolve
    /// outside `repo_root` are rejected.
    pub fn new(filters: &[String], base_dir: &Path, repo_root: &Path) -> Result<Self> {
        let mut select_patterns = Vec::new();
        let mut ignore_patterns = Vec::new();

        for filter in filters {
            let (negated, raw) = match filter.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, filter.as_str()),
            };

            let relative = repo_relative(raw, base_dir, repo_root).ok_or_else(|| {
                MonorelError::InvalidParserOptions {
                    message: format!(
                        "path filter '{}' resolves outside the repository root {}",
                        filter,
                        repo_root.display()
                    ),
                }
            })?;

            let target = if negated {
                &mut ignore_patterns
            } else {
                &mut select_patterns
            };
            target.extend(expand(raw, &relative));
        }

        Ok(Self {
            select: build_set(&select_patterns)?,
            ignore: build_set(&ignore_patterns)?,
            select_patterns,
            ignore_patterns,
        })
    }

    /// Whether a repo-relative path passes the filters.
    pub fn is_selected(&self, path: &str) -> bool {
        self.select.is_match(path) && !self.ignore.is_match(path)
    }

    /// Keep only the paths that pass the filters, preserving order.
    pub fn select<'a>(&self, paths: &'a [String]) -> Vec<&'a str> {
        paths
            .iter()
            .map(String::as_str)
            .filter(|p| self.is_selected(p))
            .collect()
    }

    /// Expanded selection globs (repo-relative).
    pub fn select_patterns(&self) -> &[String] {
        &self.select_patterns
    }

    /// Expanded exclusion globs (repo-relative).
    pub fn ignore_patterns(&self) -> &[String] {
        &self.ignore_patterns
    }
}

/// Expand one filter into the globs that implement its directory semantics.
fn expand(raw: &str, relative: &str) -> Vec<String> {
    if relative.is_empty() {
        return vec!["**".to_string()];
    }
    if raw.ends_with('*') {
        vec![relative.to_string()]
    } else if raw.ends_with('/') {
        vec![format!("{}/**", relative)]
    } else {
        vec![format!("{}/**", relative), relative.to_string()]
    }
}

fn repo_relative(raw: &str, base_dir: &Path, repo_root: &Path) -> Option<String> {
    let joined = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        base_dir.join(raw)
    };
    let normalized = normalize(&joined);
    let relative = normalized.strip_prefix(normalize(repo_root)).ok()?;

    Some(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Resolve `.` and `..` without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| MonorelError::InvalidParserOptions {
            message: format!("invalid path filter '{}': {}", pattern, e),
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| MonorelError::InvalidParserOptions {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(list: &[&str], base: &str) -> PathFilters {
        let list: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        PathFilters::new(&list, Path::new(base), Path::new("/repo")).unwrap()
    }

    #[test]
    fn dot_selects_package_directory() {
        let f = filters(&["."], "/repo/packages/core");
        assert!(f.is_selected("packages/core/src/core/__init__.py"));
        assert!(f.is_selected("packages/core/pyproject.toml"));
        assert!(!f.is_selected("packages/svc1/pyproject.toml"));
        assert!(!f.is_selected("README.md"));
    }

    #[test]
    fn repo_root_selects_everything() {
        let f = filters(&["."], "/repo");
        assert_eq!(f.select_patterns(), &["**"]);
        assert!(f.is_selected("README.md"));
        assert!(f.is_selected("packages/core/x.py"));
    }

    #[test]
    fn plain_path_expands_to_self_and_children() {
        let f = filters(&["src"], "/repo/packages/core");
        assert_eq!(
            f.select_patterns(),
            &["packages/core/src/**", "packages/core/src"]
        );
    }

    #[test]
    fn trailing_slash_selects_only_children() {
        let f = filters(&["docs/"], "/repo");
        assert_eq!(f.select_patterns(), &["docs/**"]);
    }

    #[test]
    fn trailing_star_is_kept() {
        let f = filters(&["src/*"], "/repo");
        assert_eq!(f.select_patterns(), &["src/*"]);
        assert!(f.is_selected("src/main.py"));
    }

    #[test]
    fn inner_star_also_selects_children() {
        let f = filters(&["src/*.py"], "/repo");
        assert_eq!(f.select_patterns(), &["src/*.py/**", "src/*.py"]);
        assert!(f.is_selected("src/main.py"));
    }

    #[test]
    fn negated_filter_excludes() {
        let f = filters(&[".", "!tests"], "/repo/packages/core");
        assert!(f.is_selected("packages/core/src/lib.py"));
        assert!(!f.is_selected("packages/core/tests/test_lib.py"));
        assert_eq!(
            f.ignore_patterns(),
            &["packages/core/tests/**", "packages/core/tests"]
        );
    }

    #[test]
    fn parent_references_are_normalized() {
        let f = filters(&["../shared"], "/repo/packages/core");
        assert!(f.is_selected("packages/shared/util.py"));
    }

    #[test]
    fn filter_outside_repo_is_rejected() {
        let list = vec!["../../../etc".to_string()];
        let result = PathFilters::new(&list, Path::new("/repo/packages/core"), Path::new("/repo"));
        assert!(matches!(
            result,
            Err(MonorelError::InvalidParserOptions { .. })
        ));
    }

    #[test]
    fn select_preserves_order() {
        let f = filters(&["."], "/repo/packages/core");
        let files = vec![
            "packages/core/b.py".to_string(),
            "README.md".to_string(),
            "packages/core/a.py".to_string(),
        ];
        assert_eq!(f.select(&files), vec!["packages/core/b.py", "packages/core/a.py"]);
    }

    #[test]
    fn normalize_handles_dots() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }
}
