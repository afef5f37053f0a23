//! Git repository access.
//!
//! All operations shell out to the `git` binary, so they honour the user's
//! configuration (credentials, hooks, signing) exactly as a manual release
//! would.

pub mod remote;

pub use remote::{RemoteProtocol, RemoteUrl};

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;

use crate::error::{MonorelError, Result};

/// A commit as seen by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit hash.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Repo-relative paths changed relative to the first parent.
    pub changed_files: Vec<String>,
}

impl Commit {
    /// Seven character abbreviated hash.
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(7)]
    }

    /// First line of the message.
    pub fn subject_line(&self) -> &str {
        self.message.split('\n').next().unwrap_or("")
    }
}

/// A git working tree.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Find the repository containing `start`.
    pub fn discover(start: &Path) -> Result<Self> {
        let output = run_git(start, &["rev-parse", "--show-toplevel"])?;
        Ok(Self {
            root: PathBuf::from(output.trim()),
        })
    }

    /// Open a repository at a known root without checking it.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Top-level directory of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        run_git(&self.root, args)
    }

    /// Whether HEAD points at a commit.
    pub fn has_head(&self) -> bool {
        self.git(&["rev-parse", "--verify", "--quiet", "HEAD"]).is_ok()
    }

    /// Commits reachable from HEAD but not from `since`, newest first.
    pub fn commits_since(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        if !self.has_head() {
            return Ok(Vec::new());
        }

        let range = match since {
            Some(reference) => format!("{}..HEAD", reference),
            None => "HEAD".to_string(),
        };
        self.commits(&range)
    }

    /// Commits in a revision range, newest first.
    pub fn commits(&self, range: &str) -> Result<Vec<Commit>> {
        let shas = self.git(&["rev-list", range])?;
        shas.lines()
            .filter(|l| !l.is_empty())
            .map(|sha| self.commit(sha))
            .collect()
    }

    /// Load one commit with its message and changed files.
    pub fn commit(&self, sha: &str) -> Result<Commit> {
        let message = self.git(&["log", "-1", "--format=%B", sha])?;

        let files = self.git(&[
            "log",
            "-1",
            "--format=",
            "--name-only",
            "-m",
            "--first-parent",
            sha,
        ])?;
        let mut changed_files: Vec<String> = Vec::new();
        for file in files.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !changed_files.iter().any(|f| f == file) {
                changed_files.push(file.to_string());
            }
        }

        Ok(Commit {
            sha: sha.to_string(),
            message: message.trim_end().to_string(),
            changed_files,
        })
    }

    /// Tags matching a glob pattern that are ancestors of HEAD.
    pub fn merged_tags(&self, pattern: &str) -> Result<Vec<String>> {
        if !self.has_head() {
            return Ok(Vec::new());
        }
        let output = self.git(&["tag", "--list", pattern, "--merged", "HEAD"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Stage paths.
    pub fn add(&self, paths: &[&Path]) -> Result<()> {
        let mut args = vec!["add", "--"];
        let rendered: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        args.extend(rendered.iter().map(String::as_str));
        self.git(&args)?;
        Ok(())
    }

    /// Whether the index differs from HEAD.
    pub fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.git(&["diff", "--cached", "--name-only"])?.trim().is_empty())
    }

    /// Create a commit from the index.
    pub fn commit_staged(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message])?;
        Ok(())
    }

    /// Create an annotated tag at HEAD.
    pub fn tag(&self, name: &str, message: &str) -> Result<()> {
        self.git(&["tag", "-a", name, "-m", message])?;
        Ok(())
    }

    /// Push the current branch.
    pub fn push(&self, remote: &str) -> Result<()> {
        self.git(&["push", remote, "HEAD"])?;
        Ok(())
    }

    /// Push a single tag.
    pub fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}", tag);
        self.git(&["push", remote, &refspec])?;
        Ok(())
    }

    /// URL of a remote, if configured.
    pub fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.git(&["remote", "get-url", remote]) {
            Ok(url) => Ok(Some(url.trim().to_string())),
            Err(MonorelError::GitCommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Point a remote at a new URL.
    pub fn set_remote_url(&self, remote: &str, url: &str) -> Result<()> {
        self.git(&["remote", "set-url", remote, url])?;
        Ok(())
    }

    /// Set the committer identity for this repository.
    pub fn configure_identity(&self, name: &str, email: &str) -> Result<()> {
        self.git(&["config", "user.name", name])?;
        self.git(&["config", "user.email", email])?;
        Ok(())
    }
}

fn run_git(cwd: &Path, args: &[&str]) -> Result<String> {
    tracing::debug!("git {}", args.join(" "));

    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .context("Failed to run git; is it installed and on PATH?")?;

    if !output.status.success() {
        return Err(MonorelError::GitCommandFailed {
            args: args.join(" "),
            stderr: failure_reason(&output.stderr, &output.stdout),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Git reports some failures, like "nothing to commit", on stdout only.
fn failure_reason(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    if stderr.is_empty() {
        String::from_utf8_lossy(stdout).trim().to_string()
    } else {
        stderr
    }
}
