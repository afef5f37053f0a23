//! Monorepo-aware commit parser.
//!
//! A commit counts towards a package when its message is a valid
//! conventional commit and either it touches a file selected by the path
//! filters, or it is scoped with the package's scope prefix.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::git::Commit;

use super::message::{MessageParser, ParsedMessage};
use super::options::ParserOptions;
use super::paths::PathFilters;

/// A commit that contributes to the package release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommit {
    /// Full commit hash.
    pub sha: String,
    /// Parsed message content.
    #[serde(flatten)]
    pub message: ParsedMessage,
    /// Changed files that matched the path filters.
    pub relevant_files: Vec<String>,
}

impl ParsedCommit {
    /// Seven character abbreviated hash.
    pub fn short_sha(&self) -> &str {
        short(&self.sha)
    }
}

/// A commit that does not contribute, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Full commit hash.
    pub sha: String,
    /// Why the commit was rejected.
    pub error: String,
}

/// Outcome of parsing one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseResult {
    /// The commit contributes to the release.
    Parsed(ParsedCommit),
    /// The commit was rejected.
    Error(ParseError),
}

impl ParseResult {
    /// The parsed commit, if any.
    pub fn parsed(&self) -> Option<&ParsedCommit> {
        match self {
            Self::Parsed(c) => Some(c),
            Self::Error(_) => None,
        }
    }

    /// Hash of the commit this result is about.
    pub fn sha(&self) -> &str {
        match self {
            Self::Parsed(c) => &c.sha,
            Self::Error(e) => &e.sha,
        }
    }
}

/// Parses commits on behalf of one package in a monorepo.
#[derive(Debug, Clone)]
pub struct MonorepoParser {
    messages: MessageParser,
    filters: PathFilters,
    repo_root: PathBuf,
}

impl MonorepoParser {
    /// Create a parser for a package rooted at `base_dir` inside `repo_root`.
    ///
    /// Path filters in `options` are interpreted relative to `base_dir`.
    pub fn new(options: ParserOptions, base_dir: &Path, repo_root: &Path) -> Result<Self> {
        let repo_root = canonical(repo_root);
        let base_dir = canonical(base_dir);

        let filters = PathFilters::new(&options.path_filters, &base_dir, &repo_root)?;
        tracing::debug!(
            select = ?filters.select_patterns(),
            ignore = ?filters.ignore_patterns(),
            "compiled path filters"
        );

        Ok(Self {
            messages: MessageParser::new(options)?,
            filters,
            repo_root,
        })
    }

    /// Options in effect.
    pub fn options(&self) -> &ParserOptions {
        self.messages.options()
    }

    /// Compiled path filters.
    pub fn filters(&self) -> &PathFilters {
        &self.filters
    }

    /// Classify a commit.
    pub fn parse(&self, commit: &Commit) -> ParseResult {
        let relevant: Vec<String> = self
            .filters
            .select(&commit.changed_files)
            .into_iter()
            .map(str::to_string)
            .collect();

        let parsed = self.messages.parse(&commit.message);
        let prefix = self.options().scope_prefix.as_str();
        let prefix_missing = !prefix.is_empty() && !commit.subject_line().contains(prefix);

        if relevant.is_empty() {
            if parsed.is_none() {
                let error = if prefix_missing {
                    format!(
                        "Commit {} is not scoped with the scope prefix {} and has no changed files in the path filter(s) relative to the git root {}",
                        commit.short_sha(),
                        prefix,
                        self.repo_root.display()
                    )
                } else {
                    format_mismatch(&commit.message)
                };
                return rejected(commit, error);
            }

            let scoped = parsed.as_ref().is_some_and(|m| m.scope.is_some());
            if prefix.is_empty() || !scoped {
                return rejected(
                    commit,
                    format!(
                        "Commit {} has no changed files in the path filter(s) relative to the git root {}",
                        commit.short_sha(),
                        self.repo_root.display()
                    ),
                );
            }
        }

        let Some(message) = parsed else {
            let error = if prefix_missing {
                format!(
                    "Commit {} scope does not match scope prefix {}",
                    commit.short_sha(),
                    prefix
                )
            } else {
                format_mismatch(&commit.message)
            };
            return rejected(commit, error);
        };

        tracing::debug!(
            "commit {} introduces a {} level_bump",
            short(&commit.sha),
            message.bump
        );

        ParseResult::Parsed(ParsedCommit {
            sha: commit.sha.clone(),
            message,
            relevant_files: relevant,
        })
    }
}

fn rejected(commit: &Commit, error: String) -> ParseResult {
    tracing::debug!("{}", error);
    ParseResult::Error(ParseError {
        sha: commit.sha.clone(),
        error,
    })
}

fn format_mismatch(message: &str) -> String {
    format!("Format Mismatch! Unable to parse commit message: {:?}", message)
}

fn short(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| super::paths::normalize(path))
}
