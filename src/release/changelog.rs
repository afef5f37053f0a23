//! Markdown changelog rendering.
//!
//! A release section looks like:
//!
//! ```text
//! ## core-v0.2.0 (2026-01-31)
//!
//! ### Breaking Changes
//!
//! - drop python 3.9
//!
//! ### Features
//!
//! - **api**: add retries (1a2b3c4)
//! ```
//!
//! New sections go on top, below the file title (or below a
//! `<!-- version list -->` marker when the file has one).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::commit::ParsedCommit;
use crate::error::Result;

/// Title written to a new changelog.
pub const CHANGELOG_TITLE: &str = "# CHANGELOG";

/// Insertion marker honoured when present.
pub const INSERTION_MARKER: &str = "<!-- version list -->";

/// Categories listed first, in this order; the rest follow alphabetically.
const LEADING_CATEGORIES: &[&str] = &["features", "bug fixes", "performance improvements"];

/// Release notes for a set of commits, without a heading.
///
/// `commit_url` is the base for commit links, e.g.
/// `https://github.com/acme/mono/commit`; hashes are plain text without it.
pub fn release_notes(commits: &[&ParsedCommit], commit_url: Option<&str>) -> String {
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();

    let breaking: Vec<String> = commits
        .iter()
        .filter(|c| c.message.is_breaking())
        .flat_map(|c| {
            if c.message.breaking_descriptions.is_empty() {
                vec![entry(c, c.message.subject(), commit_url)]
            } else {
                c.message
                    .breaking_descriptions
                    .iter()
                    .map(|d| entry(c, d, commit_url))
                    .collect()
            }
        })
        .collect();
    if !breaking.is_empty() {
        sections.push(("Breaking Changes".to_string(), breaking));
    }

    let mut by_category: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for commit in commits {
        by_category
            .entry(commit.message.category.as_str())
            .or_default()
            .push(entry(commit, commit.message.subject(), commit_url));
    }

    for category in LEADING_CATEGORIES {
        if let Some(entries) = by_category.remove(category) {
            sections.push((title_case(category), entries));
        }
    }
    for (category, entries) in by_category {
        sections.push((title_case(category), entries));
    }

    let mut out = String::new();
    for (title, entries) in sections {
        out.push_str(&format!("### {}\n\n", title));
        for line in entries {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// A full release section with its `## tag (date)` heading.
pub fn render_section(
    tag: &str,
    date: NaiveDate,
    commits: &[&ParsedCommit],
    commit_url: Option<&str>,
) -> String {
    let notes = release_notes(commits, commit_url);
    let heading = format!("## {} ({})", tag, date.format("%Y-%m-%d"));
    if notes.is_empty() {
        format!("{}\n\nNo notable changes.\n", heading)
    } else {
        format!("{}\n\n{}\n", heading, notes)
    }
}

/// Insert `section` at the top of an existing changelog.
pub fn prepend_section(existing: &str, section: &str) -> String {
    if existing.trim().is_empty() {
        return format!("{}\n\n{}", CHANGELOG_TITLE, section);
    }

    if let Some(pos) = existing.find(INSERTION_MARKER) {
        let (head, rest) = existing.split_at(pos + INSERTION_MARKER.len());
        return format!("{}\n\n{}\n{}", head, section, rest.trim_start_matches('\n'));
    }

    match existing.split_once('\n') {
        Some((title, rest)) if title.starts_with("# ") => {
            format!("{}\n\n{}\n{}", title, section, rest.trim_start_matches('\n'))
        }
        _ => format!("{}\n{}", section, existing),
    }
}

/// A package changelog file.
#[derive(Debug, Clone)]
pub struct Changelog {
    path: PathBuf,
}

impl Changelog {
    /// Changelog at `file` relative to the package directory.
    pub fn new(package_dir: &Path, file: &str) -> Self {
        Self {
            path: package_dir.join(file),
        }
    }

    /// Path of the changelog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contents of the file after adding `section`, without writing it.
    pub fn preview(&self, section: &str) -> Result<String> {
        let existing = if self.path.is_file() {
            fs::read_to_string(&self.path)?
        } else {
            String::new()
        };
        Ok(prepend_section(&existing, section))
    }

    /// Add `section` to the top of the file, creating it if needed.
    pub fn prepend(&self, section: &str) -> Result<()> {
        let contents = self.preview(section)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        tracing::debug!("Updated {}", self.path.display());
        Ok(())
    }
}

fn entry(commit: &ParsedCommit, text: &str, commit_url: Option<&str>) -> String {
    let hash = match commit_url {
        Some(base) => format!(
            "[`{}`]({}/{})",
            commit.short_sha(),
            base.trim_end_matches('/'),
            commit.sha
        ),
        None => commit.short_sha().to_string(),
    };
    match &commit.message.scope {
        Some(scope) => format!("- **{}**: {} ({})", scope, text, hash),
        None => format!("- {} ({})", text, hash),
    }
}

fn title_case(category: &str) -> String {
    category
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{MessageParser, ParserOptions};
    use tempfile::TempDir;

    fn commit(sha: &str, message: &str) -> ParsedCommit {
        let parser = MessageParser::new(ParserOptions::default()).unwrap();
        ParsedCommit {
            sha: sha.to_string(),
            message: parser.parse(message).unwrap(),
            relevant_files: vec![],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
    }

    #[test]
    fn renders_grouped_section() {
        let commits = [
            commit("1111111aaaa", "docs: explain setup"),
            commit("2222222bbbb", "fix(api): handle empty body"),
            commit("3333333cccc", "feat(cli)!: rename flag\n\nBREAKING CHANGE: --out is now --output"),
            commit("4444444dddd", "feat: add retries"),
        ];
        let refs: Vec<&ParsedCommit> = commits.iter().collect();

        insta::assert_snapshot!(render_section("core-v1.0.0", date(), &refs, None), @r"
        ## core-v1.0.0 (2026-01-31)

        ### Breaking Changes

        - **cli**: --out is now --output (3333333)

        ### Features

        - **cli**: rename flag (3333333)
        - add retries (4444444)

        ### Bug Fixes

        - **api**: handle empty body (2222222)

        ### Documentation

        - explain setup (1111111)
        ");
    }

    #[test]
    fn links_commits_when_url_known() {
        let commits = [commit("abcdef0123", "fix: typo")];
        let refs: Vec<&ParsedCommit> = commits.iter().collect();
        let notes = release_notes(&refs, Some("https://github.com/acme/mono/commit/"));
        assert_eq!(
            notes,
            "### Bug Fixes\n\n- typo ([`abcdef0`](https://github.com/acme/mono/commit/abcdef0123))"
        );
    }

    #[test]
    fn breaking_without_footer_uses_subject() {
        let commits = [commit("abcdef0123", "refactor!: drop python 3.9")];
        let refs: Vec<&ParsedCommit> = commits.iter().collect();
        let notes = release_notes(&refs, None);
        assert!(notes.starts_with("### Breaking Changes\n\n- drop python 3.9 (abcdef0)"));
        assert!(notes.contains("### Refactoring"));
    }

    #[test]
    fn empty_release_has_placeholder() {
        let section = render_section("v0.1.0", date(), &[], None);
        assert_eq!(section, "## v0.1.0 (2026-01-31)\n\nNo notable changes.\n");
    }

    #[test]
    fn prepends_below_title() {
        let existing = "# CHANGELOG\n\n## v0.1.0 (2025-12-01)\n\n- old\n";
        let updated = prepend_section(existing, "## v0.2.0 (2026-01-31)\n\n- new\n");
        assert_eq!(
            updated,
            "# CHANGELOG\n\n## v0.2.0 (2026-01-31)\n\n- new\n\n## v0.1.0 (2025-12-01)\n\n- old\n"
        );
    }

    #[test]
    fn prepends_below_marker() {
        let existing = "# Changes\n\nIntro text.\n\n<!-- version list -->\n\n## v0.1.0\n";
        let updated = prepend_section(existing, "## v0.2.0\n");
        assert_eq!(
            updated,
            "# Changes\n\nIntro text.\n\n<!-- version list -->\n\n## v0.2.0\n\n## v0.1.0\n"
        );
    }

    #[test]
    fn creates_new_changelog() {
        let temp = TempDir::new().unwrap();
        let changelog = Changelog::new(temp.path(), "CHANGELOG.md");
        changelog.prepend("## v0.1.0 (2026-01-31)\n\n- first\n").unwrap();

        let text = fs::read_to_string(changelog.path()).unwrap();
        assert_eq!(text, "# CHANGELOG\n\n## v0.1.0 (2026-01-31)\n\n- first\n");
    }

    #[test]
    fn title_cases_categories() {
        assert_eq!(title_case("performance improvements"), "Performance Improvements");
        assert_eq!(title_case("features"), "Features");
    }
}
