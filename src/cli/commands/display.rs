//! Shared display helpers for commit parse results.
//!
//! Used by `parse` and by `version --verbose` so a commit reads the same
//! wherever it is shown.

use crate::commit::{LevelBump, ParseResult};
use crate::ui::{OutputMode, UserInterface};

/// One-line summary of a parse result.
pub fn result_line(result: &ParseResult) -> String {
    match result {
        ParseResult::Parsed(commit) => {
            let scope = commit
                .message
                .scope
                .as_deref()
                .map(|s| format!("({})", s))
                .unwrap_or_default();
            format!(
                "{} {}{}: {} [{}]",
                commit.short_sha(),
                commit.message.commit_type,
                scope,
                commit.message.subject(),
                commit.message.bump
            )
        }
        ParseResult::Error(e) => {
            format!("{} skipped: {}", &e.sha[..e.sha.len().min(7)], e.error)
        }
    }
}

/// Print a parse result, styled by whether it counts towards a release.
pub fn show_result(ui: &mut dyn UserInterface, result: &ParseResult) {
    let line = result_line(result);
    match result {
        ParseResult::Parsed(commit) if commit.message.bump > LevelBump::NoRelease => {
            ui.success(&line)
        }
        _ => ui.message(&line),
    }

    if let ParseResult::Parsed(commit) = result {
        if ui.output_mode() == OutputMode::Verbose {
            for file in &commit.relevant_files {
                ui.message(&format!("    {}", file));
            }
        }
    }
}

/// Highest bump among parse results.
pub fn overall_bump(results: &[ParseResult]) -> LevelBump {
    results
        .iter()
        .filter_map(ParseResult::parsed)
        .map(|c| c.message.bump)
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{ParseError, ParsedCommit, ParsedMessage};
    use crate::ui::MockUI;

    fn parsed(bump: LevelBump) -> ParseResult {
        ParseResult::Parsed(ParsedCommit {
            sha: "0123456789abcdef".into(),
            message: ParsedMessage {
                bump,
                commit_type: "feat".into(),
                category: "features".into(),
                scope: Some("api".into()),
                descriptions: vec!["add endpoint".into()],
                breaking_descriptions: vec![],
                linked_issues: vec![],
                linked_merge_request: None,
            },
            relevant_files: vec!["packages/core/api.py".into()],
        })
    }

    fn rejected() -> ParseResult {
        ParseResult::Error(ParseError {
            sha: "fedcba9876543210".into(),
            error: "no files match the path filters".into(),
        })
    }

    #[test]
    fn formats_parsed_commit() {
        assert_eq!(
            result_line(&parsed(LevelBump::Minor)),
            "0123456 feat(api): add endpoint [minor]"
        );
    }

    #[test]
    fn formats_rejected_commit() {
        assert_eq!(
            result_line(&rejected()),
            "fedcba9 skipped: no files match the path filters"
        );
    }

    #[test]
    fn releasing_commits_are_successes() {
        let mut ui = MockUI::new();
        show_result(&mut ui, &parsed(LevelBump::Patch));
        show_result(&mut ui, &parsed(LevelBump::NoRelease));
        show_result(&mut ui, &rejected());
        assert_eq!(ui.successes().len(), 1);
        assert_eq!(ui.messages().len(), 2);
    }

    #[test]
    fn verbose_lists_files() {
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        show_result(&mut ui, &parsed(LevelBump::Minor));
        assert!(ui.has_message("packages/core/api.py"));
    }

    #[test]
    fn overall_bump_is_maximum() {
        let results = vec![parsed(LevelBump::Patch), rejected(), parsed(LevelBump::Minor)];
        assert_eq!(overall_bump(&results), LevelBump::Minor);
        assert_eq!(overall_bump(&[rejected()]), LevelBump::NoRelease);
    }
}
