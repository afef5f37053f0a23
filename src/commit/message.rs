//! Conventional commit message parsing.
//!
//! A message is accepted when its first line reads `type(scope)!: subject`,
//! where `type` is one of the configured commit types and the scope (if the
//! options define a scope prefix) starts with that prefix. The prefix is not
//! part of the returned scope.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{MonorelError, Result};

use super::bump::LevelBump;
use super::options::ParserOptions;

/// The structured content of an accepted commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedMessage {
    /// Bump level the message asks for.
    pub bump: LevelBump,
    /// Commit type, e.g. `feat`.
    #[serde(rename = "type")]
    pub commit_type: String,
    /// Changelog category, e.g. `features`.
    pub category: String,
    /// Scope with the scope prefix removed.
    pub scope: Option<String>,
    /// Subject followed by body paragraphs that are neither breaking notes nor issue footers.
    pub descriptions: Vec<String>,
    /// Text of every `BREAKING CHANGE:` paragraph.
    pub breaking_descriptions: Vec<String>,
    /// Issue references from closing footers, sorted numerically.
    pub linked_issues: Vec<String>,
    /// Merge request reference taken from the end of the subject (`#12`, `!12`).
    pub linked_merge_request: Option<String>,
}

impl ParsedMessage {
    /// First description line, which is always the subject.
    pub fn subject(&self) -> &str {
        self.descriptions.first().map(String::as_str).unwrap_or("")
    }

    /// Whether the message declares a breaking change.
    pub fn is_breaking(&self) -> bool {
        self.bump == LevelBump::Major
    }
}

/// Compiled message grammar for one set of parser options.
#[derive(Debug, Clone)]
pub struct MessageParser {
    options: ParserOptions,
    header: Regex,
}

impl MessageParser {
    /// Build the header grammar from the configured commit types and scope prefix.
    pub fn new(options: ParserOptions) -> Result<Self> {
        let tags = options.allowed_tags();
        if tags.is_empty() {
            return Err(MonorelError::InvalidParserOptions {
                message: "no commit types are configured".to_string(),
            });
        }

        let type_pattern = tags
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = format!(
            r"(?s)^(?P<type>{})(?:\({}(?P<scope>[^\n]+)\))?(?P<break>!)?:\s+(?P<subject>[^\n]+)(?:\n\n(?P<text>.+))?",
            type_pattern,
            regex::escape(&options.scope_prefix),
        );

        let header = Regex::new(&pattern).map_err(|e| MonorelError::InvalidParserOptions {
            message: format!(
                "unable to build a pattern from the configured commit types: {}",
                e
            ),
        })?;

        Ok(Self { options, header })
    }

    /// Options this parser was built from.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a full commit message. Returns `None` when the header does not match.
    pub fn parse(&self, message: &str) -> Option<ParsedMessage> {
        let caps = self.header.captures(message)?;

        let commit_type = caps.name("type")?.as_str().to_string();
        let scope = caps.name("scope").map(|m| m.as_str().to_string());
        let bang = caps.name("break").is_some();
        let mut subject = caps.name("subject")?.as_str().to_string();
        let text = caps.name("text").map(|m| m.as_str()).unwrap_or("");

        let mut linked_merge_request = None;
        if let Some(mr) = MERGE_REQUEST_REGEX.captures(&subject) {
            linked_merge_request = mr.name("mr").map(|m| m.as_str().to_string());
            subject = MERGE_REQUEST_REGEX
                .replace(&subject, "")
                .trim()
                .to_string();
        }

        let mut body = BodyComponents::default();
        body.absorb(&subject);
        for paragraph in parse_paragraphs(text) {
            body.absorb(&paragraph);
        }

        let bump = if bang || !body.breaking_descriptions.is_empty() {
            LevelBump::Major
        } else {
            self.options
                .level_for(&commit_type)
                .unwrap_or(self.options.default_bump_level)
        };

        Some(ParsedMessage {
            bump,
            category: long_type_name(&commit_type).to_string(),
            commit_type,
            scope,
            descriptions: body.descriptions,
            breaking_descriptions: body.breaking_descriptions,
            linked_issues: body.linked_issues,
            linked_merge_request,
        })
    }
}

#[derive(Debug, Default)]
struct BodyComponents {
    descriptions: Vec<String>,
    breaking_descriptions: Vec<String>,
    linked_issues: Vec<String>,
}

impl BodyComponents {
    fn absorb(&mut self, text: &str) {
        if let Some(caps) = BREAKING_REGEX.captures(text) {
            let note = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            self.breaking_descriptions.push(note.to_string());
            return;
        }

        if let Some(caps) = ISSUE_REGEX.captures(text) {
            let predicate = caps.name("predicate").map(|m| m.as_str()).unwrap_or("");
            let normalized = ISSUE_SEPARATOR_REGEX.replace_all(predicate, ",");

            let mut issues: BTreeSet<String> = self.linked_issues.drain(..).collect();
            issues.extend(
                normalized
                    .split(',')
                    .map(str::trim)
                    .filter(|s| s.chars().any(|c| c.is_ascii_digit()))
                    .map(str::to_string),
            );
            self.linked_issues = sort_numerically(issues);
            return;
        }

        if !self.descriptions.iter().any(|d| d == text) {
            self.descriptions.push(text.to_string());
        }
    }
}

/// Split a commit body into paragraphs.
///
/// Paragraphs are separated by blank lines; lines within a paragraph are
/// joined with single spaces. Empty paragraphs are dropped.
pub fn parse_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    PARAGRAPH_BREAK_REGEX
        .split(normalized.trim())
        .map(|p| {
            p.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Sort references by their non-numeric prefix, then by numeric value.
///
/// `#2` sorts before `#10`, and `ABC-9` before `ABC-10`.
pub fn sort_numerically(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut items: Vec<String> = items.into_iter().collect();
    items.sort_by_cached_key(|item| {
        let digits_at = item.find(|c: char| c.is_ascii_digit()).unwrap_or(item.len());
        let (prefix, rest) = item.split_at(digits_at);
        let digit_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let number = rest[..digit_len].parse::<u128>().unwrap_or(0);
        (prefix.to_string(), number, rest[digit_len..].to_string())
    });
    items
}

/// Changelog category for a commit type.
pub fn long_type_name(commit_type: &str) -> &str {
    match commit_type {
        "build" => "build system",
        "chore" => "chores",
        "ci" => "continuous integration",
        "docs" => "documentation",
        "feat" => "features",
        "fix" => "bug fixes",
        "perf" => "performance improvements",
        "refactor" => "refactoring",
        "revert" => "reverts",
        "style" => "code style",
        "test" => "testing",
        other => other,
    }
}

/// Breaking change footer.
static BREAKING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BREAKING[ -]CHANGE:\s?(.*)").expect("BREAKING_REGEX must compile")
});

/// Trailing merge request reference.
///
/// GitHub and Gitea use `(#123)`, GitLab uses `(!123)`, Bitbucket uses
/// `(pull request #123)`.
static MERGE_REQUEST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\t ]+\((?:pull request )?(?P<mr>[#!]\d+)\)[\t ]*$")
        .expect("MERGE_REQUEST_REGEX must compile")
});

/// Issue closing footer.
static ISSUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^(?:clos(?:e|es|ed|ing)|fix(?:es|ed|ing)?|resolv(?:e|es|ed|ing)|implement(?:s|ed|ing)?):[\t ]+(?P<predicate>.+?)[\t ]*$",
    )
    .expect("ISSUE_REGEX must compile")
});

static ISSUE_SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",? and | *[,;/& ] *").expect("ISSUE_SEPARATOR_REGEX must compile")
});

static PARAGRAPH_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[\t ]*\n\s*").expect("PARAGRAPH_BREAK_REGEX must compile")
});

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> MessageParser {
        MessageParser::new(ParserOptions::default()).unwrap()
    }

    fn prefixed(prefix: &str) -> MessageParser {
        MessageParser::new(ParserOptions {
            scope_prefix: prefix.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn parses_feature() {
        let msg = parser().parse("feat: add login").unwrap();
        assert_eq!(msg.commit_type, "feat");
        assert_eq!(msg.category, "features");
        assert_eq!(msg.bump, LevelBump::Minor);
        assert_eq!(msg.scope, None);
        assert_eq!(msg.descriptions, vec!["add login"]);
    }

    #[test]
    fn parses_scope() {
        let msg = parser().parse("fix(api): handle timeouts").unwrap();
        assert_eq!(msg.scope.as_deref(), Some("api"));
        assert_eq!(msg.bump, LevelBump::Patch);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(parser().parse("wip: half done").is_none());
        assert!(parser().parse("Merge branch 'main'").is_none());
    }

    #[test]
    fn requires_space_after_colon() {
        assert!(parser().parse("feat:nospace").is_none());
    }

    #[test]
    fn bang_is_major() {
        let msg = parser().parse("refactor!: drop python 3.8").unwrap();
        assert_eq!(msg.bump, LevelBump::Major);
        assert!(msg.is_breaking());
    }

    #[test]
    fn breaking_footer_is_major() {
        let msg = parser()
            .parse("docs: rewrite guide\n\nBREAKING CHANGE: the old URLs are gone")
            .unwrap();
        assert_eq!(msg.bump, LevelBump::Major);
        assert_eq!(msg.breaking_descriptions, vec!["the old URLs are gone"]);
        assert_eq!(msg.descriptions, vec!["rewrite guide"]);
    }

    #[test]
    fn hyphenated_breaking_footer() {
        let msg = parser()
            .parse("fix: x\n\nBREAKING-CHANGE: config key renamed")
            .unwrap();
        assert_eq!(msg.breaking_descriptions, vec!["config key renamed"]);
    }

    #[test]
    fn non_bumping_type_uses_default_level() {
        let msg = parser().parse("chore: tidy").unwrap();
        assert_eq!(msg.bump, LevelBump::NoRelease);
    }

    #[test]
    fn extracts_merge_request_number() {
        let msg = parser().parse("feat: add cache (#42)").unwrap();
        assert_eq!(msg.linked_merge_request.as_deref(), Some("#42"));
        assert_eq!(msg.subject(), "add cache");

        let msg = parser().parse("fix: patch (!7)").unwrap();
        assert_eq!(msg.linked_merge_request.as_deref(), Some("!7"));

        let msg = parser().parse("fix: patch (pull request #19)").unwrap();
        assert_eq!(msg.linked_merge_request.as_deref(), Some("#19"));
    }

    #[test]
    fn collects_issue_references() {
        let msg = parser()
            .parse("fix: crash\n\nsome detail\n\nCloses: #10, #2 and #5\n\nResolves: #2")
            .unwrap();
        assert_eq!(msg.linked_issues, vec!["#2", "#5", "#10"]);
        assert_eq!(msg.descriptions, vec!["crash", "some detail"]);
    }

    #[test]
    fn issue_references_without_digits_are_dropped() {
        let msg = parser().parse("fix: crash\n\nfixes: the thing, #3").unwrap();
        assert_eq!(msg.linked_issues, vec!["#3"]);
    }

    #[test]
    fn multi_line_paragraphs_are_joined() {
        let msg = parser()
            .parse("feat: x\n\nfirst line\nsecond line\n\nthird")
            .unwrap();
        assert_eq!(msg.descriptions, vec!["x", "first line second line", "third"]);
    }

    #[test]
    fn duplicate_descriptions_are_dropped() {
        let msg = parser().parse("feat: same\n\nsame").unwrap();
        assert_eq!(msg.descriptions, vec!["same"]);
    }

    #[test]
    fn scope_prefix_is_stripped() {
        let msg = prefixed("core-").parse("feat(core-auth): tokens").unwrap();
        assert_eq!(msg.scope.as_deref(), Some("auth"));
    }

    #[test]
    fn scope_prefix_still_allows_unscoped_header() {
        let msg = prefixed("core-").parse("fix: root level").unwrap();
        assert_eq!(msg.scope, None);
    }

    #[test]
    fn scope_without_prefix_does_not_match() {
        assert!(prefixed("core-").parse("feat(svc1-auth): tokens").is_none());
    }

    #[test]
    fn scope_prefix_is_literal() {
        let p = prefixed("a.b");
        assert!(p.parse("feat(a.bx): ok").is_some());
        assert!(p.parse("feat(aZbx): no").is_none());
    }

    #[test]
    fn empty_type_list_is_invalid() {
        let opts = ParserOptions {
            minor_tags: vec![],
            patch_tags: vec![],
            other_allowed_tags: vec![],
            ..Default::default()
        };
        assert!(matches!(
            MessageParser::new(opts),
            Err(MonorelError::InvalidParserOptions { .. })
        ));
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let paras = parse_paragraphs("a\nb\n\n\nc\n  \nd\n");
        assert_eq!(paras, vec!["a b", "c", "d"]);
        assert!(parse_paragraphs("").is_empty());
    }

    #[test]
    fn sorts_numerically() {
        let sorted = sort_numerically(
            ["#10", "#9", "ABC-10", "ABC-9", "#100"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(sorted, vec!["#9", "#10", "#100", "ABC-9", "ABC-10"]);
    }

    #[test]
    fn unknown_type_name_is_its_own_category() {
        assert_eq!(long_type_name("hotfix"), "hotfix");
        assert_eq!(long_type_name("perf"), "performance improvements");
    }
}
