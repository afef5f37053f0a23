//! Commit parser options.
//!
//! Options are read from `[tool.semantic_release.commit_parser_options]` in a
//! package's `pyproject.toml`. Every field has a default, so an empty table
//! (or no table at all) yields a parser that accepts the conventional commit
//! types and considers every file in the package directory.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::bump::LevelBump;

/// Options controlling how commits are classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    /// Commit types that result in a minor release.
    pub minor_tags: Vec<String>,

    /// Commit types that result in a patch release.
    pub patch_tags: Vec<String>,

    /// Commit types that are accepted but do not bump by themselves.
    pub other_allowed_tags: Vec<String>,

    /// Level applied to accepted commits whose type has no explicit level.
    pub default_bump_level: LevelBump,

    /// Paths (relative to the package directory) a commit must touch to count.
    ///
    /// Gitignore-like: globs are allowed, and a leading `!` excludes matches.
    #[serde(deserialize_with = "one_or_many")]
    pub path_filters: Vec<String>,

    /// Prefix stripped from the commit scope.
    ///
    /// When set, scoped commits are accepted even if they touch no filtered
    /// path, and unscoped commits must touch a filtered path.
    pub scope_prefix: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            minor_tags: vec!["feat".to_string()],
            patch_tags: vec!["fix".to_string(), "perf".to_string()],
            other_allowed_tags: ["build", "chore", "ci", "docs", "style", "refactor", "test"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_bump_level: LevelBump::NoRelease,
            path_filters: vec![".".to_string()],
            scope_prefix: String::new(),
        }
    }
}

impl ParserOptions {
    /// Ordered mapping of commit type to bump level.
    ///
    /// Built from the other tags, then patch tags, then minor tags. A tag
    /// listed twice takes the later level but keeps its first position.
    /// Tags containing `|` are ignored.
    pub fn tag_to_level(&self) -> Vec<(String, LevelBump)> {
        let groups = [
            (&self.other_allowed_tags, self.default_bump_level),
            (&self.patch_tags, LevelBump::Patch),
            (&self.minor_tags, LevelBump::Minor),
        ];

        let mut mapping: Vec<(String, LevelBump)> = Vec::new();
        for (tags, level) in groups {
            for tag in tags.iter().filter(|t| !t.contains('|')) {
                match mapping.iter_mut().find(|(existing, _)| existing == tag) {
                    Some(entry) => entry.1 = level,
                    None => mapping.push((tag.clone(), level)),
                }
            }
        }
        mapping
    }

    /// Bump level for a commit type, if the type is known.
    pub fn level_for(&self, tag: &str) -> Option<LevelBump> {
        self.tag_to_level()
            .into_iter()
            .find(|(t, _)| t == tag)
            .map(|(_, level)| level)
    }

    /// All accepted commit types, most significant first.
    pub fn allowed_tags(&self) -> Vec<String> {
        self.tag_to_level()
            .into_iter()
            .rev()
            .map(|(tag, _)| tag)
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
