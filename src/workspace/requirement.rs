//! Dependency specifier parsing for `project.dependencies` entries.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static REQUIREMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?P<extras>\[[^\]]*\])?\s*(?P<spec>[^;]*?)\s*(?:;\s*(?P<marker>.*?))?\s*$",
    )
    .expect("REQUIREMENT_REGEX must compile")
});

static NAME_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("NAME_SEPARATOR_REGEX must compile"));

/// Normalize a distribution name (lowercase, runs of `-_.` become `-`).
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATOR_REGEX
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// One dependency specifier, e.g. `core[cli]==0.2.0; python_version >= "3.11"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    /// Extras including brackets, or empty.
    pub extras: String,
    /// Version specifier, or empty.
    pub specifier: String,
    /// Environment marker without the leading `;`, or empty.
    pub marker: String,
}

impl Requirement {
    /// Parse a specifier string. Returns `None` for anything that doesn't start with a name.
    pub fn parse(spec: &str) -> Option<Self> {
        let caps = REQUIREMENT_REGEX.captures(spec)?;
        let get = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };
        Some(Self {
            name: get("name"),
            extras: get("extras"),
            specifier: get("spec"),
            marker: get("marker"),
        })
    }

    /// Normalized distribution name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// The pinned version when the specifier is an exact `==` pin.
    pub fn pinned_version(&self) -> Option<&str> {
        let rest = self.specifier.strip_prefix("==")?;
        if rest.starts_with('=') || rest.contains(',') {
            return None;
        }
        Some(rest.trim())
    }

    /// Whether the specifier can be rewritten as an exact pin.
    ///
    /// True for a bare name or an existing `==` pin.
    pub fn is_pinnable(&self) -> bool {
        self.specifier.is_empty() || self.pinned_version().is_some()
    }

    /// Copy of this requirement pinned to `version`.
    pub fn pinned_to(&self, version: &str) -> Self {
        Self {
            specifier: format!("=={}", version),
            ..self.clone()
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.extras, self.specifier)?;
        if !self.marker.is_empty() {
            write!(f, "; {}", self.marker)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_name() {
        let req = Requirement::parse("core").unwrap();
        assert_eq!(req.name, "core");
        assert!(req.specifier.is_empty());
        assert!(req.is_pinnable());
        assert_eq!(req.pinned_version(), None);
    }

    #[test]
    fn parses_exact_pin() {
        let req = Requirement::parse("core==0.1.0").unwrap();
        assert_eq!(req.pinned_version(), Some("0.1.0"));
    }

    #[test]
    fn parses_extras_and_marker() {
        let req = Requirement::parse("core[cli] == 1.0 ; python_version >= \"3.11\"").unwrap();
        assert_eq!(req.name, "core");
        assert_eq!(req.extras, "[cli]");
        assert_eq!(req.specifier, "== 1.0");
        assert_eq!(req.marker, "python_version >= \"3.11\"");
        assert_eq!(req.pinned_version(), Some("1.0"));
    }

    #[test]
    fn ranges_are_not_pinnable() {
        let req = Requirement::parse("httpx>=0.27").unwrap();
        assert!(!req.is_pinnable());
        let req = Requirement::parse("core==1.0,!=1.0.1").unwrap();
        assert!(!req.is_pinnable());
        let req = Requirement::parse("core===1.0").unwrap();
        assert!(!req.is_pinnable());
    }

    #[test]
    fn pinned_to_keeps_extras_and_marker() {
        let req = Requirement::parse("core[cli]; sys_platform == \"linux\"").unwrap();
        assert_eq!(
            req.pinned_to("2.0.0").to_string(),
            "core[cli]==2.0.0; sys_platform == \"linux\""
        );
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("My_Package.core"), "my-package-core");
        assert_eq!(normalize_name("a--b__c"), "a-b-c");
    }
}
