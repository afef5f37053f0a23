//! Version bump levels.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How much a commit (or a set of commits) moves the version.
///
/// Levels are ordered so that the release level of many commits is simply
/// the maximum of their individual levels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LevelBump {
    /// The commit does not warrant a release.
    #[default]
    NoRelease,
    /// Bump the prerelease counter only.
    Prerelease,
    /// Backwards-compatible fix.
    Patch,
    /// Backwards-compatible feature.
    Minor,
    /// Breaking change.
    Major,
}

impl LevelBump {
    /// Stable lowercase name, as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRelease => "no_release",
            Self::Prerelease => "prerelease",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl fmt::Display for LevelBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelBump {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "no_release" => Ok(Self::NoRelease),
            "prerelease" => Ok(Self::Prerelease),
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(format!("unknown bump level: {}", s)),
        }
    }
}
