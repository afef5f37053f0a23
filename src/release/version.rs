//! Package versions.
//!
//! Versions are `MAJOR.MINOR.PATCH` with an optional release candidate
//! suffix `-rc.N`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::commit::LevelBump;
use crate::error::{MonorelError, Result};

/// A package version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Release candidate number.
    pub rc: Option<u64>,
}

impl Version {
    /// A final version.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            rc: None,
        }
    }

    /// Whether this is a release candidate.
    pub fn is_prerelease(&self) -> bool {
        self.rc.is_some()
    }

    /// The final version this candidate leads to.
    pub fn finalized(&self) -> Self {
        Self { rc: None, ..*self }
    }

    /// Compute the next version for a bump level.
    ///
    /// Returns `None` for [`LevelBump::NoRelease`]. A release candidate is
    /// finalized when the level does not ask for more than it already
    /// carries: `1.3.0-rc.2` with a minor bump becomes `1.3.0`. With
    /// `major_on_zero` off, a major bump on `0.x` is applied as a minor bump.
    pub fn bump(&self, level: LevelBump, major_on_zero: bool) -> Option<Self> {
        let level = if level == LevelBump::Major && self.major == 0 && !major_on_zero {
            LevelBump::Minor
        } else {
            level
        };

        let next = match level {
            LevelBump::NoRelease => return None,
            LevelBump::Prerelease => match self.rc {
                Some(n) => Self {
                    rc: Some(n + 1),
                    ..*self
                },
                None => Self {
                    patch: self.patch + 1,
                    rc: Some(1),
                    ..*self
                },
            },
            LevelBump::Patch if self.is_prerelease() => self.finalized(),
            LevelBump::Patch => Self::new(self.major, self.minor, self.patch + 1),
            LevelBump::Minor if self.is_prerelease() && self.patch == 0 => self.finalized(),
            LevelBump::Minor => Self::new(self.major, self.minor + 1, 0),
            LevelBump::Major if self.is_prerelease() && self.minor == 0 && self.patch == 0 => {
                self.finalized()
            }
            LevelBump::Major => Self::new(self.major + 1, 0, 0),
        };
        Some(next)
    }

    /// The version as Python packaging writes it into file names (`1.3.0rc1`).
    pub fn pep440(&self) -> String {
        match self.rc {
            Some(n) => format!("{}.{}.{}rc{}", self.major, self.minor, self.patch, n),
            None => format!("{}.{}.{}", self.major, self.minor, self.patch),
        }
    }

    /// First release candidate of this version, or the next candidate when
    /// `previous` is already a candidate of the same version.
    pub fn as_release_candidate(&self, previous: Option<&Version>) -> Self {
        let n = match previous {
            Some(p) if p.finalized() == self.finalized() => p.rc.map_or(1, |n| n + 1),
            _ => 1,
        };
        Self {
            rc: Some(n),
            ..*self
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(n) = self.rc {
            write!(f, "-rc.{}", n)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = MonorelError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MonorelError::InvalidVersion {
            version: s.to_string(),
        };

        // `1.3.0-rc.1`, `1.3.0-rc1` or the manifest spelling `1.3.0rc1`.
        let trimmed = s.trim();
        let (core, rc) = match trimmed
            .split_once('-')
            .or_else(|| trimmed.find("rc").map(|i| trimmed.split_at(i)))
        {
            Some((core, suffix)) => {
                let n = suffix
                    .strip_prefix("rc.")
                    .or_else(|| suffix.strip_prefix("rc"))
                    .ok_or_else(invalid)?;
                (core, Some(n.parse::<u64>().map_err(|_| invalid())?))
            }
            None => (trimmed, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let number = |p: &str| p.parse::<u64>().map_err(|_| invalid());

        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
            rc,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.rc, other.rc) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!(v("1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v("1.2.3-rc.4").rc, Some(4));
        assert_eq!(v("1.2.3-rc.4").to_string(), "1.2.3-rc.4");
        assert_eq!(v("1.2.3-rc4").to_string(), "1.2.3-rc.4");
        assert_eq!(v("1.3.0rc2"), v("1.3.0-rc.2"));
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["1.2", "1.2.3.4", "a.b.c", "1.2.3-beta.1", "", "1.2.3-rc.x", "1.2.3rc"] {
            let err = bad.parse::<Version>().unwrap_err();
            assert!(matches!(err, MonorelError::InvalidVersion { .. }), "{}", bad);
        }
    }

    #[test]
    fn standard_bumps() {
        let base = v("1.2.3");
        assert_eq!(base.bump(LevelBump::NoRelease, true), None);
        assert_eq!(base.bump(LevelBump::Patch, true), Some(v("1.2.4")));
        assert_eq!(base.bump(LevelBump::Minor, true), Some(v("1.3.0")));
        assert_eq!(base.bump(LevelBump::Major, true), Some(v("2.0.0")));
        assert_eq!(base.bump(LevelBump::Prerelease, true), Some(v("1.2.4-rc.1")));
    }

    #[test]
    fn major_on_zero() {
        let base = v("0.4.1");
        assert_eq!(base.bump(LevelBump::Major, true), Some(v("1.0.0")));
        assert_eq!(base.bump(LevelBump::Major, false), Some(v("0.5.0")));
        // Only applies below 1.0.
        assert_eq!(v("1.4.1").bump(LevelBump::Major, false), Some(v("2.0.0")));
    }

    #[test]
    fn release_candidates_finalize() {
        assert_eq!(v("1.3.0-rc.2").bump(LevelBump::Minor, true), Some(v("1.3.0")));
        assert_eq!(v("1.3.1-rc.2").bump(LevelBump::Patch, true), Some(v("1.3.1")));
        assert_eq!(v("1.3.1-rc.2").bump(LevelBump::Minor, true), Some(v("1.4.0")));
        assert_eq!(v("2.0.0-rc.1").bump(LevelBump::Major, true), Some(v("2.0.0")));
        assert_eq!(
            v("2.0.0-rc.1").bump(LevelBump::Prerelease, true),
            Some(v("2.0.0-rc.2"))
        );
    }

    #[test]
    fn release_candidate_numbering() {
        let next = v("1.3.0");
        assert_eq!(next.as_release_candidate(None), v("1.3.0-rc.1"));
        assert_eq!(
            next.as_release_candidate(Some(&v("1.3.0-rc.3"))),
            v("1.3.0-rc.4")
        );
        assert_eq!(
            next.as_release_candidate(Some(&v("1.2.0"))),
            v("1.3.0-rc.1")
        );
    }

    #[test]
    fn pep440_form() {
        assert_eq!(v("1.3.0-rc.2").pep440(), "1.3.0rc2");
        assert_eq!(v("1.3.0").pep440(), "1.3.0");
    }

    #[test]
    fn ordering() {
        assert!(v("1.2.3-rc.1") < v("1.2.3"));
        assert!(v("1.2.3-rc.2") > v("1.2.3-rc.1"));
        assert!(v("1.10.0") > v("1.9.9"));
    }

    #[test]
    fn serializes_as_string() {
        assert_eq!(serde_json::to_string(&v("0.1.0")).unwrap(), "\"0.1.0\"");
    }
}
