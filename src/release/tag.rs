//! Tag templates such as `core-v{version}`.

use crate::error::{MonorelError, Result};

use super::version::Version;

const PLACEHOLDER: &str = "{version}";

/// A tag template with exactly one `{version}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
    prefix: String,
    suffix: String,
}

impl TagFormat {
    /// Compile a template.
    pub fn new(template: &str) -> Result<Self> {
        if template.matches(PLACEHOLDER).count() != 1 {
            return Err(MonorelError::InvalidTagFormat {
                format: template.to_string(),
            });
        }
        let (prefix, suffix) = template
            .split_once(PLACEHOLDER)
            .ok_or_else(|| MonorelError::InvalidTagFormat {
                format: template.to_string(),
            })?;
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Tag name for a version.
    pub fn render(&self, version: &Version) -> String {
        format!("{}{}{}", self.prefix, version, self.suffix)
    }

    /// Version encoded in a tag, if the tag follows this template.
    pub fn parse(&self, tag: &str) -> Option<Version> {
        tag.strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?
            .parse()
            .ok()
    }

    /// `git tag --list` pattern that matches candidate tags.
    pub fn glob(&self) -> String {
        format!("{}*{}", escape_glob(&self.prefix), escape_glob(&self.suffix))
    }
}

fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
