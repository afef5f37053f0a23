//! Bearer tokens sourced from the environment.

use std::fmt;

use crate::error::{MonorelError, Result};

/// A hosting API token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read a token from `var`, treating an empty value as unset.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    /// Like [`Token::from_env`], but a missing token is an error.
    pub fn require(var: &str) -> Result<Self> {
        Self::from_env(var).ok_or_else(|| MonorelError::TokenMissing {
            var: var.to_string(),
        })
    }

    /// The raw value, for request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A short hint like `ghp_…` that identifies the token kind.
    pub fn hint(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{}…", prefix)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}
