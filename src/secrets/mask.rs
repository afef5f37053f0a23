//! Redaction of secret values in output.

use std::sync::LazyLock;

use regex::Regex;

use super::token::Token;

/// `scheme://user:password@` in remote URLs.
static URL_CREDENTIALS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*://)[^/@\s]+@")
        .expect("URL_CREDENTIALS_REGEX must compile")
});

/// Masks secret values in text before it reaches the terminal or logs.
///
/// # Example
///
/// ```
/// use monorel::secrets::OutputMasker;
///
/// let mut masker = OutputMasker::new();
/// masker.add_secret("super-secret-value");
///
/// let output = masker.mask("The key is super-secret-value here");
/// assert_eq!(output, "The key is [REDACTED] here");
/// ```
#[derive(Debug, Clone)]
pub struct OutputMasker {
    /// Secret values, longest first so overlapping values mask fully.
    secrets: Vec<String>,
    mask: String,
}

impl OutputMasker {
    /// Create a new masker with default mask string.
    pub fn new() -> Self {
        Self::with_mask("[REDACTED]")
    }

    /// Create a masker with a custom mask string.
    pub fn with_mask(mask: impl Into<String>) -> Self {
        Self {
            secrets: Vec::new(),
            mask: mask.into(),
        }
    }

    /// A masker that knows one token.
    pub fn for_token(token: &Token) -> Self {
        let mut masker = Self::new();
        masker.add_secret(token.expose());
        masker
    }

    /// Register a secret value to be masked.
    ///
    /// Empty strings are ignored.
    pub fn add_secret(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() || self.secrets.contains(&value) {
            return;
        }
        self.secrets.push(value);
        self.secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
    }

    /// Number of registered secrets.
    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }

    /// Mask secret values and URL credentials in `input`.
    pub fn mask(&self, input: &str) -> String {
        let mut result = input.to_string();
        for secret in &self.secrets {
            result = result.replace(secret.as_str(), &self.mask);
        }
        let replacement = format!("${{scheme}}{}@", self.mask);
        URL_CREDENTIALS_REGEX
            .replace_all(&result, replacement.as_str())
            .into_owned()
    }
}

impl Default for OutputMasker {
    fn default() -> Self {
        Self::new()
    }
}
