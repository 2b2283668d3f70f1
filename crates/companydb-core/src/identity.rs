//! Canonical website identity for brands.
//!
//! A brand is identified by a bare domain (optionally followed by a path):
//! `acme.com`, `shop.acme.co.uk/us`. Scheme and `www` prefixes are rejected
//! rather than stripped so callers learn that the stored form is bare.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::CoreError;

/// Prefixes that mark a website as not yet cleaned.
const REJECTED_PREFIXES: [&str; 3] = ["http://", "https://", "www"];

static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9-]+\.)+[a-z]{2,6}(?:/[\w .\-/]*)?$").expect("valid website regex")
});

/// A validated, canonical brand website.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Website(String);

impl Website {
    /// Validate and canonicalize a candidate website.
    ///
    /// Canonical form: surrounding whitespace trimmed, host lowercased, every
    /// trailing `/` removed. Parsing a canonical value returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentityFormat`] carrying the original input
    /// when the candidate has a scheme or `www` prefix or is not domain-shaped.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let canonical = canonicalize(raw);

        let has_prefix = REJECTED_PREFIXES
            .iter()
            .any(|prefix| canonical.starts_with(prefix));
        if has_prefix || !WEBSITE_RE.is_match(&canonical) {
            return Err(CoreError::InvalidIdentityFormat(raw.to_string()));
        }

        Ok(Self(canonical))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Website {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Website {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trailing `/` and whitespace are trimmed as one run, so the result is a
/// fixed point of `canonicalize`.
fn canonicalize(raw: &str) -> String {
    let trimmed = raw
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    match trimmed.split_once('/') {
        Some((host, path)) => format!("{}/{path}", host.to_ascii_lowercase()),
        None => trimmed.to_ascii_lowercase(),
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
