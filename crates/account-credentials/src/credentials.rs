//! Generated credential types.
//!
//! This module defines the output of template rendering. Values are plain
//! strings; any placeholder the generator could not resolve is left in the
//! text verbatim, and [`unresolved_placeholders`] lets callers find them.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Username, password, and email derived for one account.
///
/// # Example
///
/// ```
/// use account_credentials::GeneratedCredentials;
///
/// let credentials = GeneratedCredentials {
///     username: "alismith42".to_owned(),
///     password: "{unknown}".to_owned(),
///     email: "alices@example.com".to_owned(),
/// };
///
/// assert_eq!(credentials.unresolved(), vec!["{unknown}"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCredentials {
    /// Rendered username template.
    pub username: String,
    /// Rendered password template.
    pub password: String,
    /// Rendered email template or the fallback address.
    pub email: String,
}

impl GeneratedCredentials {
    /// Returns every placeholder left unresolved across the three values.
    #[must_use]
    pub fn unresolved(&self) -> Vec<&str> {
        [&self.username, &self.password, &self.email]
            .into_iter()
            .flat_map(|value| unresolved_placeholders(value))
            .collect()
    }
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\{[^{}]+\}")
            .unwrap_or_else(|error| panic!("placeholder regex failed to compile: {error}"))
    })
}

/// Lists the `{name}` tokens remaining in `text`, in order of appearance.
///
/// # Examples
///
/// ```
/// use account_credentials::unresolved_placeholders;
///
/// assert_eq!(unresolved_placeholders("{a}-x-{b.c}"), vec!["{a}", "{b.c}"]);
/// assert!(unresolved_placeholders("no tokens, {}").is_empty());
/// ```
#[must_use]
pub fn unresolved_placeholders(text: &str) -> Vec<&str> {
    placeholder_regex()
        .find_iter(text)
        .map(|found| found.as_str())
        .collect()
}
