//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a secret for `Debug` output.
///
/// - Empty input prints `EMPTY`.
/// - Input shorter than 12 characters is replaced by `***` entirely.
/// - Longer input keeps its first and last three characters, so two redacted
///   private keys or user tokens can still be told apart in logs.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.chars().count();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            let head: String = self.0.chars().take(3).collect();
            let tail: String = self.0.chars().skip(length - 3).collect();
            write!(f, "{head}***{tail}")
        }
    }
}

/// Masks the secrets of a signed request URL so it can be logged.
///
/// Both `user_token` and `signature` trail the query, so everything from the
/// first of them on is replaced.
pub fn redact_url(url: &str) -> String {
    let cut = ["&user_token=", "&signature="]
        .iter()
        .filter_map(|p| url.find(p))
        .min();

    match cut {
        Some(idx) => {
            let mut out = url[..idx].to_string();
            if url[idx..].starts_with("&user_token=") {
                out.push_str("&user_token=***");
            }
            if url[idx..].contains("&signature=") {
                out.push_str("&signature=***");
            }
            out
        }
        None => url.to_string(),
    }
}
