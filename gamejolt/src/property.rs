use std::collections::HashMap;
use std::fmt::Debug;
use std::str::FromStr;

use gamejolt_core::{Error, Result};

/// PropertyBag is the raw string-to-string view of one record in a response.
///
/// Keys are case-sensitive and unique, values are always kept as the text the
/// service sent. Typed accessors parse lazily and return
/// [`ErrorKind::ResponseInvalid`](gamejolt_core::ErrorKind::ResponseInvalid)
/// when a value is missing or malformed.
///
/// Parsers build bags with [`PropertyBag::insert`]; once a bag is handed to an
/// entity it is only reachable through `&PropertyBag`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PropertyBag {
    properties: HashMap<String, String>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Raw value of `key`, `None` if the response did not carry it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Check whether the response carried `key` at all, even empty.
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Raw value of `key`, failing if it is absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::response_invalid(format!("missing property `{key}`")))
    }

    /// Parse the value of `key` into `T`.
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self.require(key)?;
        raw.trim().parse::<T>().map_err(|e| {
            Error::response_invalid(format!("property `{key}` is malformed"))
                .with_source(e)
                .with_context(format!("value: {raw}"))
        })
    }

    /// Value of `key` decoded as `application/x-www-form-urlencoded` text.
    ///
    /// `+` becomes a space and percent escapes are decoded as UTF-8. Values
    /// that do not decode to valid UTF-8 are returned unchanged.
    pub fn decoded(&self, key: &str) -> Result<String> {
        let raw = self.require(key)?;
        let plus_decoded = raw.replace('+', " ");
        Ok(percent_encoding::percent_decode_str(&plus_decoded)
            .decode_utf8()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string()))
    }

    /// Iterate over all properties in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

impl Debug for PropertyBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_unstable();
        f.debug_map().entries(sorted).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamejolt_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() {
        let bag = PropertyBag::from_iter([("id", "42"), ("sort", "x"), ("empty", "")]);

        assert_eq!(bag.parse::<u64>("id").unwrap(), 42);
        assert_eq!(
            bag.parse::<u64>("sort").unwrap_err().kind(),
            ErrorKind::ResponseInvalid
        );
        assert_eq!(
            bag.parse::<u64>("missing").unwrap_err().kind(),
            ErrorKind::ResponseInvalid
        );
        assert!(bag.contains("empty"));
        assert!(!bag.contains("missing"));
    }

    #[test]
    fn test_decoded() {
        let bag = PropertyBag::from_iter([
            ("score", "100+Coins"),
            ("extra_data", "%7B%22lvl%22%3A3%7D"),
            ("title", "caf%C3%A9"),
            ("broken", "%FF%FE"),
        ]);

        assert_eq!(bag.decoded("score").unwrap(), "100 Coins");
        assert_eq!(bag.decoded("extra_data").unwrap(), "{\"lvl\":3}");
        assert_eq!(bag.decoded("title").unwrap(), "café");
        assert_eq!(bag.decoded("broken").unwrap(), "%FF%FE");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let bag = PropertyBag::from_iter([("ID", "1"), ("id", "2")]);

        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("id"), Some("2"));
        assert_eq!(bag.get("Id"), None);
    }
}
