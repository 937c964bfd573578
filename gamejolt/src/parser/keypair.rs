//! Parser for `format=keypair` responses.
//!
//! A response is one `key:"value"` pair per line, headed by the success flag:
//!
//! ```text
//! success:"true"
//! id:"1"
//! title:"First Steps"
//! id:"2"
//! title:"Second Wind"
//! ```
//!
//! Lists are flattened: a record starts every time the key of the first pair
//! after the header comes around again.

use gamejolt_core::{Error, Result};

use super::{ensure_successful, ResponseParser};
use crate::property::PropertyBag;
use crate::user::{User, UserStatus, UserType, USER_PROPERTIES, USER_STATUS, USER_TYPE};

const SUCCESS_LINE: &str = "success:\"true\"";

/// Parser for the line-oriented keypair format.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypairParser;

/// Split `raw` into its non-empty lines, header included.
fn lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|l| !l.trim().is_empty())
}

/// The pairs after the header line.
fn pairs(raw: &str) -> impl Iterator<Item = Result<(&str, &str)>> {
    lines(raw).skip(1).map(parse_line)
}

/// Split one line into its key and unquoted value.
///
/// The value runs from the opening quote to the last quote of the line, so
/// quotes inside the value are kept.
fn parse_line(line: &str) -> Result<(&str, &str)> {
    let malformed = || {
        Error::response_invalid("malformed keypair line").with_context(format!("line: {line}"))
    };

    let (key, rest) = line.split_once(':').ok_or_else(malformed)?;
    let rest = rest.strip_prefix('"').ok_or_else(malformed)?;
    let end = rest.rfind('"').ok_or_else(malformed)?;
    Ok((key.trim(), &rest[..end]))
}

impl ResponseParser for KeypairParser {
    fn is_successful(&self, raw: &str) -> bool {
        lines(raw).next().is_some_and(|l| l.trim() == SUCCESS_LINE)
    }

    fn message(&self, raw: &str) -> Option<String> {
        pairs(raw)
            .filter_map(Result::ok)
            .find(|(k, _)| *k == "message")
            .map(|(_, v)| v.to_string())
    }

    fn parse_single(&self, raw: &str, properties: &[&str]) -> Result<PropertyBag> {
        ensure_successful(self, raw)?;

        let mut bag = PropertyBag::new();
        for pair in pairs(raw) {
            let (key, value) = pair?;
            if properties.contains(&key) {
                bag.insert(key, value);
            }
        }
        Ok(bag)
    }

    fn parse_array(
        &self,
        raw: &str,
        _field: &str,
        properties: &[&str],
    ) -> Result<Vec<PropertyBag>> {
        if !self.is_successful(raw) {
            return Ok(Vec::new());
        }

        let mut bags = Vec::new();
        let mut start_key: Option<&str> = None;
        let mut current: Option<PropertyBag> = None;

        for pair in pairs(raw) {
            let (key, value) = pair?;
            let start = *start_key.get_or_insert(key);
            if key == start {
                bags.extend(current.take());
                current = Some(PropertyBag::new());
            }
            if let Some(bag) = current.as_mut() {
                if properties.contains(&key) {
                    bag.insert(key, value);
                }
            }
        }
        bags.extend(current);

        Ok(bags)
    }

    fn parse_data_store_keys(&self, raw: &str) -> Result<Vec<String>> {
        ensure_successful(self, raw)?;

        let mut keys = Vec::new();
        for pair in pairs(raw) {
            let (key, value) = pair?;
            if key == "key" {
                keys.push(value.to_string());
            }
        }
        Ok(keys)
    }

    fn parse_highscore_rank(&self, raw: &str) -> Result<u64> {
        ensure_successful(self, raw)?;

        for pair in pairs(raw) {
            let (key, value) = pair?;
            if key == "rank" {
                return value.trim().parse().map_err(|e| {
                    Error::response_invalid("rank is not a number")
                        .with_source(e)
                        .with_context(format!("value: {value}"))
                });
            }
        }
        Err(Error::response_invalid("rank response carries no rank"))
    }

    fn parse_user(&self, raw: &str) -> Result<User> {
        ensure_successful(self, raw)?;

        let mut bag = PropertyBag::new();
        let mut user_type: Option<UserType> = None;
        let mut status: Option<UserStatus> = None;
        let mut first_key: Option<&str> = None;

        for pair in pairs(raw) {
            let (key, value) = pair?;
            // Only the first user of a list is read.
            if first_key.is_some_and(|k| k == key) {
                break;
            }
            first_key.get_or_insert(key);

            match key {
                USER_TYPE => user_type = Some(value.parse()?),
                USER_STATUS => status = Some(value.parse()?),
                k if USER_PROPERTIES.contains(&k) => bag.insert(k, value),
                _ => {}
            }
        }

        if first_key.is_none() {
            return Err(Error::response_invalid("users response carries no user"));
        }

        let mut user = User::new(bag);
        if let Some(t) = user_type {
            user = user.with_user_type(t);
        }
        if let Some(s) = status {
            user = user.with_status(s);
        }
        Ok(user)
    }
}
