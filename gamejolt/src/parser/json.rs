//! Parser for `format=json` responses.
//!
//! Every response is wrapped in a `response` object:
//!
//! ```json
//! {"response": {"success": "true", "scores": [{"score": "100 Coins", "sort": "100"}]}}
//! ```

use gamejolt_core::{Error, Result};
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ensure_successful, ResponseParser};
use crate::property::PropertyBag;
use crate::user::{User, USER_PROPERTIES, USER_STATUS, USER_TYPE};

/// Parser for the JSON format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Map<String, Value>,
}

fn parse_envelope(raw: &str) -> Result<Map<String, Value>> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(|e| {
        Error::response_invalid("malformed json response")
            .with_source(e)
            .with_context(format!("response: {raw}"))
    })?;
    Ok(envelope.response)
}

/// Render a scalar the way the other formats would carry it.
///
/// The service quotes most values but sends some numbers and booleans bare.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        v => v.to_string(),
    }
}

fn object_properties(object: &Map<String, Value>, properties: &[&str]) -> PropertyBag {
    properties
        .iter()
        .filter_map(|p| object.get(*p).map(|v| (*p, value_to_string(v))))
        .collect()
}

fn is_successful(response: &Map<String, Value>) -> bool {
    response
        .get("success")
        .is_some_and(|v| value_to_string(v) == "true")
}

/// The records of the list `field`, an empty slice when it is absent or null.
fn records<'a>(response: &'a Map<String, Value>, field: &str) -> Result<&'a [Value]> {
    match response.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(v) => Err(Error::response_invalid(format!("`{field}` is not a list"))
            .with_context(format!("value: {v}"))),
    }
}

fn as_record<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::response_invalid(format!("`{field}` holds a non-object record")))
}

impl ResponseParser for JsonParser {
    fn is_successful(&self, raw: &str) -> bool {
        match parse_envelope(raw) {
            Ok(response) => is_successful(&response),
            Err(err) => {
                debug!("json response is not readable: {err:?}");
                false
            }
        }
    }

    fn message(&self, raw: &str) -> Option<String> {
        let response = parse_envelope(raw).ok()?;
        response.get("message").map(value_to_string)
    }

    fn parse_single(&self, raw: &str, properties: &[&str]) -> Result<PropertyBag> {
        ensure_successful(self, raw)?;
        let response = parse_envelope(raw)?;
        Ok(object_properties(&response, properties))
    }

    fn parse_array(
        &self,
        raw: &str,
        field: &str,
        properties: &[&str],
    ) -> Result<Vec<PropertyBag>> {
        let response = parse_envelope(raw)?;
        if !is_successful(&response) {
            return Ok(Vec::new());
        }

        records(&response, field)?
            .iter()
            .map(|v| as_record(v, field).map(|o| object_properties(o, properties)))
            .collect()
    }

    fn parse_data_store_keys(&self, raw: &str) -> Result<Vec<String>> {
        ensure_successful(self, raw)?;
        let response = parse_envelope(raw)?;

        records(&response, "keys")?
            .iter()
            .map(|v| match v {
                Value::Object(o) => o
                    .get("key")
                    .map(value_to_string)
                    .ok_or_else(|| Error::response_invalid("key record carries no `key`")),
                v => Ok(value_to_string(v)),
            })
            .collect()
    }

    fn parse_highscore_rank(&self, raw: &str) -> Result<u64> {
        ensure_successful(self, raw)?;
        let response = parse_envelope(raw)?;
        let rank = response
            .get("rank")
            .map(value_to_string)
            .ok_or_else(|| Error::response_invalid("rank response carries no rank"))?;

        rank.trim().parse().map_err(|e| {
            Error::response_invalid("rank is not a number")
                .with_source(e)
                .with_context(format!("value: {rank}"))
        })
    }

    fn parse_user(&self, raw: &str) -> Result<User> {
        ensure_successful(self, raw)?;
        let response = parse_envelope(raw)?;
        let record = records(&response, "users")?
            .first()
            .ok_or_else(|| Error::response_invalid("users response carries no user"))?;
        let record = as_record(record, "users")?;

        let mut user = User::new(object_properties(record, USER_PROPERTIES));
        if let Some(t) = record.get(USER_TYPE) {
            user = user.with_user_type(value_to_string(t).parse()?);
        }
        if let Some(s) = record.get(USER_STATUS) {
            user = user.with_status(value_to_string(s).parse()?);
        }
        Ok(user)
    }
}
