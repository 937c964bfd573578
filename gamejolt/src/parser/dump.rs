//! `format=dump` responses, used by the data store to return raw items.
//!
//! The first line is `SUCCESS` or `FAILURE`; everything after the line
//! break is the stored data, or the failure message.

use gamejolt_core::{Error, Result};

const SUCCESS: &str = "SUCCESS";
const FAILURE: &str = "FAILURE";

/// Strip the line break that separates the status from the payload.
fn payload(rest: &str) -> &str {
    ["\r\n", "\n", ":"]
        .iter()
        .find_map(|sep| rest.strip_prefix(sep))
        .unwrap_or(rest)
}

/// Extract the data of a successful dump response.
///
/// The data is returned byte for byte, trailing whitespace included.
pub fn parse_dump(raw: &str) -> Result<String> {
    if let Some(rest) = raw.strip_prefix(SUCCESS) {
        return Ok(payload(rest).to_string());
    }

    let message = raw
        .strip_prefix(FAILURE)
        .map(|rest| payload(rest).trim())
        .filter(|m| !m.is_empty())
        .unwrap_or("request was not successful");
    Err(Error::request_rejected(message))
}
