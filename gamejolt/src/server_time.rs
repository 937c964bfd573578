use chrono::{DateTime, Utc};
use gamejolt_core::{Error, Result};

use crate::property::PropertyBag;

/// Properties requested for the server time.
pub const SERVER_TIME_PROPERTIES: &[&str] = &[
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "seconds",
    "timestamp",
    "timezone",
];

/// Current time on the Game Jolt servers.
///
/// The calendar fields are expressed in [`ServerTime::timezone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTime {
    properties: PropertyBag,
}

impl ServerTime {
    /// Wrap a parsed property bag.
    pub fn new(properties: PropertyBag) -> Self {
        Self { properties }
    }

    /// Raw properties of the server time.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn year(&self) -> Result<i32> {
        self.properties.parse("year")
    }

    pub fn month(&self) -> Result<u32> {
        self.properties.parse("month")
    }

    pub fn day(&self) -> Result<u32> {
        self.properties.parse("day")
    }

    pub fn hour(&self) -> Result<u32> {
        self.properties.parse("hour")
    }

    pub fn minute(&self) -> Result<u32> {
        self.properties.parse("minute")
    }

    pub fn seconds(&self) -> Result<u32> {
        self.properties.parse("seconds")
    }

    /// Unix timestamp in seconds.
    pub fn timestamp(&self) -> Result<i64> {
        self.properties.parse("timestamp")
    }

    /// Timezone name, e.g. `America/New_York`.
    pub fn timezone(&self) -> Option<&str> {
        self.properties.get("timezone")
    }

    /// The server time as an UTC instant, built from the timestamp.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        let ts = self.timestamp()?;
        DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| Error::response_invalid(format!("timestamp {ts} is out of range")))
    }
}
