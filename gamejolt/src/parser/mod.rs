//! Response parsers, one per wire format.
//!
//! Every parser turns the raw text of a response into [`PropertyBag`]s and
//! entities. Parsers keep no state between calls.

use std::fmt::Debug;

use gamejolt_core::{Error, Result};
use log::debug;

use crate::highscore::{Highscore, HighscoreTable, HIGHSCORE_PROPERTIES, HIGHSCORE_TABLE_PROPERTIES};
use crate::property::PropertyBag;
use crate::server_time::{ServerTime, SERVER_TIME_PROPERTIES};
use crate::trophy::{Trophy, TROPHY_PROPERTIES};
use crate::user::User;

mod dump;
pub use dump::parse_dump;

mod json;
pub use json::JsonParser;

mod keypair;
pub use keypair::KeypairParser;

mod xml;
pub use xml::XmlParser;

/// ResponseParser is the contract shared by the three wire formats.
///
/// Implementations must never panic on foreign input: anything they cannot
/// read is reported as [`ErrorKind::ResponseInvalid`], and a response whose
/// success flag is not `true` as [`ErrorKind::RequestRejected`].
///
/// [`ErrorKind::ResponseInvalid`]: gamejolt_core::ErrorKind::ResponseInvalid
/// [`ErrorKind::RequestRejected`]: gamejolt_core::ErrorKind::RequestRejected
pub trait ResponseParser: Debug + Send + Sync + 'static {
    /// Check the success flag of the response.
    ///
    /// Returns `false` for empty or malformed input.
    fn is_successful(&self, raw: &str) -> bool;

    /// The `message` the service attaches to rejected requests, if any.
    fn message(&self, raw: &str) -> Option<String>;

    /// Read the requested properties of the top level record.
    ///
    /// Requested properties the response does not carry are left out of the
    /// bag, never defaulted.
    fn parse_single(&self, raw: &str, properties: &[&str]) -> Result<PropertyBag>;

    /// Read the requested properties of every record of the list `field`.
    ///
    /// An unsuccessful response yields an empty list, not an error.
    fn parse_array(&self, raw: &str, field: &str, properties: &[&str])
        -> Result<Vec<PropertyBag>>;

    /// Read the keys listed by a `data-store/get-keys` response.
    fn parse_data_store_keys(&self, raw: &str) -> Result<Vec<String>>;

    /// Read the rank of a `scores/get-rank` response.
    fn parse_highscore_rank(&self, raw: &str) -> Result<u64>;

    /// Read the first user of a `users` response, with its type and status.
    fn parse_user(&self, raw: &str) -> Result<User>;

    /// Read a `get-time` response.
    fn parse_server_time(&self, raw: &str) -> Result<ServerTime> {
        ensure_successful(self, raw)?;
        self.parse_single(raw, SERVER_TIME_PROPERTIES)
            .map(ServerTime::new)
    }

    /// Read a `trophies` response.
    fn parse_trophies(&self, raw: &str) -> Result<Vec<Trophy>> {
        ensure_successful(self, raw)?;
        let bags = self.parse_array(raw, "trophies", TROPHY_PROPERTIES)?;
        Ok(bags.into_iter().map(Trophy::new).collect())
    }

    /// Read a `scores` response.
    fn parse_highscores(&self, raw: &str) -> Result<Vec<Highscore>> {
        ensure_successful(self, raw)?;
        let bags = self.parse_array(raw, "scores", HIGHSCORE_PROPERTIES)?;
        Ok(bags.into_iter().map(Highscore::new).collect())
    }

    /// Read a `scores/tables` response.
    fn parse_highscore_tables(&self, raw: &str) -> Result<Vec<HighscoreTable>> {
        ensure_successful(self, raw)?;
        let bags = self.parse_array(raw, "tables", HIGHSCORE_TABLE_PROPERTIES)?;
        Ok(bags.into_iter().map(HighscoreTable::new).collect())
    }
}

/// Fail with [`ErrorKind::RequestRejected`](gamejolt_core::ErrorKind::RequestRejected)
/// unless the response reports success.
pub(crate) fn ensure_successful<P>(parser: &P, raw: &str) -> Result<()>
where
    P: ResponseParser + ?Sized,
{
    if parser.is_successful(raw) {
        return Ok(());
    }

    let message = parser
        .message(raw)
        .unwrap_or_else(|| "request was not successful".to_string());
    debug!("response rejected: {message}");
    Err(Error::request_rejected(message))
}
