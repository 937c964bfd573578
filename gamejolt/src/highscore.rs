use std::fmt::{Display, Formatter};

use gamejolt_core::Result;

use crate::property::PropertyBag;

/// Properties requested for a highscore record.
pub const HIGHSCORE_PROPERTIES: &[&str] = &[
    "score",
    "extra_data",
    "user",
    "user_id",
    "guest",
    "stored",
    "sort",
];

/// Properties requested for a highscore table record.
pub const HIGHSCORE_TABLE_PROPERTIES: &[&str] = &["id", "name", "description", "primary"];

/// A single entry of a highscore table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highscore {
    properties: PropertyBag,
}

impl Highscore {
    /// Wrap a parsed property bag.
    pub fn new(properties: PropertyBag) -> Self {
        Self { properties }
    }

    /// Raw properties of this highscore.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// The displayed score, e.g. `5 Grapefruits`.
    pub fn score(&self) -> Result<String> {
        self.properties.decoded("score")
    }

    /// The value the table is sorted by, e.g. `5`.
    pub fn sort_value(&self) -> Result<i64> {
        self.properties.parse("sort")
    }

    /// Extra data stored with the score, usually serialized by the game.
    pub fn extra_data(&self) -> Result<String> {
        self.properties.decoded("extra_data")
    }

    /// Name the guest submitted the score under.
    ///
    /// The service always sends a `guest` field for table listings and leaves
    /// it empty for user scores, so `Some("")` and `None` mean different
    /// things: the first is a user score, the second a response that did not
    /// say.
    pub fn guest(&self) -> Option<&str> {
        self.properties.get("guest")
    }

    /// Whether a guest submitted this score.
    ///
    /// Fails when the response carried no `guest` field at all instead of
    /// guessing.
    pub fn is_guest_highscore(&self) -> Result<bool> {
        Ok(!self.properties.require("guest")?.is_empty())
    }

    /// Whether a user submitted this score.
    pub fn is_user_highscore(&self) -> Result<bool> {
        self.is_guest_highscore().map(|guest| !guest)
    }

    /// When the score was stored, as displayed by the site.
    pub fn stored(&self) -> Option<&str> {
        self.properties.get("stored")
    }

    /// Id of the user who submitted the score, `None` for guest scores.
    pub fn user_id(&self) -> Result<Option<u64>> {
        if self.properties.require("user_id")?.trim().is_empty() {
            return Ok(None);
        }
        self.properties.parse("user_id").map(Some)
    }

    /// Display name of the scorer: the user name, or the guest name.
    pub fn username(&self) -> Option<&str> {
        match self.properties.get("user") {
            Some(user) if !user.is_empty() => Some(user),
            _ => self.guest(),
        }
    }
}

impl Display for Highscore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Highscore [user={}, score={}]",
            self.username().unwrap_or_default(),
            self.score().unwrap_or_default()
        )
    }
}

/// A highscore table of the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighscoreTable {
    properties: PropertyBag,
}

impl HighscoreTable {
    /// Wrap a parsed property bag.
    pub fn new(properties: PropertyBag) -> Self {
        Self { properties }
    }

    /// Raw properties of this table.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn id(&self) -> Result<u64> {
        self.properties.parse("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.properties.get("description")
    }

    /// Whether this is the primary table of the game.
    pub fn is_primary(&self) -> Result<bool> {
        let primary = self.properties.require("primary")?.trim();
        Ok(primary == "1" || primary == "true")
    }
}

/// A score to submit with [`Client::add_highscore`](crate::Client::add_highscore).
///
/// Without a guest name the score is stored for the verified user, which
/// requires a verified session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHighscore {
    pub(crate) table_id: Option<u64>,
    pub(crate) score: String,
    pub(crate) sort: i64,
    pub(crate) extra_data: String,
    pub(crate) guest: Option<String>,
}

impl NewHighscore {
    /// Create a score with its displayed text and sort value.
    pub fn new(score: impl Into<String>, sort: i64) -> Self {
        Self {
            table_id: None,
            score: score.into(),
            sort,
            extra_data: String::new(),
            guest: None,
        }
    }

    /// Store the score in the given table; `0` selects the primary table.
    pub fn with_table_id(mut self, table_id: u64) -> Self {
        self.table_id = Some(table_id).filter(|id| *id != 0);
        self
    }

    /// Attach extra data to the score.
    pub fn with_extra_data(mut self, extra_data: impl Into<String>) -> Self {
        self.extra_data = extra_data.into();
        self
    }

    /// Submit the score as a guest with the given name.
    pub fn with_guest(mut self, guest: impl Into<String>) -> Self {
        self.guest = Some(guest.into());
        self
    }

    /// Check whether this score is submitted by a guest.
    pub fn is_guest(&self) -> bool {
        self.guest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamejolt_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_highscore() {
        let h = Highscore::new(PropertyBag::from_iter([
            ("score", "100+Coins"),
            ("sort", "100"),
            ("extra_data", ""),
            ("user", "ashley"),
            ("user_id", "42"),
            ("guest", ""),
            ("stored", "2 weeks ago"),
        ]));

        assert_eq!(h.score().unwrap(), "100 Coins");
        assert_eq!(h.sort_value().unwrap(), 100);
        assert_eq!(h.user_id().unwrap(), Some(42));
        assert_eq!(h.is_guest_highscore().unwrap(), false);
        assert_eq!(h.is_user_highscore().unwrap(), true);
        assert_eq!(h.username(), Some("ashley"));
        assert_eq!(h.to_string(), "Highscore [user=ashley, score=100 Coins]");
    }

    #[test]
    fn test_guest_highscore() {
        let h = Highscore::new(PropertyBag::from_iter([
            ("score", "7"),
            ("user", ""),
            ("user_id", ""),
            ("guest", "visitor"),
        ]));

        assert_eq!(h.is_guest_highscore().unwrap(), true);
        assert_eq!(h.user_id().unwrap(), None);
        assert_eq!(h.username(), Some("visitor"));
    }

    #[test]
    fn test_guest_presence_is_not_defaulted() {
        let h = Highscore::new(PropertyBag::from_iter([("score", "7")]));

        assert_eq!(h.guest(), None);
        assert_eq!(
            h.is_guest_highscore().unwrap_err().kind(),
            ErrorKind::ResponseInvalid
        );
    }

    #[test]
    fn test_table() {
        let t = HighscoreTable::new(PropertyBag::from_iter([
            ("id", "3"),
            ("name", "Coins"),
            ("primary", "1"),
        ]));

        assert_eq!(t.id().unwrap(), 3);
        assert_eq!(t.name(), Some("Coins"));
        assert!(t.is_primary().unwrap());
    }

    #[test]
    fn test_new_highscore_primary_table() {
        assert_eq!(NewHighscore::new("100 Coins", 100).with_table_id(0).table_id, None);
        assert_eq!(NewHighscore::new("100 Coins", 100).with_table_id(9).table_id, Some(9));
    }
}
