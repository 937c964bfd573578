use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gamejolt_core::{Error, Result};

use crate::property::PropertyBag;

/// Properties requested for a trophy record.
pub const TROPHY_PROPERTIES: &[&str] = &[
    "id",
    "title",
    "description",
    "difficulty",
    "image_url",
    "achieved",
];

/// How hard a trophy is to get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrophyDifficulty {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl FromStr for TrophyDifficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(TrophyDifficulty::Bronze),
            "silver" => Ok(TrophyDifficulty::Silver),
            "gold" => Ok(TrophyDifficulty::Gold),
            "platinum" => Ok(TrophyDifficulty::Platinum),
            v => Err(Error::response_invalid(format!(
                "unknown trophy difficulty `{v}`"
            ))),
        }
    }
}

/// Which trophies to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrophyFilter {
    /// Only trophies the verified user has achieved.
    Achieved,
    /// Only trophies the verified user has not achieved yet.
    Unachieved,
    /// Every trophy of the game.
    #[default]
    All,
}

impl TrophyFilter {
    /// Value of the `achieved` parameter, `None` to leave it out.
    pub(crate) fn as_param(&self) -> Option<&'static str> {
        match self {
            TrophyFilter::Achieved => Some("true"),
            TrophyFilter::Unachieved => Some("false"),
            TrophyFilter::All => None,
        }
    }
}

/// A trophy of the game, as seen by the verified user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trophy {
    properties: PropertyBag,
}

impl Trophy {
    /// Wrap a parsed property bag.
    pub fn new(properties: PropertyBag) -> Self {
        Self { properties }
    }

    /// Raw properties of this trophy.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn id(&self) -> Result<u64> {
        self.properties.parse("id")
    }

    pub fn title(&self) -> Option<&str> {
        self.properties.get("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.properties.get("description")
    }

    pub fn difficulty(&self) -> Result<TrophyDifficulty> {
        self.properties.require("difficulty")?.parse()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.properties.get("image_url")
    }

    /// Whether the verified user has this trophy.
    ///
    /// The service sends `false` for unachieved trophies and a human readable
    /// date such as `5 days ago` otherwise.
    pub fn is_achieved(&self) -> Result<bool> {
        let achieved = self.properties.require("achieved")?;
        Ok(achieved.trim() != "false")
    }

    /// When the trophy was achieved, as displayed by the site.
    pub fn achieved_at(&self) -> Option<&str> {
        self.properties
            .get("achieved")
            .filter(|v| v.trim() != "false")
    }
}

impl Display for Trophy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trophy [id={}, title={}]",
            self.properties.get("id").unwrap_or_default(),
            self.title().unwrap_or_default()
        )
    }
}
