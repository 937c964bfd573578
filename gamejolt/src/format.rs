use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gamejolt_core::{Error, Result};

use crate::parser::{JsonParser, KeypairParser, ResponseParser, XmlParser};

/// Wire format the service answers in.
///
/// The same value picks the `format` request parameter and the parser the
/// response is read with, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Structured tree responses.
    Xml,
    /// Object tree responses.
    Json,
    /// One `key:"value"` pair per line.
    #[default]
    Keypair,
}

impl Format {
    /// Value of the `format` request parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Keypair => "keypair",
        }
    }

    /// Parser for responses in this format.
    pub fn parser(&self) -> &'static dyn ResponseParser {
        match self {
            Format::Xml => &XmlParser,
            Format::Json => &JsonParser,
            Format::Keypair => &KeypairParser,
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            "keypair" => Ok(Format::Keypair),
            v => Err(Error::config_invalid(format!("unknown response format `{v}`"))),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
