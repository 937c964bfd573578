//! Parser for `format=xml` responses.
//!
//! ```xml
//! <response>
//!   <success><![CDATA[true]]></success>
//!   <scores>
//!     <score><score><![CDATA[100 Coins]]></score><sort>100</sort></score>
//!   </scores>
//! </response>
//! ```
//!
//! The success flag is the text of the first child of the document element.
//! List responses keep their records as children of the second child.

use gamejolt_core::{Error, Result};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::ResponseParser;
use crate::property::PropertyBag;
use crate::user::{User, USER_PROPERTIES, USER_STATUS, USER_TYPE};

/// Parser for the structured tree (XML) format.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

/// One element of the response: its name, its text and its child elements.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn child(&self, idx: usize) -> Option<&Node> {
        self.children.get(idx)
    }

    fn child_named(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|n| n.name == name)
    }

    /// Collect the children named in `properties` into a bag.
    ///
    /// Elements without text are kept with an empty value.
    fn properties(&self, properties: &[&str]) -> PropertyBag {
        self.children
            .iter()
            .filter(|n| properties.contains(&n.name.as_str()))
            .map(|n| (n.name.as_str(), n.text.as_str()))
            .collect()
    }
}

/// Read the whole document into a tree and return its document element.
fn parse_document(raw: &str) -> Result<Node> {
    // Field text is kept as sent, only the success flag is trimmed.
    let mut reader = Reader::from_str(raw);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::response_invalid("malformed xml response")
                .with_source(e)
                .with_context(format!("position: {}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => stack.push(Node {
                name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ..Default::default()
            }),
            Event::Empty(e) => {
                let node = Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Default::default()
                };
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::response_invalid("unbalanced xml response"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| {
                    Error::response_invalid("malformed xml text").with_source(e)
                })?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no data.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::response_invalid("truncated xml response"));
    }
    root.ok_or_else(|| Error::response_invalid("empty xml response"))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(Error::response_invalid("xml response has more than one root")),
    }
    Ok(())
}

fn is_successful(doc: &Node) -> bool {
    doc.child(0).is_some_and(|n| n.text.trim() == "true")
}

/// Parse `raw` and fail unless it reports success.
fn successful_document(raw: &str) -> Result<Node> {
    let doc = parse_document(raw)?;
    if !is_successful(&doc) {
        let message = doc
            .child_named("message")
            .map(|n| n.text.as_str())
            .unwrap_or("request was not successful");
        return Err(Error::request_rejected(message));
    }
    Ok(doc)
}

impl ResponseParser for XmlParser {
    fn is_successful(&self, raw: &str) -> bool {
        match parse_document(raw) {
            Ok(doc) => is_successful(&doc),
            Err(err) => {
                debug!("xml response is not readable: {err:?}");
                false
            }
        }
    }

    fn message(&self, raw: &str) -> Option<String> {
        let doc = parse_document(raw).ok()?;
        doc.child_named("message").map(|n| n.text.clone())
    }

    fn parse_single(&self, raw: &str, properties: &[&str]) -> Result<PropertyBag> {
        let doc = successful_document(raw)?;
        Ok(doc.properties(properties))
    }

    fn parse_array(
        &self,
        raw: &str,
        field: &str,
        properties: &[&str],
    ) -> Result<Vec<PropertyBag>> {
        let doc = parse_document(raw)?;
        if !is_successful(&doc) {
            return Ok(Vec::new());
        }

        let Some(list) = doc.child(1) else {
            return Ok(Vec::new());
        };
        if list.name != field {
            debug!("expected list `{field}`, reading `{}` instead", list.name);
        }

        Ok(list
            .children
            .iter()
            .map(|record| record.properties(properties))
            .collect())
    }

    fn parse_data_store_keys(&self, raw: &str) -> Result<Vec<String>> {
        let doc = successful_document(raw)?;
        let Some(list) = doc.child(1) else {
            return Ok(Vec::new());
        };

        // Every record wraps the key in a nested element: <key><key>name</key></key>.
        Ok(list
            .children
            .iter()
            .map(|record| match record.child(0) {
                Some(inner) => inner.text.clone(),
                None => record.text.clone(),
            })
            .collect())
    }

    fn parse_highscore_rank(&self, raw: &str) -> Result<u64> {
        let doc = successful_document(raw)?;
        let rank = doc
            .child(1)
            .ok_or_else(|| Error::response_invalid("rank response carries no rank"))?;

        rank.text.trim().parse().map_err(|e| {
            Error::response_invalid("rank is not a number")
                .with_source(e)
                .with_context(format!("value: {}", rank.text))
        })
    }

    fn parse_user(&self, raw: &str) -> Result<User> {
        let doc = successful_document(raw)?;
        let node = doc
            .child(1)
            .and_then(|users| users.child(0))
            .ok_or_else(|| Error::response_invalid("users response carries no user"))?;

        let mut user = User::new(node.properties(USER_PROPERTIES));
        if let Some(t) = node.child_named(USER_TYPE) {
            user = user.with_user_type(t.text.parse()?);
        }
        if let Some(s) = node.child_named(USER_STATUS) {
            user = user.with_status(s.text.parse()?);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::HIGHSCORE_PROPERTIES;
    use crate::user::{UserStatus, UserType};
    use pretty_assertions::assert_eq;

    const USER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <success><![CDATA[true]]></success>
  <users>
    <user>
      <id><![CDATA[1]]></id>
      <type><![CDATA[Developer]]></type>
      <username><![CDATA[CROS]]></username>
      <avatar_url><![CDATA[http://gamejolt.com/img/avatar.png]]></avatar_url>
      <signed_up><![CDATA[4 years ago]]></signed_up>
      <last_logged_in><![CDATA[Online Now]]></last_logged_in>
      <status><![CDATA[Active]]></status>
    </user>
  </users>
</response>"#;

    #[test]
    fn test_parse_user() {
        let user = XmlParser.parse_user(USER).unwrap();

        assert_eq!(user.id().unwrap(), 1);
        assert_eq!(user.username(), Some("CROS"));
        assert_eq!(user.last_logged_in(), Some("Online Now"));
        assert_eq!(user.user_type(), Some(UserType::Developer));
        assert_eq!(user.status(), Some(UserStatus::Active));
        assert_eq!(user.properties().get("type"), None);
    }

    #[test]
    fn test_parse_single_only_requested() {
        let raw = "<response><success>true</success><year>2024</year><month>3</month><timezone>UTC</timezone></response>";

        let bag = XmlParser.parse_single(raw, &["year", "month", "day"]).unwrap();
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("year"), Some("2024"));
        assert_eq!(bag.get("day"), None);
    }

    #[test]
    fn test_parse_array_keeps_empty_fields() {
        let raw = "<response><success>true</success><scores>\
            <score><score>100 Coins</score><sort>100</sort><guest/><user>ashley</user></score>\
            <score><score>7 Coins</score><sort>7</sort><guest>visitor</guest><user></user></score>\
            </scores></response>";

        let bags = XmlParser
            .parse_array(raw, "scores", HIGHSCORE_PROPERTIES)
            .unwrap();
        assert_eq!(bags.len(), 2);
        assert_eq!(bags[0].get("guest"), Some(""));
        assert_eq!(bags[0].get("user"), Some("ashley"));
        assert_eq!(bags[1].get("guest"), Some("visitor"));
        assert_eq!(bags[1].get("user"), Some(""));
        assert_eq!(bags[1].get("stored"), None);
    }

    #[test]
    fn test_parse_keys_and_rank() {
        let keys = "<response><success>true</success><keys>\
            <key><key><![CDATA[coins]]></key></key>\
            <key><key><![CDATA[lives]]></key></key>\
            </keys></response>";
        assert_eq!(XmlParser.parse_data_store_keys(keys).unwrap(), ["coins", "lives"]);

        let rank = "<response><success>true</success><rank>12</rank></response>";
        assert_eq!(XmlParser.parse_highscore_rank(rank).unwrap(), 12);
    }

    #[test]
    fn test_parse_array_keeps_whitespace() {
        let raw = "<response>\n  <success> true </success>\n  <scores>\n    \
            <score><score>  100 Coins  </score><extra_data>   </extra_data></score>\n  \
            </scores>\n</response>";

        let bags = XmlParser
            .parse_array(raw, "scores", HIGHSCORE_PROPERTIES)
            .unwrap();
        assert_eq!(bags.len(), 1);
        assert_eq!(bags[0].get("score"), Some("  100 Coins  "));
        assert_eq!(bags[0].get("extra_data"), Some("   "));
    }

    #[test]
    fn test_malformed() {
        assert!(!XmlParser.is_successful("<response><success>true</success>"));
        assert!(!XmlParser.is_successful("<response></response>"));
        assert!(XmlParser
            .parse_array("<response><success>true", "scores", &["score"])
            .is_err());
    }
}
