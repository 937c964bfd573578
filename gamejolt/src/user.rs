use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use gamejolt_core::utils::Redact;
use gamejolt_core::{Error, Result};

use crate::property::PropertyBag;

/// Plain string properties read from a user record.
///
/// `type` and `status` are not in this list: they are parsed into
/// [`UserType`] and [`UserStatus`] separately.
pub const USER_PROPERTIES: &[&str] = &["id", "username", "avatar_url", "signed_up", "last_logged_in"];

pub(crate) const USER_TYPE: &str = "type";
pub(crate) const USER_STATUS: &str = "status";

/// Account type of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    /// Regular player account.
    User,
    /// Developer account.
    Developer,
    /// Site moderator.
    Moderator,
    /// Site administrator.
    Admin,
}

impl FromStr for UserType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserType::User),
            "developer" => Ok(UserType::Developer),
            "moderator" => Ok(UserType::Moderator),
            "admin" | "administrator" => Ok(UserType::Admin),
            v => Err(Error::response_invalid(format!("unknown user type `{v}`"))),
        }
    }
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    /// Account is in good standing.
    Active,
    /// Account is banned.
    Banned,
}

impl FromStr for UserStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "banned" => Ok(UserStatus::Banned),
            v => Err(Error::response_invalid(format!("unknown user status `{v}`"))),
        }
    }
}

/// A Game Jolt user.
///
/// `user_type` and `status` are filled by the parser from wherever the wire
/// format keeps them; every other field is read from the property bag.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    properties: PropertyBag,
    user_type: Option<UserType>,
    status: Option<UserStatus>,
    token: Option<String>,
}

impl User {
    /// Wrap a parsed property bag.
    pub fn new(properties: PropertyBag) -> Self {
        Self {
            properties,
            user_type: None,
            status: None,
            token: None,
        }
    }

    pub(crate) fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    pub(crate) fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the game token this user authenticates with.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Raw properties of this user.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn id(&self) -> Result<u64> {
        self.properties.parse("id")
    }

    pub fn username(&self) -> Option<&str> {
        self.properties.get("username")
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.properties.get("avatar_url")
    }

    /// How long ago the user signed up, as displayed by the site.
    pub fn signed_up(&self) -> Option<&str> {
        self.properties.get("signed_up")
    }

    /// How long ago the user was last seen, as displayed by the site.
    pub fn last_logged_in(&self) -> Option<&str> {
        self.properties.get("last_logged_in")
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user_type
    }

    pub fn status(&self) -> Option<UserStatus> {
        self.status
    }

    /// Game token, only known for the quick-play or verified user.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("properties", &self.properties)
            .field("user_type", &self.user_type)
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(Redact::from))
            .finish()
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User [name={}, type={:?}]",
            self.username().unwrap_or_default(),
            self.user_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("User", UserType::User)]
    #[test_case("Developer", UserType::Developer)]
    #[test_case("MODERATOR", UserType::Moderator)]
    #[test_case("Administrator", UserType::Admin)]
    fn test_user_type_from_str(input: &str, expected: UserType) {
        assert_eq!(input.parse::<UserType>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("Suspended".parse::<UserStatus>().is_err());
        assert_eq!("banned".parse::<UserStatus>().unwrap(), UserStatus::Banned);
    }

    #[test]
    fn test_getters() {
        let user = User::new(PropertyBag::from_iter([
            ("id", "7"),
            ("username", "ashley"),
            ("avatar_url", "http://cdn/a.png"),
        ]))
        .with_user_type(UserType::Developer)
        .with_token("abcdef");

        assert_eq!(user.id().unwrap(), 7);
        assert_eq!(user.username(), Some("ashley"));
        assert_eq!(user.signed_up(), None);
        assert_eq!(user.user_type(), Some(UserType::Developer));
        assert_eq!(user.status(), None);
        assert_eq!(user.token(), Some("abcdef"));
        assert!(!format!("{user:?}").contains("abcdef"));
    }
}
