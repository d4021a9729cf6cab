//! Player identity, as handed over by the registration flow.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IdentityError;

/// Longest username the leaderboard accepts.
pub const MAX_USERNAME_LENGTH: usize = 24;

/// A validated player identity. Without one, the session is anonymous and scores
/// are never submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IdentityPayload", into = "IdentityPayload")]
pub struct Identity {
    username: String,
}

/// Wire shape of an identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityPayload {
    username: String,
}

impl Identity {
    /// Validates a username: 1 to 24 characters, letters, digits, `_`, `-`, `.` or spaces.
    /// Surrounding whitespace is ignored.
    pub fn new(username: impl AsRef<str>) -> Result<Self, IdentityError> {
        let username = username.as_ref().trim();

        if username.is_empty() {
            return Err(IdentityError::Empty);
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(IdentityError::TooLong {
                max: MAX_USERNAME_LENGTH,
            });
        }
        if let Some(invalid) = username
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ')))
        {
            return Err(IdentityError::InvalidCharacter(invalid));
        }

        Ok(Self {
            username: username.to_string(),
        })
    }

    /// Reads an identity from a JSON `{ "username": ... }` record.
    ///
    /// Anything else is rejected and logged; callers fall back to an anonymous session.
    pub fn from_payload(payload: &str) -> Result<Self, IdentityError> {
        match serde_json::from_str::<IdentityPayload>(payload) {
            Ok(record) => Self::new(record.username).inspect_err(|error| {
                warn!(%error, "Rejected identity record");
            }),
            Err(error) => {
                warn!(%error, "Identity payload is not a username record");
                Err(IdentityError::MalformedPayload)
            }
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl TryFrom<IdentityPayload> for Identity {
    type Error = IdentityError;

    fn try_from(payload: IdentityPayload) -> Result<Self, Self::Error> {
        Identity::new(payload.username)
    }
}

impl From<Identity> for IdentityPayload {
    fn from(identity: Identity) -> Self {
        IdentityPayload {
            username: identity.username,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert_eq!(Identity::new("pac_fan-99").map(|i| i.username().to_string()), Ok("pac_fan-99".into()));
        assert_eq!(Identity::new("  Ms. Pac Man ").map(|i| i.username().to_string()), Ok("Ms. Pac Man".into()));
    }

    #[test]
    fn test_invalid_usernames() {
        assert_eq!(Identity::new("   "), Err(IdentityError::Empty));
        assert_eq!(Identity::new("a".repeat(25)), Err(IdentityError::TooLong { max: 24 }));
        assert_eq!(Identity::new("drop;table"), Err(IdentityError::InvalidCharacter(';')));
    }

    #[test]
    fn test_from_payload() {
        assert_eq!(
            Identity::from_payload(r#"{"username":"blinky"}"#).map(|i| i.to_string()),
            Ok("blinky".to_string())
        );
        assert_eq!(Identity::from_payload(r#"{"name":"blinky"}"#), Err(IdentityError::MalformedPayload));
        assert_eq!(Identity::from_payload("[1, 2]"), Err(IdentityError::MalformedPayload));
        assert_eq!(Identity::from_payload(r#"{"username":""}"#), Err(IdentityError::Empty));
    }
}
