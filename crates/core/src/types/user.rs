//! Storefront user account as returned by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, UserId};

/// A registered storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    pub email: Email,
    /// Absent on accounts created implicitly at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to greet the user with: the username, else the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            self.email
                .as_str()
                .split_once('@')
                .map_or(self.email.as_str(), |(local, _)| local)
        } else {
            &self.username
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_timestamp() {
        let user: User = serde_json::from_str(
            r#"{"id": 3, "username": "maria", "email": "maria@example.com", "created_at": "2025-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId::new(3));
        assert!(user.created_at.is_some());
        assert_eq!(user.display_name(), "maria");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user: User =
            serde_json::from_str(r#"{"id": 4, "email": "guest@example.com"}"#).unwrap();
        assert_eq!(user.display_name(), "guest");
    }
}
