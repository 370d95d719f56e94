use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New user; the name falls back to the local part of the email
    pub fn new(email: &str, name: Option<&str>, now: DateTime<Utc>) -> Self {
        let email = email.trim().to_lowercase();
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        Self {
            id: super::new_id(),
            email,
            name,
            created_at: now,
        }
    }
}

/// Bearer token bound to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_defaults_to_email_prefix() {
        let user = User::new(" Ada@Example.com ", None, Utc::now());
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "ada");

        let user = User::new("ada@example.com", Some("Ada L."), Utc::now());
        assert_eq!(user.name, "Ada L.");
    }
}
