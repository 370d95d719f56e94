//! Users and session tokens

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use super::db::{from_ms, to_ms};
use super::Store;
use crate::domain::{Session, User};

const USER_COLUMNS: &str = "id, email, name, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: from_ms(row.get(3)?),
    })
}

impl Store {
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![user.id, user.email, user.name, to_ms(user.created_at)],
            )
            .with_context(|| format!("Failed to create user {}", user.email))?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        Ok(self.conn().query_row(&sql, [id], user_from_row).optional()?)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        let email = email.trim().to_lowercase();
        Ok(self.conn().query_row(&sql, [email], user_from_row).optional()?)
    }

    /// Issue a new bearer token for the user
    pub fn create_session(&self, user_id: &str) -> Result<Session> {
        let session = Session::new(user_id, Utc::now());
        self.conn().execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![session.token, session.user_id, to_ms(session.created_at)],
        )?;
        Ok(session)
    }

    /// Resolve a bearer token to its user
    pub fn user_for_token(&self, token: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = (SELECT user_id FROM sessions WHERE token = ?1)",
            USER_COLUMNS
        );
        Ok(self.conn().query_row(&sql, [token], user_from_row).optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_resolves_user() {
        let store = Store::open_in_memory().unwrap();
        let user = User::new("ada@example.com", None, Utc::now());
        store.insert_user(&user).unwrap();

        let session = store.create_session(&user.id).unwrap();
        let found = store.user_for_token(&session.token).unwrap().unwrap();
        assert_eq!(found.id, user.id);

        assert!(store.user_for_token("nope").unwrap().is_none());
        assert_eq!(
            store.find_user_by_email("ADA@example.com").unwrap().unwrap().id,
            user.id
        );
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert_user(&User::new("ada@example.com", None, Utc::now()))
            .unwrap();
        assert!(
            store
                .insert_user(&User::new("ada@example.com", None, Utc::now()))
                .is_err()
        );
    }
}
