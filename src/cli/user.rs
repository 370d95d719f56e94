//! User management: accounts and session tokens

use anyhow::{bail, Result};
use chrono::Utc;

use donow::config::Config;
use donow::domain::User;

/// Create a user and print a bearer token for it
pub fn add_command(config: &Config, email: &str, name: Option<&str>) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        bail!("Invalid email address: {:?}", email);
    }

    let store = super::open_store(config)?;
    if store.find_user_by_email(email)?.is_some() {
        bail!("User already exists: {} (use `donow user token` for a new token)", email);
    }

    let user = User::new(email, name, Utc::now());
    store.insert_user(&user)?;
    store.ensure_default_task(&user.id)?;
    let session = store.create_session(&user.id)?;

    println!("Created user {} <{}>", user.name, user.email);
    println!("Token: {}", session.token);
    Ok(())
}

/// Issue another token for an existing user
pub fn token_command(config: &Config, email: &str) -> Result<()> {
    let store = super::open_store(config)?;
    let Some(user) = store.find_user_by_email(email)? else {
        bail!("No user with email {}", email);
    };
    let session = store.create_session(&user.id)?;
    println!("Token: {}", session.token);
    Ok(())
}
