//! Credential resolution for the czds CLI.

use anyhow::{Context, Result};
use inquire::{Password, Text};

/// ICANN account credentials.
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Uses the given values and prompts for whatever is missing or empty.
pub(crate) fn resolve(username: Option<String>, password: Option<String>) -> Result<Credentials> {
    let username = match username.filter(|u| !u.is_empty()) {
        Some(username) => username,
        None => Text::new("ICANN Username:")
            .prompt()
            .context("Failed to read username")?,
    };

    let password = match password.filter(|p| !p.is_empty()) {
        Some(password) => password,
        None => Password::new("ICANN Password:")
            .without_confirmation()
            .prompt()
            .context("Failed to read password")?,
    };

    Ok(Credentials { username, password })
}
