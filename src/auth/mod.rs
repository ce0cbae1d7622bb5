//! Authentication for the RefNet platform
//!
//! The platform issues bearer tokens through its web app; the CLI stores one
//! and decodes the current user's identity from it locally.

pub mod identity;
pub mod tokens;

pub use tokens::{StoredToken, TokenStore};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::config::Config;

/// Store a platform-issued token (and optionally a server URL override).
///
/// The token is decoded once up front so a bad paste fails here instead of on
/// the first API call.
pub fn login(token: &str, server: Option<&str>) -> Result<()> {
    let user = identity::current_user(token).context("Token is not a valid RefNet credential")?;
    let expires_at = identity::token_expiry(token).unwrap_or(None);

    let mut config = Config::load()?;
    config.set_auth_token(token.to_string(), expires_at);
    if let Some(url) = server {
        config.set_server_url(url.to_string());
    }
    config.save()?;

    println!("Logged in as {} ({})", user.id, user.role.as_str());
    Ok(())
}

/// Clear stored credentials.
pub fn logout() -> Result<()> {
    let mut config = Config::load()?;
    config.clear_tokens();
    config.save()?;
    println!("Logged out.");
    Ok(())
}

/// Show stored identity, server, and token expiry.
pub fn status() -> Result<()> {
    let config = Config::load()?;

    println!("Server: {}", config.server_url());

    match config.get_auth_token() {
        Some(stored) => {
            match identity::current_user(&stored.token) {
                Ok(user) => {
                    println!("User:   {} ({})", user.id, user.role.as_str());
                }
                Err(e) => {
                    println!("User:   (stored token is unreadable: {})", e);
                }
            }
            match stored.expires_at {
                Some(exp) => {
                    let when = DateTime::<Utc>::from_timestamp(exp as i64, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| exp.to_string());
                    if stored.is_expired() {
                        println!("Token:  expired ({})", when);
                    } else {
                        println!("Token:  valid until {}", when);
                    }
                }
                None => println!("Token:  no expiry recorded"),
            }
        }
        None => {
            println!("Not logged in. Run `refnet-cli login --token <jwt>`.");
        }
    }

    Ok(())
}

/// Decode and print the current user from the stored token (no network).
pub fn whoami() -> Result<()> {
    let config = Config::load()?;
    let stored = config
        .get_auth_token()
        .context("Not logged in. Run `refnet-cli login` first.")?;
    if stored.is_expired() {
        bail!("Token expired. Obtain a fresh token and run `refnet-cli login`.");
    }

    let user = identity::current_user(&stored.token)?;
    println!("ID:   {}", user.id);
    println!("Role: {}", user.role.as_str());
    Ok(())
}
