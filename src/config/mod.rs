//! Configuration and credential storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::auth::{StoredToken, TokenStore};

/// Default platform URL, overridable via `login --server`.
pub const DEFAULT_SERVER_URL: &str = "https://api.refnet.app";

/// Application configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Stored platform bearer token (JWT issued by the RefNet web app)
    pub auth_token: Option<StoredToken>,
    /// Platform base URL (REST and push endpoints derive from it)
    pub server_url: Option<String>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "refnet", "refnet-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        // Set restrictive permissions on config file (contains tokens)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Base URL for REST and push endpoints.
    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn set_server_url(&mut self, url: String) {
        self.server_url = Some(url.trim_end_matches('/').to_string());
    }
}

impl TokenStore for Config {
    fn get_auth_token(&self) -> Option<StoredToken> {
        self.auth_token.clone()
    }

    fn set_auth_token(&mut self, token: String, expires_at: Option<u64>) {
        self.auth_token = Some(StoredToken::new(token, expires_at));
    }

    fn clear_tokens(&mut self) {
        self.auth_token = None;
    }
}
