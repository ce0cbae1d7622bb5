//! Authenticated HTTP client for the RefNet REST API
//!
//! Wraps reqwest::Client with bearer-token injection and uniform status
//! handling.

use anyhow::{bail, Context, Result};

use crate::auth::{identity, TokenStore};
use crate::config::Config;
use crate::models::CurrentUser;

/// Authenticated client holding the loaded config and a reqwest client.
pub struct RefNetClient {
    http: reqwest::Client,
    config: Config,
    token: String,
}

impl RefNetClient {
    /// Load config and build a client. Fails up front when no usable token is
    /// stored so every command gives the same "run login" message.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;

        let stored = config
            .get_auth_token()
            .context("Not logged in. Run `refnet-cli login` first.")?;
        if stored.is_expired() {
            bail!("Token expired. Obtain a fresh token and run `refnet-cli login`.");
        }

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            token: stored.token,
        })
    }

    /// Platform base URL from config.
    pub fn server_url(&self) -> String {
        self.config.server_url()
    }

    /// Bearer token for non-REST consumers (channel connect).
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Identity decoded from the stored token.
    pub fn current_user(&self) -> Result<CurrentUser> {
        identity::current_user(&self.token).context("Stored token is not a valid credential")
    }

    /// GET request against the REST API (bearer auth).
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.server_url(), path);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        check_response(resp, &url).await
    }

    /// PATCH request against the REST API (bearer auth, no body).
    pub async fn patch(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.server_url(), path);
        tracing::debug!("PATCH {}", url);

        let resp = self
            .http
            .patch(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("PATCH {} failed", url))?;

        check_response(resp, &url).await
    }

    /// Multipart POST against the REST API (bearer auth).
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.server_url(), path);
        tracing::debug!("POST (multipart) {}", url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        check_response(resp, &url).await
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!(
            "401 Unauthorized for {}. Token may be invalid -- run `refnet-cli login`.",
            url
        );
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("HTTP {} for {}: {}", status.as_u16(), url, body);
    }
    Ok(resp)
}
