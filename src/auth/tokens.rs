//! Token storage and management

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stored bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    /// Unix timestamp of expiry (from the JWT `exp` claim), if known.
    pub expires_at: Option<u64>,
}

impl StoredToken {
    pub fn new(token: String, expires_at: Option<u64>) -> Self {
        Self { token, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_secs();
                // Consider expired if less than 5 minutes remaining
                now + 300 >= exp
            }
            None => false,
        }
    }
}

/// Token store trait for different storage backends
pub trait TokenStore {
    fn get_auth_token(&self) -> Option<StoredToken>;
    fn set_auth_token(&mut self, token: String, expires_at: Option<u64>);
    fn clear_tokens(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = StoredToken::new("abc".to_string(), None);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_expiring_soon_counts_as_expired() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        // 60s remaining is inside the 5-minute early-expiry window.
        let token = StoredToken::new("abc".to_string(), Some(now + 60));
        assert!(token.is_expired());

        let token = StoredToken::new("abc".to_string(), Some(now + 3600));
        assert!(!token.is_expired());
    }
}
