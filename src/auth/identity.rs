//! Current-user identity decoded from the stored credential
//!
//! The platform issues a JWT whose payload carries `_id` and `role`. The
//! client reads identity locally instead of calling a whoami endpoint. The
//! signature is not verified here; the server remains the authority and this
//! is a display/routing capability only.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::models::{CurrentUser, Role};

/// Failure to extract an identity from a token.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("token is not a JWT (expected three dot-separated segments)")]
    Malformed,
    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid claims JSON: {0}")]
    Claims(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(rename = "_id")]
    id: String,
    role: Role,
    exp: Option<u64>,
}

/// Decode `{_id, role}` from a JWT without verifying its signature.
pub fn current_user(token: &str) -> Result<CurrentUser, IdentityError> {
    let claims = decode_claims(token)?;
    Ok(CurrentUser {
        id: claims.id,
        role: claims.role,
    })
}

/// Expiry (unix seconds) from the JWT `exp` claim, if present.
pub fn token_expiry(token: &str) -> Result<Option<u64>, IdentityError> {
    Ok(decode_claims(token)?.exp)
}

fn decode_claims(token: &str) -> Result<Claims, IdentityError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => return Err(IdentityError::Malformed),
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn test_decodes_id_and_role() {
        let token = make_token(serde_json::json!({
            "_id": "u42",
            "role": "employee",
            "exp": 1790000000u64
        }));
        let user = current_user(&token).unwrap();
        assert_eq!(user.id, "u42");
        assert_eq!(user.role, Role::Employee);
        assert_eq!(token_expiry(&token).unwrap(), Some(1790000000));
    }

    #[test]
    fn test_missing_exp_is_none() {
        let token = make_token(serde_json::json!({"_id": "u1", "role": "student"}));
        assert_eq!(token_expiry(&token).unwrap(), None);
    }

    #[test]
    fn test_rejects_non_jwt() {
        assert!(matches!(
            current_user("not-a-jwt"),
            Err(IdentityError::Malformed)
        ));
    }

    #[test]
    fn test_rejects_garbage_payload() {
        assert!(current_user("a.!!!.c").is_err());
    }
}
