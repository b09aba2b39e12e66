//! Session token inspection
//!
//! The server signs session tokens; the client cannot verify them and does
//! not try to. It only reads the `exp` claim so an expired session can be
//! reported before a request is sent.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::TokenError;

/// Claims the client cares about
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,
}

impl SessionClaims {
    /// Whether the token has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}

/// Decode the claims of a JWT without checking its signature
pub fn inspect_token(token: &str) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let token_data = decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;

    Ok(token_data.claims)
}

/// Whether `token` is a JWT that has expired at `now`.
///
/// Opaque tokens are never reported as expired; the server decides.
pub fn session_expired(token: &str, now: DateTime<Utc>) -> bool {
    match inspect_token(token) {
        Ok(claims) => claims.is_expired(now),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn signed_token(exp: i64) -> String {
        let claims = SessionClaims {
            sub: Some("officer-42".to_string()),
            exp: Some(exp),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_inspect_token_reads_claims() {
        let exp = (Utc::now() + Duration::minutes(15)).timestamp();
        let claims = inspect_token(&signed_token(exp)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("officer-42"));
        assert_eq!(claims.exp, Some(exp));
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_expired_token() {
        let exp = (Utc::now() - Duration::minutes(1)).timestamp();
        assert!(session_expired(&signed_token(exp), Utc::now()));
    }

    #[test]
    fn test_opaque_token_is_not_expired() {
        assert!(inspect_token("not-a-jwt").is_err());
        assert!(!session_expired("not-a-jwt", Utc::now()));
    }
}
