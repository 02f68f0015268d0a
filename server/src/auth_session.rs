//! Signed session tokens, stored in the client's session cookie
//!
//! A token is serialized as `<payload>.<signature>`, both base64url-encoded (without padding). The
//! payload is `<user_id>:<issued_at>` with the issue time as unix timestamp, the signature is a
//! HMAC-SHA256 of the encoded payload, keyed with the application secret.

use crate::data_store::UserId;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    user_id: UserId,
    issued_at: DateTime<Utc>,
}

impl SessionToken {
    /// Create a new session token for the given (authenticated) user, issued now.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            issued_at: Utc::now(),
        }
    }

    /// Parse and verify a session token string, as created by [Self::as_string].
    ///
    /// Tokens issued more than `max_age` ago are rejected.
    pub fn from_string(data: &str, secret: &str, max_age: TimeDelta) -> Result<Self, SessionError> {
        let (encoded_payload, encoded_signature) = data
            .split_once('.')
            .ok_or(SessionError::InvalidTokenStructure)?;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let signature = engine
            .decode(encoded_signature)
            .map_err(|_| SessionError::InvalidTokenStructure)?;
        ring::hmac::verify(&signing_key(secret), encoded_payload.as_bytes(), &signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let payload = engine
            .decode(encoded_payload)
            .map_err(|_| SessionError::InvalidTokenStructure)?;
        let payload =
            String::from_utf8(payload).map_err(|_| SessionError::InvalidTokenStructure)?;
        let (user_id, issued_at) = payload
            .split_once(':')
            .ok_or(SessionError::InvalidTokenStructure)?;
        let user_id = user_id
            .parse::<UserId>()
            .map_err(|_| SessionError::InvalidTokenStructure)?;
        let issued_at = issued_at
            .parse::<i64>()
            .ok()
            .and_then(|timestamp| DateTime::<Utc>::from_timestamp(timestamp, 0))
            .ok_or(SessionError::InvalidTokenStructure)?;

        if issued_at + max_age < Utc::now() {
            return Err(SessionError::ExpiredToken);
        }
        Ok(Self { user_id, issued_at })
    }

    /// Serialize and sign the session token for storing it in the session cookie.
    pub fn as_string(&self, secret: &str) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let encoded_payload =
            engine.encode(format!("{}:{}", self.user_id, self.issued_at.timestamp()));
        let signature = ring::hmac::sign(&signing_key(secret), encoded_payload.as_bytes());
        format!("{}.{}", encoded_payload, engine.encode(signature.as_ref()))
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

fn signing_key(secret: &str) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret.as_bytes())
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    InvalidTokenStructure,
    InvalidSignature,
    ExpiredToken,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidTokenStructure => f.write_str("Invalid session token structure"),
            SessionError::InvalidSignature => f.write_str("Invalid session token signature"),
            SessionError::ExpiredToken => f.write_str("Session token expired"),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-very-secret-test-secret";

    #[test]
    fn test_session_token_roundtrip() {
        let token = SessionToken::for_user(42);
        let data = token.as_string(SECRET);
        let parsed = SessionToken::from_string(&data, SECRET, TimeDelta::days(1)).unwrap();
        assert_eq!(parsed.user_id(), 42);
        assert_eq!(parsed.issued_at.timestamp(), token.issued_at.timestamp());
    }

    #[test]
    fn test_session_token_wrong_secret() {
        let data = SessionToken::for_user(42).as_string(SECRET);
        assert_eq!(
            SessionToken::from_string(&data, "another secret", TimeDelta::days(1)),
            Err(SessionError::InvalidSignature)
        );
    }

    #[test]
    fn test_session_token_tampered_payload() {
        let data = SessionToken::for_user(42).as_string(SECRET);
        let (_, signature) = data.split_once('.').unwrap();
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let forged = format!("{}.{}", engine.encode("1:1900000000"), signature);
        assert_eq!(
            SessionToken::from_string(&forged, SECRET, TimeDelta::days(1)),
            Err(SessionError::InvalidSignature)
        );
        assert_eq!(
            SessionToken::from_string("garbage", SECRET, TimeDelta::days(1)),
            Err(SessionError::InvalidTokenStructure)
        );
    }

    #[test]
    fn test_session_token_expired() {
        let token = SessionToken {
            user_id: 42,
            issued_at: Utc::now() - TimeDelta::days(15),
        };
        let data = token.as_string(SECRET);
        assert_eq!(
            SessionToken::from_string(&data, SECRET, TimeDelta::days(14)),
            Err(SessionError::ExpiredToken)
        );
        assert!(SessionToken::from_string(&data, SECRET, TimeDelta::days(16)).is_ok());
    }
}
