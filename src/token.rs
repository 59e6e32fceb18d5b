//! Signed access tokens.
//!
//! Format: `base64url(json claims) "." base64url(hmac-sha256(payload_b64))`.
//! A token names the session it belongs to; the session cache decides whether
//! that session is still alive.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::models::UserId;

type HmacSha256 = Hmac<Sha256>;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token secret is too short (min {MIN_SECRET_LEN} bytes)")]
    SecretTooShort,

    #[error("invalid token format")]
    InvalidFormat,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,

    #[error("failed to parse token payload")]
    PayloadParse,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub session_id: String,
    pub issued_at_ms: u64,
    pub expires_at_ms: u64,
}

impl Claims {
    pub fn is_expired(&self, reference_ms: u64) -> bool {
        reference_ms >= self.expires_at_ms
    }
}

/// Issues and checks access tokens. Cheap to clone.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::SecretTooShort);
        }
        Ok(Self { secret: Arc::from(secret), ttl })
    }

    /// Issues a token for `session_id` valid for the configured TTL.
    pub fn issue(
        &self,
        user_id: UserId,
        session_id: &str,
        issued_at_ms: u64,
    ) -> Result<(String, Claims), TokenError> {
        let claims = Claims {
            user_id,
            session_id: session_id.to_owned(),
            issued_at_ms,
            expires_at_ms: issued_at_ms.saturating_add(self.ttl.as_millis() as u64),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| TokenError::PayloadParse)?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let signature_b64 = URL_SAFE_NO_PAD.encode(self.sign(payload_b64.as_bytes())?);
        Ok((format!("{payload_b64}.{signature_b64}"), claims))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str, reference_ms: u64) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.is_expired(reference_ms) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Checks the signature only. Expired tokens decode fine.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenError::InvalidFormat)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidFormat)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::InvalidSignature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::InvalidFormat)?;
        serde_json::from_slice(&payload).map_err(|_| TokenError::PayloadParse)
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::InvalidSignature)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
