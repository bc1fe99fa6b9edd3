use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Only algorithm we sign with or accept.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// `sub` claim carried by every session token.
pub const SUBJECT: &str = "user_token";

/// JWT payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub sub: String, // always SUBJECT
    pub iss: String,
    pub iat: i64, // issued at (unix timestamp)
    pub exp: i64, // expires at (unix timestamp)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Signing and verification keys plus the token policy.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_minutes: i64,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            ttl_minutes: cfg.ttl_minutes.max(0),
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> anyhow::Result<String> {
        self.issue_at(user_id, username, OffsetDateTime::now_utc())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = self
            .ttl_minutes
            .checked_mul(60)
            .map(TimeDuration::seconds)
            .and_then(|ttl| now.checked_add(ttl))
            .context("token expiry is out of range")?;
        let claims = Claims {
            user_id,
            username: username.to_string(),
            sub: SUBJECT.to_string(),
            iss: self.issuer.clone(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Verifies signature and claims, judging expiry against `now`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        // Pinned algorithm: the header's `alg` is compared, never trusted.
        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.sub = Some(SUBJECT.to_string());
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_aud = false;
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.exp <= now.unix_timestamp() {
            return Err(TokenError::Expired);
        }
        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

#[cfg(test)]
pub(crate) fn test_keys(secret: &str) -> JwtKeys {
    JwtKeys::new(&JwtConfig {
        secret: secret.into(),
        issuer: "scribe-test".into(),
        ttl_minutes: 60 * 24,
    })
}
