use std::sync::Arc;

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

/// Argon2id hasher with a configurable work factor.
#[derive(Clone)]
pub struct Hasher {
    params: Params,
    // Digest of a throwaway secret under the current cost, verified against
    // when no account matches so both login failures take the same time.
    decoy: Arc<str>,
}

impl Hasher {
    pub fn new(cfg: PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!(e.to_string()))
            .context("invalid argon2 parameters")?;
        let mut hasher = Self {
            params,
            decoy: Arc::from(""),
        };
        hasher.decoy = hasher.hash("scribe-decoy-password")?.into();
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Salted one-way digest in PHC string form. A fresh salt is drawn on
    /// every call, so equal inputs give different digests.
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch, `Err` when the stored digest is unreadable.
    /// Cost parameters are taken from the digest itself.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Runs a full verification against the decoy digest. The outcome is
    /// always a mismatch.
    pub async fn verify_decoy_blocking(&self, plain: String) -> anyhow::Result<()> {
        let decoy = self.decoy.to_string();
        self.verify_blocking(plain, decoy).await.map(|_| ())
    }

    /// [`Hasher::hash`] on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .context("password hashing task failed")?
    }

    /// [`Hasher::verify`] on the blocking pool.
    pub async fn verify_blocking(&self, plain: String, hash: String) -> anyhow::Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .context("password verification task failed")?
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> Hasher {
    Hasher::new(PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}
