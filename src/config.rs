use std::{fmt, net::SocketAddr};

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
}

// The signing secret must never reach a log line.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Argon2 work factor. Changing it only affects newly created hashes; stored
/// hashes carry their own parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Upper bound on session lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 366 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&get, "APP_PORT", 8081)?;
        let listen_addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("APP_HOST {host:?} is not a valid address"))?;

        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = get("JWT_SECRET").context("JWT_SECRET is not set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "scribe".into()),
            ttl_minutes: parse_or(&get, "JWT_TTL_MINUTES", 60 * 24)?,
        };
        if !(1..=MAX_TTL_MINUTES).contains(&jwt.ttl_minutes) {
            bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}");
        }

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_or(&get, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&get, "PASSWORD_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&get, "PASSWORD_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            listen_addr,
            database_url,
            jwt,
            password,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value")),
        None => Ok(default),
    }
}
