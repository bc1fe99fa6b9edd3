use std::sync::Arc;

use crate::auth::{jwt::JwtKeys, password::Hasher};
use crate::config::AppConfig;
use crate::store::{PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub hasher: Hasher,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store = PgStore::connect(&config.database_url).await?;
        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %format!("{e:#}"), "migration failed; continuing");
        }

        Self::from_parts(Arc::new(store), config)
    }

    pub fn from_parts(store: Arc<dyn Store>, config: AppConfig) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt);
        let hasher = Hasher::new(config.password)?;
        Ok(Self {
            store,
            config: Arc::new(config),
            keys,
            hasher,
        })
    }

    /// In-memory store, cheap hashing and a fixed test secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::for_tests_with(Arc::new(crate::store::memory::MemoryStore::default()))
    }

    #[cfg(test)]
    pub fn for_tests_with(store: Arc<dyn Store>) -> Self {
        use crate::config::{JwtConfig, PasswordConfig};

        let config = AppConfig {
            listen_addr: "127.0.0.1:0".parse().expect("static address"),
            database_url: "memory://".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "scribe-test".into(),
                ttl_minutes: 60 * 24,
            },
            password: PasswordConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        };
        Self::from_parts(store, config).expect("test state")
    }
}
