use std::sync::Arc;

use crate::{auth::repo::AccountStore, config::AppConfig, db};

#[derive(Clone)]
pub struct AppState {
    pub store: AccountStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;
        Ok(Self {
            store: AccountStore::new(pool),
            config,
        })
    }

    /// State over an in-memory database with a throwaway JWT secret.
    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::config::{JwtConfig, SeedConfig};

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            seed: SeedConfig::default(),
        });
        Self {
            store: AccountStore::new(db::memory_pool().await),
            config,
        }
    }
}
