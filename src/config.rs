use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Accounts created by bootstrap so the site has a usable login out of the box.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub user_username: String,
    pub user_email: String,
    pub admin_username: String,
    pub admin_email: String,
    pub password: String,
}

pub const DEFAULT_SEED_PASSWORD: &str = "admin123";

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            user_username: "admin".into(),
            user_email: "admin@example.com".into(),
            admin_username: "admin".into(),
            admin_email: "admin@gmail.com".into(),
            password: DEFAULT_SEED_PASSWORD.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://users.db".into());
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_or("APP_PORT", 8000)?;

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pointsgate".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pointsgate-web".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60)?,
        };

        let defaults = SeedConfig::default();
        let seed = SeedConfig {
            user_username: std::env::var("SEED_USER_USERNAME").unwrap_or(defaults.user_username),
            user_email: std::env::var("SEED_USER_EMAIL").unwrap_or(defaults.user_email),
            admin_username: std::env::var("SEED_ADMIN_USERNAME")
                .unwrap_or(defaults.admin_username),
            admin_email: std::env::var("SEED_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            password: std::env::var("SEED_PASSWORD").unwrap_or(defaults.password),
        };

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            jwt,
            seed,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
