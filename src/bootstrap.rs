use anyhow::Context;
use tracing::{info, warn};

use crate::{
    auth::{
        repo::{AccountStore, StoreError},
        repo_types::{Account, Admin, User},
    },
    config::{SeedConfig, DEFAULT_SEED_PASSWORD},
    db,
};

/// Create the schema and the two seed accounts. Runs before the listener is
/// bound; any error here must stop the process.
pub async fn run(store: &AccountStore, seed: &SeedConfig) -> anyhow::Result<()> {
    db::migrate(store.pool()).await?;

    if seed.password == DEFAULT_SEED_PASSWORD {
        warn!("seed accounts use the default password; set SEED_PASSWORD");
    }

    ensure_seed::<User>(store, &seed.user_username, &seed.user_email, &seed.password)
        .await
        .context("seed user")?;
    ensure_seed::<Admin>(store, &seed.admin_username, &seed.admin_email, &seed.password)
        .await
        .context("seed admin")?;
    Ok(())
}

async fn ensure_seed<A: Account>(
    store: &AccountStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), StoreError> {
    if store.find_by_email::<A>(email).await?.is_some() {
        info!(kind = %A::KIND, email = %email, "seed account present");
        return Ok(());
    }

    match store.create::<A>(username, email, password).await {
        Ok(_) => {
            info!(kind = %A::KIND, email = %email, "seed account created");
            Ok(())
        }
        // another process seeded it between our lookup and insert
        Err(StoreError::DuplicateEmail) => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn empty_store() -> AccountStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        AccountStore::new(pool)
    }

    #[tokio::test]
    async fn creates_schema_and_seeds() {
        let store = empty_store().await;
        let seed = SeedConfig::default();
        run(&store, &seed).await.expect("bootstrap");

        let user = store
            .authenticate_user(&seed.user_email, &seed.password)
            .await
            .unwrap()
            .expect("seed user can log in");
        assert_eq!(user.username, seed.user_username);

        let admin = store
            .authenticate_admin(&seed.admin_email, &seed.password)
            .await
            .unwrap()
            .expect("seed admin can log in");
        assert_eq!(admin.username, seed.admin_username);
    }

    #[tokio::test]
    async fn running_twice_keeps_one_of_each() {
        let store = empty_store().await;
        let seed = SeedConfig::default();
        run(&store, &seed).await.unwrap();
        run(&store, &seed).await.expect("second bootstrap is a no-op");

        assert_eq!(store.list_all::<User>().await.unwrap().len(), 1);
        assert_eq!(store.list_all::<Admin>().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn existing_seed_keeps_its_password() {
        let store = empty_store().await;
        let seed = SeedConfig::default();
        run(&store, &seed).await.unwrap();
        store
            .update_user_password(&seed.user_email, "rotated-secret")
            .await
            .unwrap();

        run(&store, &seed).await.unwrap();
        assert!(store
            .authenticate_user(&seed.user_email, "rotated-secret")
            .await
            .unwrap()
            .is_some());
    }
}
