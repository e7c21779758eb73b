use lazy_static::lazy_static;
use sqlx::{Sqlite, SqlitePool};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::{
    password::{self, PasswordError},
    repo_types::{Account, Admin, User, UserSummary},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

lazy_static! {
    // Verified against when the email is unknown so both failure paths cost the same.
    static ref DUMMY_HASH: Option<String> =
        password::hash_password("pointsgate-unknown-account").ok();
}

/// Handle to the two account tables. Cheap to clone; every operation checks
/// out its own pooled connection and gives it back when it returns.
#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Exact, case-sensitive match on email.
    pub async fn find_by_email<A: Account>(&self, email: &str) -> Result<Option<A>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE email = ?", A::COLUMNS, A::TABLE);
        let mut conn = self.pool.acquire().await?;
        let account = sqlx::query_as::<Sqlite, A>(&sql)
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(account)
    }

    /// Usernames are not unique; the oldest match wins.
    pub async fn find_by_username<A: Account>(
        &self,
        username: &str,
    ) -> Result<Option<A>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE username = ? ORDER BY id LIMIT 1",
            A::COLUMNS,
            A::TABLE
        );
        let mut conn = self.pool.acquire().await?;
        let account = sqlx::query_as::<Sqlite, A>(&sql)
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(account)
    }

    /// Hash the password and insert a new record.
    ///
    /// Duplicate emails are caught by the table's UNIQUE constraint rather than
    /// a prior lookup, so two concurrent registrations cannot both succeed.
    pub async fn create<A: Account>(
        &self,
        username: &str,
        email: &str,
        plain_password: &str,
    ) -> Result<A, StoreError> {
        let hashed = hash_blocking(plain_password.to_owned()).await?;
        let sql = format!(
            "INSERT INTO {} (username, email, hashed_password, created_at) VALUES (?, ?, ?, ?) RETURNING {}",
            A::TABLE,
            A::COLUMNS
        );

        let mut conn = self.pool.acquire().await?;
        let account = sqlx::query_as::<Sqlite, A>(&sql)
            .bind(username)
            .bind(email)
            .bind(&hashed)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(&mut *conn)
            .await
            .map_err(map_insert_error)?;

        info!(kind = %A::KIND, id = account.id(), username = %account.username(), "account created");
        Ok(account)
    }

    pub async fn update_password(&self, email: &str, new_password: &str) -> Result<(), StoreError> {
        let hashed = hash_blocking(new_password.to_owned()).await?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE users SET hashed_password = ? WHERE email = ?")
            .bind(&hashed)
            .bind(email)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await?;

        info!(email = %email, "password updated");
        Ok(())
    }

    /// `None` for an unknown email and for a wrong password alike.
    pub async fn authenticate<A: Account>(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<Option<A>, StoreError> {
        let Some(account) = self.find_by_email::<A>(email).await? else {
            let plain = plain_password.to_owned();
            tokio::task::spawn_blocking(move || {
                DUMMY_HASH
                    .as_ref()
                    .map(|dummy| password::verify_password(&plain, dummy))
            })
            .await?
            .transpose()?;
            debug!(kind = %A::KIND, "authentication rejected");
            return Ok(None);
        };

        let ok = verify_blocking(
            plain_password.to_owned(),
            account.hashed_password().to_owned(),
        )
        .await?;
        if !ok {
            debug!(kind = %A::KIND, "authentication rejected");
            return Ok(None);
        }
        Ok(Some(account))
    }

    /// Snapshot of every record of a kind, in id order.
    pub async fn list_all<A: Account>(&self) -> Result<Vec<A>, StoreError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", A::COLUMNS, A::TABLE);
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<Sqlite, A>(&sql).fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        plain_password: &str,
    ) -> Result<User, StoreError> {
        self.create::<User>(username, email, plain_password).await
    }

    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        plain_password: &str,
    ) -> Result<Admin, StoreError> {
        self.create::<Admin>(username, email, plain_password).await
    }

    pub async fn authenticate_user(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<Option<User>, StoreError> {
        self.authenticate::<User>(email, plain_password).await
    }

    pub async fn authenticate_admin(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<Option<Admin>, StoreError> {
        self.authenticate::<Admin>(email, plain_password).await
    }

    pub async fn update_user_password(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        self.update_password(email, new_password).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let users = self.list_all::<User>().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(e)
}

async fn hash_blocking(plain: String) -> Result<String, StoreError> {
    let hashed = tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;
    Ok(hashed)
}

async fn verify_blocking(plain: String, hash: String) -> Result<bool, StoreError> {
    let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash)).await??;
    Ok(ok)
}
