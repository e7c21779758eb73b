use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow};
use time::OffsetDateTime;

/// Which of the two disjoint account families a record belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    User,
    Admin,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::User => f.write_str("user"),
            AccountKind::Admin => f.write_str("admin"),
        }
    }
}

/// A persisted account row. Emails are unique within a kind only.
pub trait Account: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    const KIND: AccountKind;
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn id(&self) -> i64;
    fn username(&self) -> &str;
    fn email(&self) -> &str;
    fn hashed_password(&self) -> &str;
}

/// Site visitor with a points balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 PHC string, never exposed
    pub points: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Account for User {
    const KIND: AccountKind = AccountKind::User;
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = "id, username, email, hashed_password, points, created_at";

    fn id(&self) -> i64 {
        self.id
    }
    fn username(&self) -> &str {
        &self.username
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn hashed_password(&self) -> &str {
        &self.hashed_password
    }
}

impl Account for Admin {
    const KIND: AccountKind = AccountKind::Admin;
    const TABLE: &'static str = "admin";
    const COLUMNS: &'static str = "id, username, email, hashed_password, created_at";

    fn id(&self) -> i64 {
        self.id
    }
    fn username(&self) -> &str {
        &self.username
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn hashed_password(&self) -> &str {
        &self.hashed_password
    }
}

/// Row of the admin listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub points: f64,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            email: u.email,
            points: u.points,
        }
    }
}
