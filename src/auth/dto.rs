use serde::{Deserialize, Serialize};

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Login form, shared by the user and admin sites.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Change-password form.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordForm {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Welcome page data.
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub username: String,
    pub email: String,
    pub points: f64,
}
