use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginForm, PublicUser, RegisterForm, UpdatePasswordForm,
            WelcomeResponse,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        repo::StoreError,
        repo_types::{Account, User},
        validation::{validate_email, validate_password, validate_username, FieldError},
    },
    state::AppState,
};

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "Email already registered. Please use a different email or login.";
const CREATE_FAILED: &str = "An error occurred while creating your account. Please try again.";
const PASSWORD_MISMATCH: &str = "Passwords do not match";
const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/update", post(update_password))
}

pub fn welcome_routes() -> Router<AppState> {
    Router::new().route("/welcome", get(welcome))
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    validate_username(&form.username).map_err(bad_request)?;
    validate_email(&form.email).map_err(bad_request)?;
    validate_password(&form.password).map_err(bad_request)?;
    if form.password != form.confirm_password {
        warn!("password confirmation mismatch");
        return Err((StatusCode::BAD_REQUEST, PASSWORD_MISMATCH.into()));
    }

    let user = match state
        .store
        .create_user(&form.username, &form.email, &form.password)
        .await
    {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %form.email, "email already registered");
            return Err((StatusCode::CONFLICT, EMAIL_TAKEN.into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, CREATE_FAILED.into()));
        }
    };

    let access_token = sign(&state, &user)?;
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            user: public_user(user),
        }),
    ))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let user = state
        .store
        .authenticate_user(&form.email, &form.password)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(email = %form.email, "user login rejected");
            (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string())
        })?;

    let access_token = sign(&state, &user)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        user: public_user(user),
    }))
}

#[instrument(skip(state, claims))]
pub async fn welcome(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<WelcomeResponse>, (StatusCode, String)> {
    let user = state
        .store
        .find_by_email::<User>(&claims.email)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(user_id = claims.sub, "token for a missing user");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(WelcomeResponse {
        username: user.username,
        email: user.email,
        points: user.points,
    }))
}

#[instrument(skip(state, form))]
pub async fn update_password(
    State(state): State<AppState>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = state
        .store
        .authenticate_user(&form.email, &form.old_password)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(email = %form.email, "password change rejected");
            (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string())
        })?;

    validate_password(&form.new_password).map_err(bad_request)?;
    if form.new_password != form.confirm_password {
        warn!("password confirmation mismatch");
        return Err((StatusCode::BAD_REQUEST, PASSWORD_MISMATCH.into()));
    }

    match state
        .store
        .update_user_password(user.email(), &form.new_password)
        .await
    {
        Ok(()) => {
            info!(user_id = user.id, "user changed password");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(StoreError::NotFound) => Err((StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.into())),
        Err(e) => Err(internal(e)),
    }
}

fn public_user(user: User) -> PublicUser {
    PublicUser {
        id: user.id,
        username: user.username,
        email: user.email,
    }
}

pub(crate) fn sign<A: Account>(state: &AppState, account: &A) -> Result<String, (StatusCode, String)> {
    JwtKeys::from_ref(state).sign(account).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, SOMETHING_WENT_WRONG.into())
    })
}

pub(crate) fn bad_request(e: FieldError) -> (StatusCode, String) {
    warn!(reason = %e, "form rejected");
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Log the real cause, answer with a generic message.
pub(crate) fn internal(e: StoreError) -> (StatusCode, String) {
    error!(error = %e, "store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, SOMETHING_WENT_WRONG.into())
}
