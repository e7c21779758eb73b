use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::LoginForm,
        extractors::AuthAdmin,
        handlers::{internal, sign, INVALID_CREDENTIALS},
        repo_types::UserSummary,
    },
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AdminAuthResponse {
    pub access_token: String,
    pub email: String,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/users", get(list_users))
}

#[instrument(skip(state, form))]
pub async fn admin_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AdminAuthResponse>, (StatusCode, String)> {
    let admin = state
        .store
        .authenticate_admin(&form.email, &form.password)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(email = %form.email, "admin login rejected");
            (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string())
        })?;

    let access_token = sign(&state, &admin)?;
    info!(admin_id = admin.id, "admin logged in");
    Ok(Json(AdminAuthResponse {
        access_token,
        email: admin.email,
    }))
}

/// Read-only listing of every registered user.
#[instrument(skip(state, claims))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthAdmin(claims): AuthAdmin,
) -> Result<Json<Vec<UserSummary>>, (StatusCode, String)> {
    let users = state.store.list_users().await.map_err(internal)?;
    info!(admin_id = claims.sub, count = users.len(), "listed users");
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::auth::handlers::tests::{get_with_token, post_form, send, test_app};

    fn token_of(body: &[u8]) -> String {
        let json: serde_json::Value = serde_json::from_slice(body).expect("json body");
        json["access_token"].as_str().expect("token").to_owned()
    }

    async fn seeded_app() -> axum::Router {
        let state = crate::state::AppState::fake().await;
        state
            .store
            .create_admin("root", "root@site.com", "rootpass")
            .await
            .unwrap();
        crate::app::build_app(state)
    }

    #[tokio::test]
    async fn admin_lists_users_in_order() {
        let app = seeded_app().await;
        for (name, email) in [("zed", "zed%40x.com"), ("amy", "amy%40x.com")] {
            let body = format!(
                "username={name}&email={email}&password=secret1&confirm_password=secret1"
            );
            let (status, _) = send(&app, post_form("/register", &body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(
            &app,
            post_form("/admin/login", "email=root%40site.com&password=rootpass"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = token_of(&body);

        let (status, body) = send(&app, get_with_token("/admin/users", &token)).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let rows = json.as_array().expect("array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["username"], "zed");
        assert_eq!(rows[1]["email"], "amy@x.com");
        assert_eq!(rows[1]["points"], 0.0);
        assert!(rows[0].get("hashed_password").is_none());
    }

    #[tokio::test]
    async fn admin_login_rejects_user_credentials() {
        let app = seeded_app().await;
        send(
            &app,
            post_form(
                "/register",
                "username=bob&email=bob%40x.com&password=secret1&confirm_password=secret1",
            ),
        )
        .await;

        let (status, _) = send(
            &app,
            post_form("/admin/login", "email=bob%40x.com&password=secret1"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_rejects_user_tokens() {
        let app = test_app().await;
        let (_, body) = send(
            &app,
            post_form(
                "/register",
                "username=bob&email=bob%40x.com&password=secret1&confirm_password=secret1",
            ),
        )
        .await;
        let user_token = token_of(&body);

        let (status, _) = send(&app, get_with_token("/admin/users", &user_token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
