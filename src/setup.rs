//! One-time first-admin bootstrap. The route is open while no admin exists
//! and permanently closed once one does; the atomicity of that transition
//! lives in `User::create_first_admin`, not here.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{PublicUser, RegisterResponse},
        password::hash_password,
        repo::User,
        services::is_valid_email,
    },
    error::{AppError, LOGIN_PATH},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/setup/create-first-admin", post(create_first_admin))
}

#[derive(Debug, Deserialize)]
pub struct FirstAdminRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[instrument(skip(state, payload))]
pub async fn create_first_admin(
    State(state): State<AppState>,
    Json(mut payload): Json<FirstAdminRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() || payload.username.len() > 80 {
        return Err(AppError::validation("username must be 1-80 characters"));
    }
    if !is_valid_email(&payload.email) {
        return Err(AppError::validation("invalid email"));
    }
    if payload.password.len() < 8 {
        return Err(AppError::validation("password too short"));
    }

    let hash = hash_password(&payload.password)?;
    let admin =
        User::create_first_admin(&state.db, &payload.username, &payload.email, &hash).await?;

    info!(user_id = %admin.id, username = %admin.username, "first admin created");
    Ok(Json(RegisterResponse {
        user: PublicUser::from(&admin),
        redirect_to: LOGIN_PATH.to_string(),
    }))
}

/// Non-interactive bootstrap channel: same contract as the route, fed from
/// ADMIN_USERNAME / ADMIN_EMAIL / ADMIN_PASSWORD at startup.
pub async fn bootstrap_admin_from_env(state: &AppState) -> Result<(), AppError> {
    let Some(bootstrap) = state.config.bootstrap_admin.clone() else {
        return Ok(());
    };

    if User::admin_exists(&state.db).await? {
        info!("admin account already exists, skipping environment bootstrap");
        return Ok(());
    }

    let hash = hash_password(&bootstrap.password)?;
    match User::create_first_admin(&state.db, &bootstrap.username, &bootstrap.email, &hash).await {
        Ok(admin) => {
            info!(user_id = %admin.id, username = %admin.username, "first admin created from environment");
            Ok(())
        }
        // Lost the race to a concurrent bootstrap; the system has its admin.
        Err(AppError::AdminAlreadyExists) => Ok(()),
        Err(e) => Err(e),
    }
}
