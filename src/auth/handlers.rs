use axum::{
    extract::{FromRef, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, PublicUser, RegisterRequest,
            RegisterResponse, UpdateProfileRequest, UserProfile,
        },
        password::{hash_password, verify_against_dummy, verify_password},
        repo::User,
        services::{is_valid_email, safe_next, AuthUser, JwtKeys, MaybeAuthUser},
    },
    error::{AppError, LOGIN_PATH},
    policy::{authorize, Action, Role},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/password", put(change_password))
}

fn validate_credentials(username: &str, email: &str, password: &str) -> Result<(), AppError> {
    if username.is_empty() || username.len() > 80 {
        return Err(AppError::validation("username must be 1-80 characters"));
    }
    if !is_valid_email(email) {
        return Err(AppError::validation("invalid email"));
    }
    if password.len() < 8 {
        return Err(AppError::validation("password too short"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    validate_credentials(&payload.username, &payload.email, &payload.password)?;

    if payload.role == Role::Admin {
        warn!(username = %payload.username, "attempted admin self-registration");
        return Err(AppError::validation(
            "admin accounts are created through setup",
        ));
    }

    let hash = hash_password(&payload.password)?;

    // Major only makes sense for students.
    let major = match payload.role {
        Role::Student => payload.major.as_deref(),
        _ => None,
    };

    let user = User::create(
        &state.db,
        &payload.username,
        &payload.email,
        &hash,
        payload.role,
        major,
    )
    .await?;

    info!(user_id = %user.id, username = %user.username, role = ?user.role, "user registered");
    Ok(Json(RegisterResponse {
        user: PublicUser::from(&user),
        redirect_to: LOGIN_PATH.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password are deliberately the same outcome so
    // callers cannot probe which accounts exist. The miss path still pays
    // the hash cost, keeping the two timings alike.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            verify_against_dummy(&payload.password);
            warn!("login failed");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login failed");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, payload.remember)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        token,
        redirect_to: safe_next(query.next.as_deref()),
        user: PublicUser::from(&user),
    }))
}

/// Sessions are stateless tokens; logout is the client discarding its copy.
/// The endpoint exists so the transition is observable and logged.
#[instrument(skip_all)]
pub async fn logout(MaybeAuthUser(user): MaybeAuthUser) -> Json<Value> {
    if let Some(user) = user {
        info!(user_id = %user.id, username = %user.username, "user logged out");
    }
    Json(json!({ "redirect_to": "/" }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(UserProfile::from(record)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    authorize(user.actor(), Action::EditProfile, None)?;

    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();
    if payload.username.is_empty() || payload.username.len() > 80 {
        return Err(AppError::validation("username must be 1-80 characters"));
    }
    if !is_valid_email(&payload.email) {
        return Err(AppError::validation("invalid email"));
    }

    let major = match user.role {
        Role::Student => payload.major.as_deref(),
        _ => None,
    };

    let updated = User::update_profile(
        &state.db,
        user.id,
        &payload.username,
        &payload.email,
        payload.bio.as_deref(),
        payload.avatar.as_deref(),
        major,
    )
    .await?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(UserProfile::from(updated)))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    authorize(user.actor(), Action::ChangePassword, None)?;

    if payload.new_password.len() < 8 {
        return Err(AppError::validation("password too short"));
    }

    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    if !verify_password(&payload.current_password, &record.password_hash)? {
        warn!(user_id = %user.id, "change password with wrong current password");
        return Err(AppError::WrongCurrentPassword);
    }

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(json!({ "status": "password changed" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn credential_validation_rules() {
        assert!(validate_credentials("alice", "alice@example.com", "longenough").is_ok());
        assert!(validate_credentials("", "alice@example.com", "longenough").is_err());
        assert!(validate_credentials("alice", "nope", "longenough").is_err());
        assert!(validate_credentials("alice", "alice@example.com", "short").is_err());
    }

    #[test]
    fn profile_update_accepts_avatar_reference() {
        let payload: UpdateProfileRequest = serde_json::from_str(
            r#"{
                "username": "alice",
                "email": "alice@example.com",
                "bio": "hi",
                "avatar": "uploads/abc123.png",
                "major": "Physics"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.avatar.as_deref(), Some("uploads/abc123.png"));
    }

    #[test]
    fn auth_response_serialization() {
        let response = AuthResponse {
            token: "tok".into(),
            redirect_to: "/".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                username: "alice".into(),
                email: "alice@example.com".into(),
                role: Role::Student,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("\"role\":\"student\""));
        assert!(json.contains("redirect_to"));
    }
}
