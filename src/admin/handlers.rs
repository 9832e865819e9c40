use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::dto::{AdminCreateUserRequest, ContentOverview, DashboardStats, UserSearchQuery},
    auth::{
        dto::PublicUser,
        password::hash_password,
        repo::User,
        services::{is_valid_email, AuthUser},
    },
    error::AppError,
    policy::{authorize, Action, Role},
    state::AppState,
};

const RECENT_LIMIT: i64 = 5;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users", post(create_user))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/content", get(content))
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    authorize(user.actor(), Action::ViewAdminDashboard, None)?;

    let total_users = User::count(&state.db).await?;
    let total_gigs = crate::gigs::repo::count(&state.db).await?;
    let total_posts = crate::posts::repo::count(&state.db).await?;
    let total_courses = crate::courses::repo::count(&state.db).await?;

    let recent_users = User::recent(&state.db, RECENT_LIMIT)
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();
    let recent_gigs = crate::gigs::repo::recent(&state.db, RECENT_LIMIT).await?;
    let recent_posts = crate::posts::repo::recent(&state.db, RECENT_LIMIT).await?;
    let recent_courses = crate::courses::repo::recent(&state.db, RECENT_LIMIT).await?;

    Ok(Json(DashboardStats {
        total_users,
        total_gigs,
        total_posts,
        total_courses,
        recent_users,
        recent_gigs,
        recent_posts,
        recent_courses,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    authorize(user.actor(), Action::ManageUsers, None)?;

    let users = User::list(
        &state.db,
        query.search.as_deref().filter(|s| !s.is_empty()),
    )
    .await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut payload): Json<AdminCreateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    authorize(user.actor(), Action::ManageUsers, None)?;

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
    let major = match payload.role {
        Role::Student => payload.major.as_deref(),
        _ => None,
    };

    let created = User::create(
        &state.db,
        &payload.username,
        &payload.email,
        &hash,
        payload.role,
        major,
    )
    .await?;

    info!(admin_id = %user.id, user_id = %created.id, role = ?created.role, "user created by admin");
    Ok(Json(PublicUser::from(&created)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    authorize(user.actor(), Action::DeleteUser, None)?;

    if id == user.id {
        warn!(admin_id = %user.id, "admin attempted to delete own account");
        return Err(AppError::validation("you cannot delete your own account"));
    }

    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    // Owned gigs, posts and courses go with the row via FK cascade.
    User::delete(&state.db, id).await?;

    info!(admin_id = %user.id, user_id = %id, username = %target.username, "user deleted");
    Ok(Json(json!({ "status": "deleted" })))
}

#[instrument(skip(state))]
pub async fn content(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ContentOverview>, AppError> {
    authorize(user.actor(), Action::ViewAdminDashboard, None)?;

    let gigs = crate::gigs::repo::list(&state.db, None, None, 100, 0).await?;
    let posts = crate::posts::repo::list(&state.db, 100, 0).await?;
    let courses = crate::courses::repo::list(&state.db, 100, 0).await?;

    Ok(Json(ContentOverview {
        gigs,
        posts,
        courses,
    }))
}
