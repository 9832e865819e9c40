use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::AppError,
    policy::{authorize, Action},
    posts::{
        dto::{PostPayload, PostQuery, PostSummary},
        repo::{self, Post},
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route(
            "/posts/:id",
            axum::routing::put(update_post).delete(delete_post),
        )
}

fn validate(payload: &PostPayload) -> Result<(), AppError> {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(AppError::validation("title and content are required"));
    }
    if payload.title.len() > 200 {
        return Err(AppError::validation("title too long"));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    let posts = repo::list(&state.db, query.limit, query.offset).await?;
    Ok(Json(posts.into_iter().map(PostSummary::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, AppError> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Post>, AppError> {
    authorize(user.actor(), Action::CreatePost, None)?;
    validate(&payload)?;

    let post = repo::create(&state.db, user.id, payload.title.trim(), &payload.content).await?;

    info!(post_id = %post.id, user_id = %user.id, "post published");
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Post>, AppError> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    authorize(user.actor(), Action::EditPost, Some(post.user_id))?;
    validate(&payload)?;

    let post = repo::update(&state.db, id, payload.title.trim(), &payload.content).await?;

    info!(post_id = %post.id, user_id = %user.id, "post updated");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    authorize(user.actor(), Action::DeletePost, Some(post.user_id))?;

    repo::delete(&state.db, id).await?;

    info!(post_id = %id, user_id = %user.id, "post deleted");
    Ok(Json(json!({ "status": "deleted" })))
}
