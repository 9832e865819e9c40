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
    courses::{
        dto::{CoursePayload, CourseQuery},
        repo::{self, Course},
    },
    error::AppError,
    policy::{authorize, Action},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:id", get(get_course))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(create_course))
        .route(
            "/courses/:id",
            axum::routing::put(update_course).delete(delete_course),
        )
}

fn validate(payload: &CoursePayload) -> Result<(), AppError> {
    if payload.title.trim().is_empty() || payload.link.trim().is_empty() {
        return Err(AppError::validation("title and link are required"));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repo::list(&state.db, query.limit, query.offset).await?;
    Ok(Json(courses))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("course"))?;
    Ok(Json(course))
}

#[instrument(skip(state, payload))]
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CoursePayload>,
) -> Result<Json<Course>, AppError> {
    authorize(user.actor(), Action::CreateCourse, None)?;
    validate(&payload)?;

    let course = repo::create(
        &state.db,
        user.id,
        payload.title.trim(),
        payload.description.as_deref(),
        payload.link.trim(),
    )
    .await?;

    info!(course_id = %course.id, user_id = %user.id, "course listed");
    Ok(Json(course))
}

#[instrument(skip(state, payload))]
pub async fn update_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CoursePayload>,
) -> Result<Json<Course>, AppError> {
    let course = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("course"))?;
    authorize(user.actor(), Action::EditCourse, Some(course.teacher_id))?;
    validate(&payload)?;

    let course = repo::update(
        &state.db,
        id,
        payload.title.trim(),
        payload.description.as_deref(),
        payload.link.trim(),
    )
    .await?;

    info!(course_id = %course.id, user_id = %user.id, "course updated");
    Ok(Json(course))
}

#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("course"))?;
    authorize(user.actor(), Action::DeleteCourse, Some(course.teacher_id))?;

    repo::delete(&state.db, id).await?;

    info!(course_id = %id, user_id = %user.id, "course deleted");
    Ok(Json(json!({ "status": "deleted" })))
}
