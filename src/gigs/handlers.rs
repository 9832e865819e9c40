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
    gigs::{
        dto::{GigList, GigPayload, GigQuery},
        repo::{self, Gig},
    },
    policy::{authorize, Action},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/gigs", get(list_gigs))
        .route("/gigs/:id", get(get_gig))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/gigs", post(create_gig))
        .route("/gigs/:id", axum::routing::put(update_gig).delete(delete_gig))
}

fn validate(payload: &GigPayload) -> Result<(), AppError> {
    if payload.major.trim().is_empty()
        || payload.subject.trim().is_empty()
        || payload.available_hours.trim().is_empty()
    {
        return Err(AppError::validation(
            "major, subject and available_hours are required",
        ));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_gigs(
    State(state): State<AppState>,
    Query(query): Query<GigQuery>,
) -> Result<Json<GigList>, AppError> {
    let gigs = repo::list(
        &state.db,
        query.search.as_deref().filter(|s| !s.is_empty()),
        query.major.as_deref().filter(|m| !m.is_empty()),
        query.limit,
        query.offset,
    )
    .await?;
    let majors = repo::distinct_majors(&state.db).await?;
    Ok(Json(GigList { gigs, majors }))
}

#[instrument(skip(state))]
pub async fn get_gig(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Gig>, AppError> {
    let gig = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("gig"))?;
    Ok(Json(gig))
}

#[instrument(skip(state, payload))]
pub async fn create_gig(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GigPayload>,
) -> Result<Json<Gig>, AppError> {
    authorize(user.actor(), Action::CreateGig, None)?;
    validate(&payload)?;

    let gig = repo::create(
        &state.db,
        user.id,
        payload.major.trim(),
        payload.subject.trim(),
        payload.available_hours.trim(),
    )
    .await?;

    info!(gig_id = %gig.id, user_id = %user.id, "gig created");
    Ok(Json(gig))
}

#[instrument(skip(state, payload))]
pub async fn update_gig(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<GigPayload>,
) -> Result<Json<Gig>, AppError> {
    let gig = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("gig"))?;
    authorize(user.actor(), Action::EditGig, Some(gig.user_id))?;
    validate(&payload)?;

    let gig = repo::update(
        &state.db,
        id,
        payload.major.trim(),
        payload.subject.trim(),
        payload.available_hours.trim(),
    )
    .await?;

    info!(gig_id = %gig.id, user_id = %user.id, "gig updated");
    Ok(Json(gig))
}

#[instrument(skip(state))]
pub async fn delete_gig(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let gig = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("gig"))?;
    authorize(user.actor(), Action::DeleteGig, Some(gig.user_id))?;

    repo::delete(&state.db, id).await?;

    info!(gig_id = %id, user_id = %user.id, "gig deleted");
    Ok(Json(json!({ "status": "deleted" })))
}
