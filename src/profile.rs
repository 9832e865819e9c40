//! Public profile pages: a user's identity plus everything they own.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::{dto::UserProfile, repo::User},
    courses::repo::Course,
    error::AppError,
    gigs::repo::Gig,
    posts::repo::Post,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/:username", get(view_profile))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
    pub gigs: Vec<Gig>,
    pub posts: Vec<Post>,
    pub courses: Vec<Course>,
}

#[instrument(skip(state))]
pub async fn view_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let gigs = crate::gigs::repo::list_by_user(&state.db, user.id).await?;
    let posts = crate::posts::repo::list_by_user(&state.db, user.id).await?;
    let courses = crate::courses::repo::list_by_teacher(&state.db, user.id).await?;

    Ok(Json(ProfileResponse {
        user: UserProfile::from(user),
        gigs,
        posts,
        courses,
    }))
}
