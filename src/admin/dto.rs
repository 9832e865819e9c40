use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;
use crate::courses::repo::Course;
use crate::gigs::repo::Gig;
use crate::policy::Role;
use crate::posts::repo::Post;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_gigs: i64,
    pub total_posts: i64,
    pub total_courses: i64,
    pub recent_users: Vec<PublicUser>,
    pub recent_gigs: Vec<Gig>,
    pub recent_posts: Vec<Post>,
    pub recent_courses: Vec<Course>,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

/// Admin-created accounts may carry any role, including admin.
#[derive(Debug, Deserialize)]
pub struct AdminCreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub major: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentOverview {
    pub gigs: Vec<Gig>,
    pub posts: Vec<Post>,
    pub courses: Vec<Course>,
}
