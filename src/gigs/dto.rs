use serde::{Deserialize, Serialize};

use crate::gigs::repo::Gig;

/// Body for creating or replacing a gig; the edit form sets every field.
#[derive(Debug, Deserialize)]
pub struct GigPayload {
    pub major: String,
    pub subject: String,
    pub available_hours: String,
}

/// Search/filter params for the gig board.
#[derive(Debug, Deserialize)]
pub struct GigQuery {
    pub search: Option<String>,
    pub major: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Gig listing plus the distinct majors that feed the filter dropdown.
#[derive(Debug, Serialize)]
pub struct GigList {
    pub gigs: Vec<Gig>,
    pub majors: Vec<String>,
}
