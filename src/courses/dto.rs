use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CoursePayload {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}
