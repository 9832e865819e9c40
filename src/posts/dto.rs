use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::repo::Post;

#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// List shape: content is truncated to a preview, full text comes from the
/// single-post endpoint.
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub preview: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub const PREVIEW_LEN: usize = 200;

/// Truncate on a character boundary, appending an ellipsis when cut.
pub fn preview(content: &str, len: usize) -> String {
    if content.chars().count() <= len {
        return content.to_string();
    }
    let mut out: String = content.chars().take(len).collect();
    out.push_str("...");
    out
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            preview: preview(&post.content, PREVIEW_LEN),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_passes_through() {
        assert_eq!(preview("hello", 200), "hello");
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let long = "x".repeat(300);
        let p = preview(&long, 200);
        assert_eq!(p.chars().count(), 203);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(300);
        let p = preview(&long, 200);
        assert!(p.starts_with("é"));
        assert!(p.ends_with("..."));
    }
}
