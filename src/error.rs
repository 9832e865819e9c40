use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::policy::Deny;

/// Path the client should send users to when a request needs a login first.
pub const LOGIN_PATH: &str = "/auth/login";

/// User-facing failure taxonomy. Every variant here is recoverable and maps
/// to a stable HTTP status; only `Internal` reaches the 500 path.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("username already taken")]
    DuplicateUsername,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("current password is incorrect")]
    WrongCurrentPassword,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("admin account already exists")]
    AdminAlreadyExists,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DuplicateUsername
            | AppError::DuplicateEmail
            | AppError::AdminAlreadyExists => StatusCode::CONFLICT,
            AppError::WrongCurrentPassword | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Deny> for AppError {
    fn from(deny: Deny) -> Self {
        match deny {
            Deny::Unauthenticated => AppError::Unauthenticated,
            Deny::Forbidden => AppError::Forbidden,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record"),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            // 401s tell the client where to log in, preserving the original
            // destination is the client's job via the login `next` param.
            AppError::Unauthenticated => json!({
                "error": self.to_string(),
                "login": LOGIN_PATH,
            }),
            AppError::Internal(err) => {
                error!(error = %err, "internal error");
                json!({ "error": "internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::DuplicateUsername.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AdminAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::WrongCurrentPassword.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("gig").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn deny_converts_to_matching_variant() {
        assert!(matches!(
            AppError::from(Deny::Unauthenticated),
            AppError::Unauthenticated
        ));
        assert!(matches!(AppError::from(Deny::Forbidden), AppError::Forbidden));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
