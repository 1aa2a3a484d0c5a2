/// Error types for Posts Service
///
/// Handlers resolve every error per request. Not-found lookups become 404
/// documents, anonymous access to protected routes becomes a redirect to the
/// login page, and store failures become 500s.
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for posts-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Anonymous request to a route that needs an identity.
    /// Carries the full redirect target, query string included.
    #[error("Login required")]
    LoginRequired { location: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build the login redirect for a request to `next` (path plus query).
    pub fn login_required(login_url: &str, next: &str) -> Self {
        let next = urlencoding::encode(next).replace("%2F", "/");
        let separator = if login_url.contains('?') { '&' } else { '?' };
        AppError::LoginRequired {
            location: format!("{}{}next={}", login_url, separator, next),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::LoginRequired { location } = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, location.as_str()))
                .finish();
        }

        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_keeps_slashes_in_next() {
        let err = AppError::login_required("/auth/login/", "/new/");
        match &err {
            AppError::LoginRequired { location } => {
                assert_eq!(location, "/auth/login/?next=/new/");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_code(), StatusCode::FOUND);
    }

    #[test]
    fn login_redirect_escapes_query_characters() {
        let err = AppError::login_required("/auth/login/", "/follow/?page=2");
        match err {
            AppError::LoginRequired { location } => {
                assert_eq!(location, "/auth/login/?next=/follow/%3Fpage%3D2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("group".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_response().status(), StatusCode::NOT_FOUND);
    }
}
