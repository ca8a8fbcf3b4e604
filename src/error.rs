use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// `Clone` so that one in-flight resolution outcome can be handed to every
/// caller waiting on it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Error parsing {0}")]
    Parse(String),

    #[error("Could not resolve watchlist id: {0}")]
    Resolve(#[source] Box<AppError>),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Invalid request: {0}")]
    Validation(String),
}

impl AppError {
    /// Wraps an error raised while turning a username into a list id
    pub fn resolve(inner: AppError) -> Self {
        match inner {
            AppError::Resolve(_) => inner,
            other => AppError::Resolve(Box::new(other)),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the server log; clients only get the generic body.
        tracing::error!(error = %self, "Handler error");

        let body = Json(json!({
            "err": "handler error"
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = AppError::Parse("page #1".to_string());
        assert_eq!(err.to_string(), "Error parsing page #1");
    }

    #[test]
    fn test_resolve_wraps_once() {
        let err = AppError::resolve(AppError::Parse("page #2".to_string()));
        let rewrapped = AppError::resolve(err.clone());
        assert_eq!(err, rewrapped);
        assert_eq!(
            err.to_string(),
            "Could not resolve watchlist id: Error parsing page #2"
        );
    }

    #[tokio::test]
    async fn test_into_response_is_uniform() {
        let response = AppError::Validation("unknown type".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "err": "handler error" }));
    }
}
