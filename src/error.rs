use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for switchboard
#[derive(Debug, thiserror::Error)]
pub enum SwitcherError {
    /// A textual identifier was empty after trimming or longer than the limit.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The value stored under the impersonation key is neither a string nor an integer.
    #[error("Unexpected type stored in session for key \"{key}\"")]
    CorruptSessionState { key: String },

    /// The switch parameter named an identity the directory does not know.
    #[error("Unknown identity: {0}")]
    UnknownIdentity(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body returned to HTTP clients.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl SwitcherError {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    pub fn corrupt_session_state(key: impl Into<String>) -> Self {
        Self::CorruptSessionState { key: key.into() }
    }

    pub fn unknown_identity(id: impl Into<String>) -> Self {
        Self::UnknownIdentity(id.into())
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::UnknownIdentity(_) => StatusCode::NOT_FOUND,
            Self::CorruptSessionState { .. }
            | Self::Session(_)
            | Self::Template(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a message that is safe to show to clients.
    ///
    /// Client errors (4xx) carry their message. Server errors (5xx) collapse
    /// to a generic message; the details only go to the server log.
    fn safe_message(&self) -> String {
        match self {
            Self::InvalidIdentifier(_) | Self::UnknownIdentity(_) => self.to_string(),
            Self::CorruptSessionState { .. } | Self::Session(_) => "Session error".to_string(),
            Self::Template(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for SwitcherError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            status = status.as_u16(),
            error_id = %error_id,
            error = %self,
            "Request failed"
        );

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for switchboard operations
pub type Result<T> = std::result::Result<T, SwitcherError>;

impl From<serde_json::Error> for SwitcherError {
    fn from(err: serde_json::Error) -> Self {
        SwitcherError::Session(format!("Session serialization error: {}", err))
    }
}

impl From<handlebars::TemplateError> for SwitcherError {
    fn from(err: handlebars::TemplateError) -> Self {
        SwitcherError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            SwitcherError::invalid_identifier("empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SwitcherError::unknown_identity("42").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SwitcherError::corrupt_session_state("key").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_corrupt_state_message_names_key() {
        let err = SwitcherError::corrupt_session_state("my_key");
        assert!(err.to_string().contains("\"my_key\""));
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = SwitcherError::internal("db password is hunter2");
        assert_eq!(err.safe_message(), "Internal server error");

        let err = SwitcherError::corrupt_session_state("secret_key");
        assert!(!err.safe_message().contains("secret_key"));
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = SwitcherError::invalid_identifier("User identifier cannot be empty.")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("cannot be empty"));
        assert!(json["error_id"].is_string());
    }
}
