use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Fallback message for failures whose details must not reach the caller.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// One message per violated field, already in the order the caller
    /// wants them reported.
    #[error("Validation error: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    /// A failure that carries its own HTTP status, e.g. a body the JSON
    /// parser rejected.
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingRequiredField(_)
            | AppError::ValidationError(_)
            | AppError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Status { status, .. } => *status,
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Reported as 400 regardless of the rejection kind, with the parser's message
        AppError::Status {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

/// Envelope shared by every failed response: `{ success: false, message, errors? }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }
}

/// Flattens field errors into one message per violation. Fields named in
/// `field_order` come first, in that order; any others follow by name.
pub fn validation_messages(
    errors: &validator::ValidationErrors,
    field_order: &[&str],
) -> Vec<String> {
    let rank = |field: &str| {
        field_order
            .iter()
            .position(|f| *f == field)
            .unwrap_or(field_order.len())
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| rank(&**a).cmp(&rank(&**b)).then_with(|| a.cmp(b)));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }

        let body = match self {
            AppError::MissingRequiredField(message) | AppError::InvalidIdentifier(message) => {
                ErrorBody::new(message)
            }
            AppError::ValidationError(messages) => ErrorBody {
                success: false,
                message: "Validation error".to_string(),
                errors: Some(messages),
            },
            AppError::NotFound(err) => ErrorBody::new(err.to_string()),
            AppError::Status { status, message } => {
                if message.is_empty() || status.is_server_error() {
                    ErrorBody::new(SERVER_ERROR_MESSAGE)
                } else {
                    ErrorBody::new(message)
                }
            }
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                ErrorBody::new(SERVER_ERROR_MESSAGE)
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::{ValidationError, ValidationErrors};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    }

    #[tokio::test]
    async fn invalid_identifier_maps_to_400() {
        let response = AppError::InvalidIdentifier("Invalid recipe ID".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid recipe ID");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn not_found_uses_error_message() {
        let response = AppError::NotFound(anyhow::anyhow!("Recipe not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Recipe not found");
    }

    fn field_error(code: &'static str, message: &'static str) -> ValidationError {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        error
    }

    #[test]
    fn validation_messages_follow_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add("servings", field_error("range", "Servings must be at least 1"));
        errors.add("cooking_time", field_error("range", "Cooking time must be at least 1 minute"));
        errors.add("title", field_error("length", "Title is required"));
        errors.add("extra", ValidationError::new("custom"));

        let messages = validation_messages(&errors, &["title", "cooking_time", "servings"]);
        assert_eq!(
            messages,
            vec![
                "Title is required",
                "Cooking time must be at least 1 minute",
                "Servings must be at least 1",
                "extra is invalid",
            ]
        );
    }

    #[tokio::test]
    async fn validation_error_lists_every_message() {
        let messages = vec![
            "Title is required".to_string(),
            "Servings must be at least 1".to_string(),
        ];

        let response = AppError::ValidationError(messages).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Validation error");
        assert_eq!(
            body["errors"],
            serde_json::json!(["Title is required", "Servings must be at least 1"])
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response =
            AppError::DatabaseError(anyhow::anyhow!("connection refused at 10.0.0.3")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn declared_status_is_kept() {
        let response = AppError::Status {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "Body too large".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["message"], "Body too large");
    }
}
