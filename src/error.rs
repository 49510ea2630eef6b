use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Wire shape shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                code: "VALIDATION_ERROR",
                details: None,
            },
        }
    }

    pub fn email_exists() -> Self {
        Self {
            status: StatusCode::CONFLICT,
            body: ErrorBody {
                error: "Email already registered".into(),
                code: "EMAIL_EXISTS",
                details: Some(json!({
                    "field": "email",
                    "message": "An account with this email already exists",
                })),
            },
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody {
                error: "Not authenticated".into(),
                code: "UNAUTHENTICATED",
                details: Some(json!({ "message": "No active session found" })),
            },
        }
    }

    pub fn session() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: "Failed to create session".into(),
                code: "INTERNAL_ERROR",
                details: None,
            },
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: "Internal server error".into(),
                code: "INTERNAL_ERROR",
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.body.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
