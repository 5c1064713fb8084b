use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::engine::EngineError;
use crate::model::format_hhmm;

/// Handler failure. Rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    /// Malformed request: unparseable body, date or time.
    BadRequest(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            ApiError::Engine(e) => match &e {
                EngineError::ConflictWithReservation { span, user } => (
                    StatusCode::CONFLICT,
                    json!({
                        "error": "conflict_with_reservation",
                        "reservation_block": {
                            "start": format_hhmm(span.start),
                            "end": format_hhmm(span.end),
                            "user": user,
                        },
                    }),
                ),
                EngineError::ConflictWithClass { span, label } => (
                    StatusCode::CONFLICT,
                    json!({
                        "error": "conflict_with_class",
                        "class_block": {
                            "start": format_hhmm(span.start),
                            "end": format_hhmm(span.end),
                            "label": label,
                        },
                    }),
                ),
                EngineError::NotFound(_) => (StatusCode::NOT_FOUND, json!(e.to_string())),
                EngineError::InvalidInput(_) | EngineError::InvalidRange { .. } => {
                    (StatusCode::BAD_REQUEST, json!(e.to_string()))
                }
                EngineError::LimitExceeded(_) => (StatusCode::UNPROCESSABLE_ENTITY, json!(e.to_string())),
                EngineError::Storage(_) => {
                    tracing::error!("request failed: {e}");
                    (StatusCode::INTERNAL_SERVER_ERROR, json!("internal storage error"))
                }
            },
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
