use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

/// Message-only response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Signed out")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 204 for deletions
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_flat() {
        let body = serde_json::to_value(MessageResponse::new("done")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "done" }));
    }

    #[test]
    fn no_content_has_no_body() {
        assert_eq!(NoContent.into_response().status(), StatusCode::NO_CONTENT);
    }
}
