use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::modules::ask::schema::MessageResponse;
use crate::modules::session::crud::SessionStoreError;
use crate::services::llm::LlmError;
use crate::services::paraphrase::ParaphraseError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Chat model request failed: {0}")]
    ChatModel(#[from] LlmError),
    #[error("Paraphraser request failed: {0}")]
    Paraphraser(#[from] ParaphraseError),
    #[error("Session store failed: {0}")]
    SessionStore(#[from] SessionStoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ChatModel(_) | AppError::Paraphraser(_) => StatusCode::BAD_GATEWAY,
            AppError::SessionStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(format!("Invalid request body: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "rejected request");
        }

        (status, Json(MessageResponse { message: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let chat = AppError::from(LlmError::ApiError("model not found".into()));
        let para = AppError::from(ParaphraseError::InvalidResponse("No candidates in response".into()));

        assert_eq!(chat.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(para.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(chat.to_string(), "Chat model request failed: API error: model not found");
    }

    #[test]
    fn invalid_request_is_client_error() {
        let err = AppError::InvalidRequest("missing field `question`".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failure_is_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(SessionStoreError::from(json_err));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
