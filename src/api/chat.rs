//! Chat endpoint: one utterance in, one reply out (and spoken aloud)

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Build the chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/response", post(respond))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user utterance; absent and empty are both rejected
    #[serde(default)]
    pub message: String,
}

/// Chat reply body
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

/// Produce a reply for a user utterance
///
/// The reply is returned immediately; speaking it happens on the speak
/// queue and never delays or fails the response.
async fn respond(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ChatError> {
    if request.message.is_empty() {
        return Err(ChatError::NoMessage);
    }

    let reply = state
        .responder
        .respond(&request.message)
        .await
        .map_err(|e| ChatError::BadBackendShape(e.to_string()))?;

    if let Some(speaker) = &state.speaker {
        speaker.enqueue(&reply);
    }

    Ok(Json(ChatReply { response: reply }))
}

/// Chat API errors
#[derive(Debug)]
enum ChatError {
    NoMessage,
    BadBackendShape(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match self {
            Self::NoMessage => (StatusCode::BAD_REQUEST, "No message provided".to_string()),
            Self::BadBackendShape(message) => (StatusCode::BAD_GATEWAY, message),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
