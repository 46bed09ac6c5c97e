//! Speech-to-text endpoint

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use super::ApiState;

/// Largest accepted audio upload (whisper-style APIs cap at 25MB)
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the speech-to-text router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/speech-to-text", post(transcribe))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Transcription response body
#[derive(Debug, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
}

/// Transcribe an uploaded audio clip
///
/// The upload is staged in a scratch file for the recognizer; the scratch
/// file is unlinked when it drops, on every exit path.
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResult>, SttError> {
    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SttError::BadUpload(e.to_string()))?
    {
        if field.name() == Some("audio") {
            audio = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| SttError::BadUpload(e.to_string()))?,
            );
            break;
        }
    }
    let Some(audio) = audio else {
        return Err(SttError::NoAudio);
    };

    let scratch = tempfile::NamedTempFile::new().map_err(|e| SttError::Backend(e.to_string()))?;
    std::fs::write(scratch.path(), &audio).map_err(|e| SttError::Backend(e.to_string()))?;

    let transcript = state
        .stt
        .transcribe_file(scratch.path())
        .await
        .map_err(|e| SttError::Backend(e.to_string()))?;

    if transcript.trim().is_empty() {
        return Err(SttError::Unintelligible);
    }

    Ok(Json(TranscriptionResult { text: transcript }))
}

/// Speech-to-text API errors
#[derive(Debug)]
enum SttError {
    NoAudio,
    BadUpload(String),
    Unintelligible,
    Backend(String),
}

impl IntoResponse for SttError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match self {
            Self::NoAudio => (
                StatusCode::BAD_REQUEST,
                "No audio file provided".to_string(),
            ),
            Self::BadUpload(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unintelligible => (
                StatusCode::BAD_REQUEST,
                "Could not understand audio".to_string(),
            ),
            Self::Backend(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
