//! API endpoint integration tests

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use lisa_gateway::api::ApiState;
use lisa_gateway::chat::ChatBackend;
use lisa_gateway::responder::{Responder, BACKEND_APOLOGY, NAME_REPLY};
use lisa_gateway::voice::{SpeakQueue, SpeechEngine, Transcriber};
use lisa_gateway::{Error, Result};

/// Backend that echoes the utterance back
struct EchoBackend;

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn complete(&self, utterance: &str) -> Result<String> {
        Ok(format!("echo: {utterance}"))
    }
}

/// Backend that fails every call
struct FailingBackend;

#[async_trait]
impl ChatBackend for FailingBackend {
    async fn complete(&self, _utterance: &str) -> Result<String> {
        Err(Error::Chat("connection refused".to_string()))
    }
}

/// Backend that replies with an unrecognized shape
struct WeirdShapeBackend;

#[async_trait]
impl ChatBackend for WeirdShapeBackend {
    async fn complete(&self, _utterance: &str) -> Result<String> {
        Err(Error::UnexpectedShape(r#"{"choices":[]}"#.to_string()))
    }
}

/// Recognizer that records the scratch path it was handed
struct MockRecognizer {
    transcript: std::result::Result<String, String>,
    seen_path: Arc<Mutex<Option<PathBuf>>>,
}

impl MockRecognizer {
    fn returning(
        transcript: std::result::Result<String, String>,
    ) -> (Arc<Self>, Arc<Mutex<Option<PathBuf>>>) {
        let seen_path = Arc::new(Mutex::new(None));
        let recognizer = Arc::new(Self {
            transcript,
            seen_path: seen_path.clone(),
        });
        (recognizer, seen_path)
    }
}

#[async_trait]
impl Transcriber for MockRecognizer {
    async fn transcribe_file(&self, path: &Path) -> Result<String> {
        assert!(path.exists(), "scratch file must exist during recognition");
        *self.seen_path.lock().unwrap() = Some(path.to_path_buf());
        match &self.transcript {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(Error::Stt(message.clone())),
        }
    }
}

/// Engine that records utterances and flags overlapping calls
struct RecordingEngine {
    spoken: Arc<Mutex<Vec<String>>>,
    in_call: Arc<AtomicBool>,
    overlapped: Arc<AtomicBool>,
}

#[async_trait]
impl SpeechEngine for RecordingEngine {
    async fn speak(&mut self, text: &str) -> Result<()> {
        if self.in_call.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.spoken.lock().unwrap().push(text.to_string());
        self.in_call.store(false, Ordering::SeqCst);
        Ok(())
    }
}

fn build_router(
    backend: Arc<dyn ChatBackend>,
    stt: Arc<dyn Transcriber>,
    speaker: Option<SpeakQueue>,
) -> axum::Router {
    let state = Arc::new(ApiState {
        responder: Responder::new(backend),
        speaker,
        stt,
    });
    lisa_gateway::api::router(state)
}

fn default_router(backend: Arc<dyn ChatBackend>) -> axum::Router {
    let (recognizer, _) = MockRecognizer::returning(Ok("unused".to_string()));
    build_router(backend, recognizer, None)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/response")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(field_name: &str, data: &[u8]) -> Request<Body> {
    let boundary = "lisa-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"clip.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/speech-to-text")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = default_router(Arc::new(EchoBackend));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn chat_rejects_missing_message() {
    let app = default_router(Arc::new(EchoBackend));

    let response = app.oneshot(chat_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No message provided");
}

#[tokio::test]
async fn chat_rejects_empty_message() {
    let app = default_router(Arc::new(EchoBackend));

    let response = app
        .oneshot(chat_request(r#"{"message": ""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No message provided");
}

#[tokio::test]
async fn chat_answers_name_question() {
    let app = default_router(Arc::new(EchoBackend));

    let response = app
        .oneshot(chat_request(r#"{"message": "What is your name?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["response"], NAME_REPLY);
}

#[tokio::test]
async fn chat_degrades_to_apology_when_backend_is_down() {
    let app = default_router(Arc::new(FailingBackend));

    let response = app
        .oneshot(chat_request(r#"{"message": "what's new?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["response"], BACKEND_APOLOGY);
}

#[tokio::test]
async fn chat_surfaces_unrecognized_backend_shape_as_bad_gateway() {
    let app = default_router(Arc::new(WeirdShapeBackend));

    let response = app
        .oneshot(chat_request(r#"{"message": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("unexpected chat response shape"));
}

#[tokio::test]
async fn transcription_rejects_missing_audio_field() {
    let (recognizer, _) = MockRecognizer::returning(Ok("should not run".to_string()));
    let app = build_router(Arc::new(EchoBackend), recognizer, None);

    let response = app
        .oneshot(multipart_request("document", b"not audio"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No audio file provided");
}

#[tokio::test]
async fn transcription_maps_blank_transcript_to_unintelligible() {
    let (recognizer, seen_path) = MockRecognizer::returning(Ok(String::new()));
    let app = build_router(Arc::new(EchoBackend), recognizer, None);

    let response = app
        .oneshot(multipart_request("audio", b"RIFF....WAVE"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Could not understand audio");

    // the scratch file must be gone on the failure path too
    let path = seen_path.lock().unwrap().clone().expect("recognizer ran");
    assert!(!path.exists(), "scratch file left behind at {path:?}");
}

#[tokio::test]
async fn transcription_maps_recognizer_failure_to_server_error() {
    let (recognizer, seen_path) =
        MockRecognizer::returning(Err("recognizer offline".to_string()));
    let app = build_router(Arc::new(EchoBackend), recognizer, None);

    let response = app
        .oneshot(multipart_request("audio", b"RIFF....WAVE"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("recognizer offline"));

    let path = seen_path.lock().unwrap().clone().expect("recognizer ran");
    assert!(!path.exists(), "scratch file left behind at {path:?}");
}

#[tokio::test]
async fn transcription_returns_transcript() {
    let (recognizer, seen_path) = MockRecognizer::returning(Ok("turn on the lights".to_string()));
    let app = build_router(Arc::new(EchoBackend), recognizer, None);

    let response = app
        .oneshot(multipart_request("audio", b"RIFF....WAVE"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["text"], "turn on the lights");

    let path = seen_path.lock().unwrap().clone().expect("recognizer ran");
    assert!(!path.exists(), "scratch file left behind at {path:?}");
}

#[tokio::test]
async fn concurrent_chats_get_independent_replies_spoken_exactly_once() {
    let spoken = Arc::new(Mutex::new(Vec::new()));
    let overlapped = Arc::new(AtomicBool::new(false));
    let queue = SpeakQueue::spawn(
        RecordingEngine {
            spoken: spoken.clone(),
            in_call: Arc::new(AtomicBool::new(false)),
            overlapped: overlapped.clone(),
        },
        128,
    );

    let (recognizer, _) = MockRecognizer::returning(Ok("unused".to_string()));
    let app = build_router(Arc::new(EchoBackend), recognizer, Some(queue));

    let mut handles = Vec::new();
    for i in 0..50 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"message": "ping {i}"}}"#);
            let response = app.oneshot(chat_request(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = json_body(response).await;
            assert_eq!(json["response"], format!("echo: ping {i}"));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // every reply is eventually spoken exactly once, never interleaved
    for _ in 0..500 {
        if spoken.lock().unwrap().len() >= 50 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let spoken = spoken.lock().unwrap();
    assert_eq!(spoken.len(), 50);
    let unique: HashSet<&String> = spoken.iter().collect();
    assert_eq!(unique.len(), 50);
    for i in 0..50 {
        assert!(unique.contains(&format!("echo: ping {i}")));
    }
    assert!(!overlapped.load(Ordering::SeqCst));
}
