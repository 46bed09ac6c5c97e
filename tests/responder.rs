//! Dialogue responder behavior tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use lisa_gateway::chat::ChatBackend;
use lisa_gateway::responder::{Responder, BACKEND_APOLOGY, DEVELOPER_REPLY, NAME_REPLY};
use lisa_gateway::{Error, Result};

/// Backend that counts calls and fails every one of them
struct FailingBackend {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatBackend for FailingBackend {
    async fn complete(&self, _utterance: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Chat("connection refused".to_string()))
    }
}

/// Backend that counts calls and echoes the utterance back
struct EchoBackend {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn complete(&self, utterance: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("echo: {utterance}"))
    }
}

/// Backend that always replies with an unrecognized shape
struct WeirdShapeBackend;

#[async_trait]
impl ChatBackend for WeirdShapeBackend {
    async fn complete(&self, _utterance: &str) -> Result<String> {
        Err(Error::UnexpectedShape(r#"{"choices":[]}"#.to_string()))
    }
}

fn counting_responder() -> (Responder, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let responder = Responder::new(Arc::new(FailingBackend {
        calls: calls.clone(),
    }));
    (responder, calls)
}

#[tokio::test]
async fn name_rule_matches_any_case_without_backend() {
    let (responder, calls) = counting_responder();

    for utterance in [
        "What is your name?",
        "WHAT IS YOUR NAME",
        "tell me YoUr NaMe please",
    ] {
        let reply = responder.respond(utterance).await.unwrap();
        assert_eq!(reply, NAME_REPLY);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn developer_rule_matches_any_case_without_backend() {
    let (responder, calls) = counting_responder();

    for utterance in ["Who developed you?", "WHO DEVELOPED YOU", "so, who Developed You"] {
        let reply = responder.respond(utterance).await.unwrap();
        assert_eq!(reply, DEVELOPER_REPLY);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn name_rule_wins_over_working_backend() {
    let calls = Arc::new(AtomicUsize::new(0));
    let responder = Responder::new(Arc::new(EchoBackend {
        calls: calls.clone(),
    }));

    let reply = responder.respond("your name, again?").await.unwrap();
    assert_eq!(reply, NAME_REPLY);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backend_failure_degrades_to_apology() {
    let (responder, calls) = counting_responder();

    let reply = responder.respond("what's the weather like?").await.unwrap();
    assert_eq!(reply, BACKEND_APOLOGY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backend_reply_passes_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let responder = Responder::new(Arc::new(EchoBackend {
        calls: calls.clone(),
    }));

    let reply = responder.respond("hello there").await.unwrap();
    assert_eq!(reply, "echo: hello there");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrecognized_shape_surfaces_typed_error() {
    let responder = Responder::new(Arc::new(WeirdShapeBackend));

    let result = responder.respond("hello").await;
    match result {
        Err(Error::UnexpectedShape(raw)) => assert!(raw.contains("choices")),
        other => panic!("expected UnexpectedShape, got {other:?}"),
    }
}
