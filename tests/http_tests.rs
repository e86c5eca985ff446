// Router-level tests for the non-WebSocket endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use voxbridge::audio::{AudioDecoder, DecodeError};
use voxbridge::engine::{
    Engines, TranscribeError, Transcriber, Transcription, TranslateError, Translator,
};
use voxbridge::{create_router, AppState, Dispatcher, StreamSettings};

struct NullDecoder;

impl AudioDecoder for NullDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
        Ok(Vec::new())
    }
}

struct NullTranscriber;

#[async_trait]
impl Transcriber for NullTranscriber {
    async fn transcribe(
        &self,
        _samples: &[f32],
        _hint: Option<&str>,
    ) -> Result<Transcription, TranscribeError> {
        Ok(Transcription {
            text: String::new(),
            language: "unknown".to_string(),
        })
    }
}

struct NullTranslator;

#[async_trait]
impl Translator for NullTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

fn test_state() -> AppState {
    let engines = Engines::new(
        Arc::new(NullDecoder),
        Arc::new(NullTranscriber),
        Arc::new(NullTranslator),
    );
    AppState::new(
        Arc::new(Dispatcher::new(engines, 2, 8000)),
        StreamSettings::default(),
    )
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = create_router(test_state());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn languages_lists_configured_targets() {
    let app = create_router(test_state());

    let response = app
        .oneshot(Request::get("/languages").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["supported_languages"]["en"], "English");
    assert_eq!(json["supported_languages"]["ar"], "Arabic");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = create_router(test_state());

    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
