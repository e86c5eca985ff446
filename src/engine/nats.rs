//! NATS request/reply implementations of the engine traits
//!
//! The actual Whisper/Marian model processes live in separate services; this
//! module is the only place that knows how to reach them.

use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use base64::Engine as _;
use tracing::{debug, info};

use super::messages::{TranscribeReply, TranscribeRequest, TranslateReply, TranslateRequest};
use super::{TranscribeError, Transcriber, TranslateError, Translator, Transcription};
use crate::audio::TARGET_SAMPLE_RATE;

const TRANSCRIBE_SUBJECT: &str = "stt.transcribe";
const TRANSLATE_SUBJECT: &str = "mt.translate";

/// Languages the STT service is trusted to detect; anything else is
/// normalized to English rather than propagated downstream.
const VALID_DETECTED_LANGUAGES: &[&str] = &[
    "en", "ar", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh", "hi",
];

/// Connect to the NATS server carrying the STT/MT services.
pub async fn connect(url: &str, request_timeout: Duration) -> Result<Client> {
    info!("Connecting to NATS at {}", url);

    let client = async_nats::ConnectOptions::new()
        .request_timeout(Some(request_timeout))
        .connect(url)
        .await
        .context("Failed to connect to NATS")?;

    info!("Connected to NATS successfully");

    Ok(client)
}

/// Speech-to-text over NATS request/reply.
pub struct NatsTranscriber {
    client: Client,
}

impl NatsTranscriber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transcriber for NatsTranscriber {
    async fn transcribe(
        &self,
        samples: &[f32],
        language_hint: Option<&str>,
    ) -> Result<Transcription, TranscribeError> {
        let pcm_bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let request = TranscribeRequest {
            pcm: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
            sample_rate: TARGET_SAMPLE_RATE,
            language_hint: language_hint.map(str::to_string),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload =
            serde_json::to_vec(&request).map_err(|e| TranscribeError::Engine(e.to_string()))?;

        let reply = self
            .client
            .request(TRANSCRIBE_SUBJECT, payload.into())
            .await
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;

        let reply: TranscribeReply = serde_json::from_slice(&reply.payload)
            .map_err(|e| TranscribeError::Engine(format!("bad STT reply: {}", e)))?;

        if let Some(error) = reply.error {
            return Err(TranscribeError::Engine(error));
        }

        let language = normalize_detected_language(&reply.detected_language, &reply.text);
        debug!(
            "Transcribed {} samples: {} chars, language={}",
            samples.len(),
            reply.text.len(),
            language
        );

        Ok(Transcription {
            text: reply.text,
            language,
        })
    }
}

/// Machine translation over NATS request/reply.
pub struct NatsTranslator {
    client: Client,
}

impl NatsTranslator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for NatsTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let request = TranslateRequest {
            text: text.to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload =
            serde_json::to_vec(&request).map_err(|e| TranslateError::Engine(e.to_string()))?;

        let reply = self
            .client
            .request(TRANSLATE_SUBJECT, payload.into())
            .await
            .map_err(|e| TranslateError::Engine(e.to_string()))?;

        let reply: TranslateReply = serde_json::from_slice(&reply.payload)
            .map_err(|e| TranslateError::Engine(format!("bad MT reply: {}", e)))?;

        match (reply.text, reply.error) {
            (_, Some(error)) if error == "unsupported_pair" => {
                Err(TranslateError::UnsupportedPair {
                    source_language: source.to_string(),
                    target_language: target.to_string(),
                })
            }
            (_, Some(error)) => Err(TranslateError::Engine(error)),
            (Some(translated), None) => Ok(translated),
            (None, None) => Err(TranslateError::Engine("empty MT reply".to_string())),
        }
    }
}

/// Silence comes back with no text and no trustworthy language; off-whitelist
/// detections are treated as misdetections of English.
fn normalize_detected_language(detected: &str, text: &str) -> String {
    if text.trim().is_empty() {
        return "unknown".to_string();
    }
    if VALID_DETECTED_LANGUAGES.contains(&detected) {
        detected.to_string()
    } else {
        "en".to_string()
    }
}
