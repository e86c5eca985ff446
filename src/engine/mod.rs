//! Collaborator interfaces for the heavy model work
//!
//! The session engine never talks to models directly. It goes through these
//! traits so the transcription/translation services can live out of process
//! (NATS request/reply in production) and be substituted with fakes in tests.

pub mod messages;
pub mod nats;

use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::AudioDecoder;

/// Result of one transcription pass.
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Transcribed text; empty for silence.
    pub text: String,
    /// Detected (or hinted) language code, "unknown" if undeterminable.
    pub language: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("transcription failed: {0}")]
    Engine(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// No model exists for this language pair. Degradable: the caller keeps
    /// the untranslated text rather than failing the whole job.
    #[error("unsupported language pair: {source_language}-{target_language}")]
    UnsupportedPair {
        source_language: String,
        target_language: String,
    },

    #[error("translation failed: {0}")]
    Engine(String),
}

/// Speech-to-text engine: decoded samples in, text plus detected language out.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        samples: &[f32],
        language_hint: Option<&str>,
    ) -> Result<Transcription, TranscribeError>;
}

/// Text-to-text translation engine for a language pair.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError>;
}

/// Read-only bundle of the collaborators one dispatcher job needs. Loaded
/// once at startup and shared across all sessions; per-request state is
/// passed explicitly through the trait methods.
#[derive(Clone)]
pub struct Engines {
    pub decoder: Arc<dyn AudioDecoder>,
    pub transcriber: Arc<dyn Transcriber>,
    pub translator: Arc<dyn Translator>,
}

impl Engines {
    pub fn new(
        decoder: Arc<dyn AudioDecoder>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            decoder,
            transcriber,
            translator,
        }
    }
}
