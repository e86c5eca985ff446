//! Processing dispatcher
//!
//! Heavy decode/transcribe/translate work runs here, on a bounded pool of
//! tokio tasks shared across all sessions, so a session's control loop is
//! never blocked by model inference. Jobs queue FIFO on the semaphore when
//! the pool is saturated. Completion is reported over a per-session channel;
//! if the session is gone by then the result is silently dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::engine::{Engines, TranslateError};

/// Whether a job was triggered by the interim threshold or by a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Interim,
    Final,
}

/// One unit of processing work handed off the session's control path.
#[derive(Debug)]
pub struct ProcessingJob {
    pub session_id: String,
    pub kind: JobKind,
    /// Compressed audio bytes snapshotted from the session buffer.
    pub audio: Vec<u8>,
    pub source_language: Option<String>,
    pub target_language: String,
    /// Last interim result, used by final passes when the buffered audio
    /// yields nothing usable: (text, detected language).
    pub fallback: Option<(String, String)>,
}

/// Authoritative result of a final pass.
#[derive(Debug, Clone)]
pub struct FinalResult {
    pub original_text: String,
    pub translated_text: String,
    pub detected_language: String,
    pub target_language: String,
    /// True when translation was a no-op (same language, empty text, or an
    /// unsupported pair degraded to the original text).
    pub translation_skipped: bool,
}

#[derive(Debug)]
pub enum JobOutcome {
    /// Interim pass produced text.
    Recognized {
        text: String,
        detected_language: String,
    },
    /// Final pass result; always produced for a final job.
    Finalized(FinalResult),
    /// No usable audio was recoverable from the submitted bytes.
    NoAudio,
    /// Decoded audio is below the minimum duration; the buffered bytes are
    /// kept so the utterance can keep accumulating.
    TooShort { samples: usize },
    /// Collaborator failure on an interim pass. Non-fatal for the session.
    Failed { detail: String },
}

/// Outcome plus the bookkeeping the session needs to settle its buffer.
#[derive(Debug)]
pub struct CompletedJob {
    pub kind: JobKind,
    /// Byte count submitted to decode; the unit of buffer draining.
    pub submitted: usize,
    pub outcome: JobOutcome,
}

/// Shared, bounded executor for processing jobs.
pub struct Dispatcher {
    engines: Engines,
    permits: Arc<Semaphore>,
    min_samples: usize,
}

impl Dispatcher {
    pub fn new(engines: Engines, worker_limit: usize, min_samples: usize) -> Self {
        Self {
            engines,
            permits: Arc::new(Semaphore::new(worker_limit.max(1))),
            min_samples,
        }
    }

    /// Queue a job for execution. Returns immediately; the outcome arrives on
    /// `completion` once a worker slot frees up and the pipeline finishes.
    pub fn submit(&self, job: ProcessingJob, completion: mpsc::Sender<CompletedJob>) {
        let engines = self.engines.clone();
        let permits = Arc::clone(&self.permits);
        let min_samples = self.min_samples;

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                // Semaphore closed only on shutdown; drop the job.
                Err(_) => return,
            };

            let kind = job.kind;
            let submitted = job.audio.len();
            let outcome = run_job(&engines, min_samples, job).await;

            // A closed receiver means the session disconnected mid-job;
            // the result is simply discarded.
            let _ = completion
                .send(CompletedJob {
                    kind,
                    submitted,
                    outcome,
                })
                .await;
        });
    }
}

async fn run_job(engines: &Engines, min_samples: usize, job: ProcessingJob) -> JobOutcome {
    match job.kind {
        JobKind::Interim => run_interim(engines, min_samples, &job).await,
        JobKind::Final => JobOutcome::Finalized(run_final(engines, min_samples, job).await),
    }
}

async fn run_interim(engines: &Engines, min_samples: usize, job: &ProcessingJob) -> JobOutcome {
    let samples = match engines.decoder.decode(&job.audio) {
        Ok(samples) => samples,
        Err(e) => {
            return JobOutcome::Failed {
                detail: e.to_string(),
            }
        }
    };

    if samples.is_empty() {
        debug!(
            "Session {}: no audio recoverable from {} bytes",
            job.session_id,
            job.audio.len()
        );
        return JobOutcome::NoAudio;
    }

    if samples.len() < min_samples {
        debug!(
            "Session {}: {} samples below minimum {}, waiting for more audio",
            job.session_id,
            samples.len(),
            min_samples
        );
        return JobOutcome::TooShort {
            samples: samples.len(),
        };
    }

    match engines
        .transcriber
        .transcribe(&samples, job.source_language.as_deref())
        .await
    {
        Ok(transcription) => JobOutcome::Recognized {
            text: transcription.text,
            detected_language: transcription.language,
        },
        Err(e) => JobOutcome::Failed {
            detail: e.to_string(),
        },
    }
}

/// Final passes never fail: anything unusable degrades to the last interim
/// result, and translation trouble degrades to untranslated text, so a flush
/// always produces exactly one authoritative result.
async fn run_final(engines: &Engines, min_samples: usize, job: ProcessingJob) -> FinalResult {
    let mut text = String::new();
    let mut detected = "unknown".to_string();

    if !job.audio.is_empty() {
        match engines.decoder.decode(&job.audio) {
            Ok(samples) if samples.len() >= min_samples => {
                match engines
                    .transcriber
                    .transcribe(&samples, job.source_language.as_deref())
                    .await
                {
                    Ok(transcription) => {
                        text = transcription.text;
                        detected = transcription.language;
                    }
                    Err(e) => {
                        warn!(
                            "Session {}: transcription failed on final pass: {}",
                            job.session_id, e
                        );
                    }
                }
            }
            Ok(samples) => {
                debug!(
                    "Session {}: final audio too short ({} samples), using last partial",
                    job.session_id,
                    samples.len()
                );
            }
            Err(e) => {
                warn!(
                    "Session {}: decode failed on final pass: {}",
                    job.session_id, e
                );
            }
        }
    }

    if text.trim().is_empty() {
        if let Some((fallback_text, fallback_lang)) = job.fallback {
            text = fallback_text;
            detected = fallback_lang;
        }
    }

    let target = job.target_language;
    let (translated, skipped) = if text.trim().is_empty() || detected == target {
        (text.clone(), true)
    } else {
        match engines.translator.translate(&text, &detected, &target).await {
            Ok(translated) => (translated, false),
            Err(TranslateError::UnsupportedPair {
                source_language,
                target_language,
            }) => {
                warn!(
                    "Session {}: no translation model for {}-{}, returning original text",
                    job.session_id, source_language, target_language
                );
                (text.clone(), true)
            }
            Err(e) => {
                warn!(
                    "Session {}: translation failed, returning original text: {}",
                    job.session_id, e
                );
                (text.clone(), true)
            }
        }
    };

    FinalResult {
        original_text: text,
        translated_text: translated,
        detected_language: detected,
        target_language: target,
        translation_skipped: skipped,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::audio::{AudioDecoder, DecodeError};
    use crate::engine::{TranscribeError, Transcriber, Transcription, Translator};

    struct ByteDecoder;

    impl AudioDecoder for ByteDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
            Ok(vec![0.1; bytes.len()])
        }
    }

    struct FixedTranscriber;

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(
            &self,
            _samples: &[f32],
            _hint: Option<&str>,
        ) -> Result<Transcription, TranscribeError> {
            Ok(Transcription {
                text: "good morning".to_string(),
                language: "en".to_string(),
            })
        }
    }

    struct EnglishToArabicTranslator;

    #[async_trait]
    impl Translator for EnglishToArabicTranslator {
        async fn translate(
            &self,
            text: &str,
            source: &str,
            target: &str,
        ) -> Result<String, TranslateError> {
            if source == "en" && target == "ar" {
                Ok(format!("[ar] {}", text))
            } else {
                Err(TranslateError::UnsupportedPair {
                    source_language: source.to_string(),
                    target_language: target.to_string(),
                })
            }
        }
    }

    fn engines() -> Engines {
        Engines::new(
            Arc::new(ByteDecoder),
            Arc::new(FixedTranscriber),
            Arc::new(EnglishToArabicTranslator),
        )
    }

    fn final_job(target: &str) -> ProcessingJob {
        ProcessingJob {
            session_id: "session-test".to_string(),
            kind: JobKind::Final,
            audio: vec![0; 32],
            source_language: None,
            target_language: target.to_string(),
            fallback: None,
        }
    }

    #[tokio::test]
    async fn final_pass_across_languages_marks_translation_applied() {
        let result = run_final(&engines(), 8, final_job("ar")).await;

        assert_eq!(result.original_text, "good morning");
        assert_eq!(result.translated_text, "[ar] good morning");
        assert!(!result.translation_skipped);
    }

    #[tokio::test]
    async fn unsupported_pair_keeps_original_and_marks_skip() {
        let result = run_final(&engines(), 8, final_job("es")).await;

        assert_eq!(result.translated_text, result.original_text);
        assert!(result.translation_skipped);
    }

    #[tokio::test]
    async fn matching_detected_language_marks_skip() {
        let result = run_final(&engines(), 8, final_job("en")).await;

        assert_eq!(result.translated_text, "good morning");
        assert!(result.translation_skipped);
    }
}
