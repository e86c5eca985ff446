use std::sync::Arc;

use base64::Engine as _;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::{SessionConfig, StreamSettings};
use super::wire::{ClientMessage, ServerMessage};
use crate::audio::AudioBuffer;
use crate::dispatch::{CompletedJob, Dispatcher, JobKind, JobOutcome, ProcessingJob};

/// Per-connection streaming session.
///
/// Owns the audio buffer, the in-flight-processing flag and the accumulated
/// interim state, and is driven by a single task: the `run` loop alternates
/// between inbound client messages and dispatcher job completions, so no two
/// things ever mutate the session at once. Responses flow through one
/// outbound channel, which keeps them ordered per session even though the
/// processing itself happens on the shared worker pool.
pub struct Session {
    id: String,
    config: Option<SessionConfig>,
    buffer: AudioBuffer,
    /// True while a dispatcher job for this session is in flight. At most
    /// one job per session runs at any time.
    processing: bool,
    /// Byte count of the last attempt that came back too short. An interim
    /// pass is only resubmitted once the buffer has grown past it, otherwise
    /// the same undersized audio would be retried in a tight loop.
    short_attempt: Option<usize>,
    last_partial_text: Option<String>,
    last_detected_language: Option<String>,
    dispatcher: Arc<Dispatcher>,
    settings: StreamSettings,
    completion_tx: mpsc::Sender<CompletedJob>,
    completion_rx: mpsc::Receiver<CompletedJob>,
    outbound: mpsc::Sender<ServerMessage>,
}

/// What the transport feeds the driver. Frames that failed to parse travel
/// the same queue as parsed messages, so the resulting `error` response
/// cannot overtake responses for earlier input.
#[derive(Debug)]
pub enum SessionInput {
    Message(ClientMessage),
    /// A frame that could not be parsed; carries the report for the client.
    Malformed(String),
}

enum Flow {
    Continue,
    Stop,
}

impl Session {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        settings: StreamSettings,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel(1);

        Self {
            id: format!("session-{}", uuid::Uuid::new_v4()),
            config: None,
            buffer: AudioBuffer::new(),
            processing: false,
            short_attempt: None,
            last_partial_text: None,
            last_detected_language: None,
            dispatcher,
            settings,
            completion_tx,
            completion_rx,
            outbound,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drive the session until the client closes or the transport drops.
    /// Any job still in flight at that point completes against the dropped
    /// completion channel and is discarded.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<SessionInput>) {
        info!("Session {} started", self.id);

        loop {
            tokio::select! {
                input = inbound.recv() => match input {
                    Some(SessionInput::Message(msg)) => {
                        if let Flow::Stop = self.handle_message(msg).await {
                            break;
                        }
                    }
                    Some(SessionInput::Malformed(detail)) => {
                        debug!("Session {}: rejected frame: {}", self.id, detail);
                        self.send(ServerMessage::Error { detail }).await;
                    }
                    // Transport closed without an explicit close message.
                    None => break,
                },
                Some(done) = self.completion_rx.recv(), if self.processing => {
                    self.settle_job(done).await;
                }
            }
        }

        info!(
            "Session {} closed ({} buffered bytes discarded)",
            self.id,
            self.buffer.len()
        );
    }

    async fn handle_message(&mut self, msg: ClientMessage) -> Flow {
        match msg {
            ClientMessage::Config {
                source_language,
                target_language,
            } => {
                self.configure(source_language, target_language).await;
                Flow::Continue
            }
            ClientMessage::Chunk { encoding, data } => {
                self.append_chunk(&encoding, &data).await;
                Flow::Continue
            }
            ClientMessage::Flush => {
                self.flush().await;
                Flow::Continue
            }
            ClientMessage::Close => {
                debug!("Session {}: close requested", self.id);
                Flow::Stop
            }
        }
    }

    /// Set or replace the session configuration. An invalid target language
    /// is reported without touching whatever configuration was in force.
    async fn configure(&mut self, source_language: Option<String>, target_language: String) {
        let candidate = SessionConfig {
            source_language,
            target_language,
        };

        if let Err(detail) = candidate.validate(&self.settings.supported_targets) {
            warn!("Session {}: rejected config: {}", self.id, detail);
            self.send(ServerMessage::Error { detail }).await;
            return;
        }

        info!(
            "Session {}: configured {:?} -> {}",
            self.id, candidate.source_language, candidate.target_language
        );
        self.config = Some(candidate.clone());
        self.send(ServerMessage::ConfigAck { config: candidate }).await;
    }

    /// Decode a chunk's wire encoding, grow the buffer, and kick off an
    /// interim pass if enough audio has accumulated and none is in flight.
    async fn append_chunk(&mut self, encoding: &str, data: &str) {
        if self.config.is_none() {
            self.send(ServerMessage::Error {
                detail: "session not configured: send a config message first".to_string(),
            })
            .await;
            return;
        }

        if encoding != "base64" {
            self.send(ServerMessage::Error {
                detail: format!("unsupported chunk encoding '{}'", encoding),
            })
            .await;
            return;
        }

        let bytes = match base64::engine::general_purpose::STANDARD.decode(data) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.send(ServerMessage::Error {
                    detail: format!("malformed chunk data: {}", e),
                })
                .await;
                return;
            }
        };

        self.buffer.append(&bytes);
        debug!(
            "Session {}: +{} bytes, {} buffered",
            self.id,
            bytes.len(),
            self.buffer.len()
        );

        self.maybe_submit_interim();
    }

    /// Serialize behind any in-flight pass, then run one final pass over
    /// everything buffered. The buffer is always left empty afterwards and
    /// exactly one `final` response is emitted.
    async fn flush(&mut self) {
        let Some(config) = self.config.clone() else {
            self.send(ServerMessage::Error {
                detail: "session not configured: send a config message first".to_string(),
            })
            .await;
            return;
        };

        // Settling an interim pass can resubmit if the buffer crossed the
        // threshold again while it ran, so loop until quiescent.
        while self.processing {
            match self.completion_rx.recv().await {
                Some(done) => self.settle_job(done).await,
                None => return,
            }
        }

        let audio = self.buffer.drain_all();
        let fallback = self
            .last_partial_text
            .clone()
            .zip(self.last_detected_language.clone());

        debug!(
            "Session {}: flush over {} bytes (fallback: {})",
            self.id,
            audio.len(),
            fallback.is_some()
        );

        self.processing = true;
        self.dispatcher.submit(
            ProcessingJob {
                session_id: self.id.clone(),
                kind: JobKind::Final,
                audio,
                source_language: config.source_language.clone(),
                target_language: config.target_language.clone(),
                fallback,
            },
            self.completion_tx.clone(),
        );

        if let Some(done) = self.completion_rx.recv().await {
            self.settle_job(done).await;
        }
    }

    fn maybe_submit_interim(&mut self) {
        if self.processing || self.buffer.len() < self.settings.interim_threshold {
            return;
        }
        if let Some(tried) = self.short_attempt {
            if self.buffer.len() <= tried {
                return;
            }
        }
        let Some(config) = &self.config else {
            return;
        };

        self.processing = true;
        self.dispatcher.submit(
            ProcessingJob {
                session_id: self.id.clone(),
                kind: JobKind::Interim,
                audio: self.buffer.snapshot(),
                source_language: config.source_language.clone(),
                target_language: config.target_language.clone(),
                fallback: None,
            },
            self.completion_tx.clone(),
        );
    }

    /// Apply a completed job: emit the response it maps to, settle the
    /// buffer by the draining rules, and re-evaluate the threshold so
    /// continuous streaming keeps pace without client-driven triggers.
    async fn settle_job(&mut self, done: CompletedJob) {
        self.processing = false;

        match done.outcome {
            JobOutcome::Recognized {
                text,
                detected_language,
            } => {
                self.buffer.consume(done.submitted);
                self.short_attempt = None;
                if text.trim().is_empty() {
                    debug!("Session {}: interim pass heard only silence", self.id);
                } else {
                    self.last_partial_text = Some(text.clone());
                    self.last_detected_language = Some(detected_language.clone());
                    self.send(ServerMessage::Interim {
                        text,
                        detected_language,
                    })
                    .await;
                }
            }
            JobOutcome::Finalized(result) => {
                // The buffer was fully drained when the final job was built.
                self.short_attempt = None;
                if !result.original_text.trim().is_empty() {
                    self.last_partial_text = Some(result.original_text.clone());
                    self.last_detected_language = Some(result.detected_language.clone());
                }
                self.send(ServerMessage::Final {
                    original_text: result.original_text,
                    translated_text: result.translated_text,
                    detected_language: result.detected_language,
                    target_language: result.target_language,
                })
                .await;
            }
            JobOutcome::NoAudio => {
                // Bytes were consumed by decode and deemed unrecoverable;
                // superseding audio must arrive in new chunks.
                self.buffer.consume(done.submitted);
                self.short_attempt = None;
            }
            JobOutcome::TooShort { samples } => {
                // Keep the bytes: more audio may complete the utterance.
                debug!(
                    "Session {}: {} decoded samples below minimum, accumulating",
                    self.id, samples
                );
                self.short_attempt = Some(done.submitted);
            }
            JobOutcome::Failed { detail } => {
                warn!("Session {}: processing failed: {}", self.id, detail);
                self.buffer.consume(done.submitted);
                self.short_attempt = None;
                self.send(ServerMessage::Error { detail }).await;
            }
        }

        if done.kind == JobKind::Interim {
            self.maybe_submit_interim();
        }
    }

    async fn send(&self, msg: ServerMessage) {
        if self.outbound.send(msg).await.is_err() {
            debug!("Session {}: client gone, dropping response", self.id);
        }
    }
}
