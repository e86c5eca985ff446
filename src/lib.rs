pub mod audio;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod http;
pub mod session;

pub use audio::{AudioBuffer, AudioDecoder, DecodeError, SymphoniaDecoder, TARGET_SAMPLE_RATE};
pub use config::Config;
pub use dispatch::{CompletedJob, Dispatcher, FinalResult, JobKind, JobOutcome, ProcessingJob};
pub use engine::{
    Engines, TranscribeError, Transcriber, Transcription, TranslateError, Translator,
};
pub use http::{create_router, AppState};
pub use session::{
    ClientMessage, ServerMessage, Session, SessionConfig, SessionInput, StreamSettings,
};
