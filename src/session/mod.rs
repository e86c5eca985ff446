//! Streaming session engine
//!
//! One `Session` per connected client. The session owns the audio buffer and
//! transcript state, decides when buffered audio justifies a processing pass,
//! hands the heavy work to the shared dispatcher, and emits ordered
//! interim/final/error responses back over its outbound channel.

mod config;
mod session;
mod wire;

pub use config::{SessionConfig, StreamSettings};
pub use session::{Session, SessionInput};
pub use wire::{ClientMessage, ServerMessage};
