pub mod buffer;
pub mod decode;

pub use buffer::AudioBuffer;
pub use decode::{AudioDecoder, DecodeError, SymphoniaDecoder, TARGET_SAMPLE_RATE};
