use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Sample rate all decoded audio is normalized to (what the STT engine expects).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("audio decode failed: {0}")]
    Codec(String),
}

/// Converts one compressed audio fragment into mono f32 samples at
/// [`TARGET_SAMPLE_RATE`]. An empty vector means no usable audio was
/// recoverable from the bytes.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<f32>, DecodeError>;
}

/// Container/codec decoder backed by symphonia, with a raw 16-bit PCM
/// fallback for clients that send bare sample data.
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        match decode_container(bytes) {
            Ok(samples) => Ok(samples),
            Err(e) => {
                debug!("Container probe failed ({}), trying raw PCM fallback", e);
                Ok(decode_raw_pcm(bytes))
            }
        }
    }
}

fn decode_container(bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
    let cursor = std::io::Cursor::new(bytes.to_vec());
    let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| DecodeError::Codec("no default audio track".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params.sample_rate.unwrap_or(TARGET_SAMPLE_RATE);
    let channels = codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream (or a truncated tail chunk): keep what we have.
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            // Corrupt packet in the middle of a stream: skip it.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        }
    }

    let mono = downmix_to_mono(&interleaved, channels);
    Ok(decimate(mono, sample_rate, TARGET_SAMPLE_RATE))
}

/// Interpret the bytes as raw i16 little-endian PCM at the target rate,
/// normalized to f32 in [-1, 1]. An odd trailing byte is padded with zero.
fn decode_raw_pcm(bytes: &[u8]) -> Vec<f32> {
    let mut padded;
    let aligned = if bytes.len() % 2 != 0 {
        padded = bytes.to_vec();
        padded.push(0);
        &padded[..]
    } else {
        bytes
    };

    aligned
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Average interleaved channels down to mono.
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Downsample by integer decimation. Upsampling is not attempted; lower-rate
/// audio passes through unchanged.
fn decimate(samples: Vec<f32>, source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate <= target_rate {
        return samples;
    }

    let ratio = (source_rate / target_rate).max(1) as usize;
    samples.into_iter().step_by(ratio).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_samples() {
        let decoder = SymphoniaDecoder::new();
        assert!(decoder.decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn raw_pcm_fallback_normalizes_i16() {
        let bytes = [0x00u8, 0x40]; // 16384 -> 0.5
        let samples = decode_raw_pcm(&bytes);
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn raw_pcm_fallback_pads_odd_length() {
        let bytes = [0x00u8, 0x40, 0x7f];
        let samples = decode_raw_pcm(&bytes);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn downmix_averages_stereo_frames() {
        let interleaved = [0.5, -0.5, 1.0, 0.0];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![0.0, 0.5]);
    }

    #[test]
    fn decimate_halves_48k_to_16k_by_thirds() {
        let samples: Vec<f32> = (0..6).map(|i| i as f32).collect();
        let out = decimate(samples, 48_000, 16_000);
        assert_eq!(out, vec![0.0, 3.0]);
    }

    #[test]
    fn decimate_never_upsamples() {
        let samples = vec![1.0, 2.0];
        let out = decimate(samples.clone(), 8_000, 16_000);
        assert_eq!(out, samples);
    }
}
