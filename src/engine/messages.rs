use serde::{Deserialize, Serialize};

/// Transcription request published to the STT service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeRequest {
    /// Base64-encoded f32 little-endian PCM at 16 kHz mono.
    pub pcm: String,
    pub sample_rate: u32,
    pub language_hint: Option<String>,
    pub timestamp: String, // RFC3339 timestamp
}

/// Reply from the STT service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeReply {
    pub text: String,
    pub detected_language: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Translation request published to the MT service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    pub timestamp: String,
}

/// Reply from the MT service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateReply {
    #[serde(default)]
    pub text: Option<String>,
    /// "unsupported_pair" when no model exists for the pair.
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcribe_reply_tolerates_missing_error_field() {
        let reply: TranscribeReply =
            serde_json::from_str(r#"{"text":"hello","detected_language":"en"}"#).unwrap();
        assert_eq!(reply.text, "hello");
        assert!(reply.error.is_none());
    }

    #[test]
    fn translate_reply_carries_unsupported_pair_marker() {
        let reply: TranslateReply =
            serde_json::from_str(r#"{"error":"unsupported_pair"}"#).unwrap();
        assert_eq!(reply.error.as_deref(), Some("unsupported_pair"));
        assert!(reply.text.is_none());
    }
}
