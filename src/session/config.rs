use serde::{Deserialize, Serialize};

/// Per-session language configuration, set by the first `config` message and
/// replaceable afterwards (taking effect for subsequent audio only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Transcription language hint; `None` means auto-detect.
    #[serde(default)]
    pub source_language: Option<String>,

    /// Language the final result is translated into. May equal the detected
    /// source language, in which case translation is a no-op.
    pub target_language: String,
}

impl SessionConfig {
    pub fn validate(&self, supported_targets: &[String]) -> Result<(), String> {
        if supported_targets
            .iter()
            .any(|lang| lang == &self.target_language)
        {
            Ok(())
        } else {
            Err(format!(
                "unsupported target language '{}' (supported: {})",
                self.target_language,
                supported_targets.join(", ")
            ))
        }
    }
}

/// Session-engine tunables shared by all sessions. These are service
/// configuration, not per-session knobs.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Buffered-byte count that triggers an interim processing pass.
    pub interim_threshold: usize,

    /// Target languages `config` messages may request.
    pub supported_targets: Vec<String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            interim_threshold: 32 * 1024,
            supported_targets: vec!["en".to_string(), "ar".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_supported_target() {
        let config = SessionConfig {
            source_language: None,
            target_language: "ar".to_string(),
        };
        assert!(config.validate(&["en".to_string(), "ar".to_string()]).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_target() {
        let config = SessionConfig {
            source_language: Some("en".to_string()),
            target_language: "tlh".to_string(),
        };
        let err = config
            .validate(&["en".to_string(), "ar".to_string()])
            .unwrap_err();
        assert!(err.contains("tlh"));
    }
}
