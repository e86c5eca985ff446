use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub stream: StreamConfig,
    pub engine: EngineConfig,
    pub languages: LanguagesConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StreamConfig {
    /// Buffered-byte count that triggers an interim processing pass
    pub interim_threshold: usize,

    /// Minimum decoded sample count worth transcribing (0.5s at 16kHz)
    pub min_samples: usize,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    pub nats_url: String,
    pub request_timeout_secs: u64,

    /// Concurrent processing jobs across all sessions
    pub worker_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct LanguagesConfig {
    /// Target languages sessions may configure
    pub targets: Vec<String>,
}

impl Config {
    /// Load configuration, layering an optional file over built-in defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "voxbridge")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8000)?
            .set_default("stream.interim_threshold", 32 * 1024)?
            .set_default("stream.min_samples", 8000)?
            .set_default("engine.nats_url", "nats://localhost:4222")?
            .set_default("engine.request_timeout_secs", 30)?
            .set_default("engine.worker_limit", 4)?
            .set_default("languages.targets", vec!["en", "ar"])?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_config_file() {
        let cfg = Config::load("definitely/not/a/config/file").unwrap();

        assert_eq!(cfg.service.name, "voxbridge");
        assert_eq!(cfg.stream.interim_threshold, 32 * 1024);
        assert_eq!(cfg.stream.min_samples, 8000);
        assert_eq!(cfg.engine.worker_limit, 4);
        assert_eq!(cfg.languages.targets, vec!["en", "ar"]);
    }
}
