use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use voxbridge::audio::SymphoniaDecoder;
use voxbridge::engine::nats::{connect, NatsTranscriber, NatsTranslator};
use voxbridge::engine::Engines;
use voxbridge::{create_router, AppState, Config, Dispatcher, StreamSettings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/voxbridge")?;

    info!("voxbridge v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!(
        "Engine services at {} (timeout {}s, {} workers)",
        cfg.engine.nats_url, cfg.engine.request_timeout_secs, cfg.engine.worker_limit
    );

    let nats = connect(
        &cfg.engine.nats_url,
        Duration::from_secs(cfg.engine.request_timeout_secs),
    )
    .await?;

    let engines = Engines::new(
        Arc::new(SymphoniaDecoder::new()),
        Arc::new(NatsTranscriber::new(nats.clone())),
        Arc::new(NatsTranslator::new(nats)),
    );

    let dispatcher = Arc::new(Dispatcher::new(
        engines,
        cfg.engine.worker_limit,
        cfg.stream.min_samples,
    ));

    let state = AppState::new(
        dispatcher,
        StreamSettings {
            interim_threshold: cfg.stream.interim_threshold,
            supported_targets: cfg.languages.targets.clone(),
        },
    );

    let app = create_router(state);
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
