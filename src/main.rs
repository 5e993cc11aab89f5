use anyhow::{Context, Result};
use maya::backend::HttpBackend;
use maya::config::AppConfig;
use maya::dispatch::{DispatchPipeline, DispatchTiming};
use maya::session::SessionController;
use maya::speech;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maya=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Maya chat client");

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!("Using backend at {}", config.backend.base_url);

    let backend = HttpBackend::new(&config.backend).context("Failed to create HTTP client")?;
    let pipeline = DispatchPipeline::new(Arc::new(backend), DispatchTiming::from(&config.session));
    let dispatch = pipeline.handle();
    pipeline
        .start_worker()
        .context("Failed to start dispatch worker")?;

    let session = SessionController::new(
        config.session.clone(),
        dispatch,
        speech::platform_input(&config.voice),
        speech::platform_output(&config.voice),
    );

    maya::ui::run(session).map_err(|e| anyhow::anyhow!("Chat window failed: {}", e))?;

    info!("Maya stopped");
    Ok(())
}
