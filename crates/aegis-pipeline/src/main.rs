//! Aegis pipeline demo binary: wires up the full stage chain with a null
//! semantic backend and runs until interrupted. Real deployments embed
//! `aegis_pipeline::Pipeline` directly against a frame source instead.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aegis_pipeline::{Pipeline, PipelineConfig};
use aegis_risk::ZoneManager;
use aegis_semantic::NullBackend;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("aegis=info".parse().unwrap()))
        .init();

    info!("Starting aegis-pipeline");

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let pipeline = match Pipeline::new(config, ZoneManager::empty(), Some(Arc::new(NullBackend))) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to construct pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown_handle = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
    });

    shutdown_handle.await.ok();
    pipeline.shutdown().await;

    info!("Pipeline shutdown complete");
}
