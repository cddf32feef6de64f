use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

mod builder;
mod cache;
mod config;
mod error;
mod guide_time;
mod logging;
mod models;
mod render;
mod scheduler;
mod server;
mod source;

use crate::builder::SnapshotBuilder;
use crate::cache::SnapshotCache;
use crate::config::{Args, Config};
use crate::scheduler::{RefreshScheduler, shutdown_channel};
use crate::source::{ChannelSource, StirrClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from(Args::parse());
    logging::init_logging(config.verbose)?;

    let client = StirrClient::new(config.request_timeout)
        .context("Error when configuring STIRR client")?;
    let source: Arc<dyn ChannelSource> = Arc::new(client);

    let station = match config.station_id.clone() {
        Some(station) => station,
        None => {
            tracing::info!("STIRR_STATION_ID not set, attempting to auto detect local station");
            let station = source
                .detect_station()
                .await
                .context("Error when detecting local station")?;
            tracing::info!(station = %station, "Local station identified");
            station
        }
    };

    let cache = Arc::new(SnapshotCache::new());
    let builder = SnapshotBuilder::new(source, config.request_timeout);
    let scheduler = RefreshScheduler::new(
        builder,
        cache.clone(),
        station,
        config.refresh_interval,
    );

    // Nothing is served until the first snapshot exists
    scheduler
        .refresh()
        .await
        .context("Error when filling cache")?;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let server_cache = cache.clone();
    let addr = config.listen_addr;
    let mut server_handle =
        tokio::spawn(async move { server::run_server(addr, server_cache, shutdown_rx).await });

    tokio::select! {
        result = signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutting down...");
        }
        // The server only returns on its own if it failed
        result = &mut server_handle => {
            let _ = shutdown_tx.send(true);
            let _ = scheduler_handle.await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.context("Error starting server")),
                Err(e) => Err(anyhow::Error::new(e).context("Server task panicked")),
            };
        }
    }

    let _ = shutdown_tx.send(true);

    let _ = scheduler_handle.await;
    if let Ok(Err(e)) = server_handle.await {
        tracing::error!(error = %e, "Server exited with error");
    }

    tracing::info!("Done.");
    Ok(())
}
