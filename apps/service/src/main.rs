#![warn(clippy::all, clippy::pedantic)]

//! botup-service - probe Discord bots and export their liveness.
//!
//! Wiring order follows the data flow: config, metrics registry, REST
//! transport, prober loops, channel pollers, then the actix server on the
//! foreground task. There is no graceful shutdown; the correlation state
//! is in-memory and disposable.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use botup::{ChatTransport, MetricsSink, Prober};
use clap::Parser;
use prometheus::Registry;
use tokio::sync::mpsc;
use tracing::info;

mod config;
mod discord;
mod error;
mod routes;

use config::Config;
use discord::DiscordTransport;
use error::AppError;

#[derive(Parser)]
#[command(name = "botup-service", version)]
#[command(about = "Probe Discord bots for liveness and export Prometheus gauges")]
struct Args {
    /// Path to the TOML configuration file (default: ./botup.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    logger::init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let registry = Registry::new();
    let sink = MetricsSink::new(&registry)?;

    let transport = Arc::new(DiscordTransport::new(&config.discord.token)?);
    let prober = Arc::new(Prober::new(
        Arc::clone(&transport) as Arc<dyn ChatTransport>,
        config.targets.clone(),
        sink,
    ));
    prober.spawn_loops();

    // One poller per distinct channel; targets may share one.
    let channels: Vec<u64> =
        config.targets.iter().map(|target| target.channel).collect::<BTreeSet<_>>().into_iter().collect();
    let (tx, mut rx) = mpsc::channel(256);
    discord::spawn_pollers(transport, channels, tx);

    {
        let prober = Arc::clone(&prober);
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                prober.handle_message(message).await;
            }
        });
    }

    let addr: SocketAddr = config.metrics_addr().parse()?;
    run_server(registry, addr).await
}

async fn run_server(registry: Registry, addr: SocketAddr) -> Result<(), AppError> {
    info!("Exporting metrics on {addr}");

    let registry = web::Data::new(registry);
    HttpServer::new(move || {
        App::new().app_data(registry.clone()).service(routes::health).service(routes::metrics)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
