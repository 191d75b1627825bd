//! Shared tracing initialization for the botup binaries.

use std::env;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// The filter honors `RUST_LOG`, defaulting to `info`. Setting
/// `RUST_LOG_FORMAT=json` switches the output layer to JSON lines for
/// log collectors; anything else gets the compact human format.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let json = env::var("RUST_LOG_FORMAT").is_ok_and(|format| format == "json");

    let layer = if json {
        tracing_subscriber::fmt::layer().json().with_filter(filter).boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().with_target(false).with_filter(filter).boxed()
    };

    tracing_subscriber::registry().with(layer).init();
}
