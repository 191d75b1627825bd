//! Prometheus gauges for probe outcomes.

use chrono::Utc;
use prometheus::{GaugeVec, Opts, Registry};

use crate::target::Target;

pub const BOT_LABEL: &str = "bot";
pub const CHANNEL_LABEL: &str = "channel";

/// Latency value exported when a probe timed out
pub const LATENCY_SENTINEL: f64 = -1.0;

/// The three gauges both resolution paths write, labeled by
/// (bot, channel). Overwrite-only: each resolution replaces the previous
/// sample for its label pair, and a target that has never resolved a probe
/// exports nothing.
#[derive(Clone)]
pub struct MetricsSink {
    up: GaugeVec,
    latency: GaugeVec,
    last_update: GaugeVec,
}

impl MetricsSink {
    /// Create the gauge families and register them on `registry`.
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let labels = [BOT_LABEL, CHANNEL_LABEL];

        let up = GaugeVec::new(
            Opts::new("bot_up", "Whether the bot answered its most recent probe"),
            &labels,
        )?;
        let latency = GaugeVec::new(
            Opts::new(
                "bot_latency",
                "Seconds from the last probe message to its reply, -1 on timeout",
            ),
            &labels,
        )?;
        let last_update = GaugeVec::new(
            Opts::new("bot_last_update", "Unix timestamp of the last resolved probe"),
            &labels,
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(last_update.clone()))?;

        Ok(Self { up, latency, last_update })
    }

    /// Record a reply that arrived in time.
    pub fn record_success(&self, target: &Target, latency_seconds: f64) {
        let (bot, channel) = (target.bot.to_string(), target.channel.to_string());
        let labels = [bot.as_str(), channel.as_str()];

        self.up.with_label_values(&labels).set(1.0);
        self.latency.with_label_values(&labels).set(latency_seconds);
        self.last_update.with_label_values(&labels).set(Utc::now().timestamp() as f64);
    }

    /// Record a probe that went unanswered past its deadline.
    pub fn record_timeout(&self, target: &Target) {
        let (bot, channel) = (target.bot.to_string(), target.channel.to_string());
        let labels = [bot.as_str(), channel.as_str()];

        self.up.with_label_values(&labels).set(0.0);
        self.latency.with_label_values(&labels).set(LATENCY_SENTINEL);
        self.last_update.with_label_values(&labels).set(Utc::now().timestamp() as f64);
    }
}

/// Read one gauge value back out of a registry. Test helper shared with
/// the prober tests.
#[cfg(test)]
pub(crate) fn gauge_value(registry: &Registry, name: &str, bot: u64, channel: u64) -> Option<f64> {
    let (bot, channel) = (bot.to_string(), channel.to_string());
    registry
        .gather()
        .iter()
        .find(|family| family.get_name() == name)?
        .get_metric()
        .iter()
        .find(|metric| {
            let labels = metric.get_label();
            labels.iter().any(|l| l.get_name() == BOT_LABEL && l.get_value() == bot)
                && labels.iter().any(|l| l.get_name() == CHANNEL_LABEL && l.get_value() == channel)
        })
        .map(|metric| metric.get_gauge().get_value())
}
