//! Probe loops, timeout watchers, and the response listener.
//!
//! One long-lived task per target sends a probe on a fixed cadence and
//! registers it in the correlation table; one short-lived watcher task per
//! sent probe marks it down after the target's deadline; a single listener
//! resolves replies as they arrive. The listener and the watcher race for
//! each probe, and the table guarantees exactly one of them wins.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, sleep};
use tracing::{debug, info, trace, warn};

use crate::correlation::CorrelationTable;
use crate::metrics::MetricsSink;
use crate::snowflake;
use crate::target::{known_responders, Target};
use crate::transport::{ChatTransport, InboundMessage};

/// How often a new probe is issued per target. Independent of the
/// per-target reply timeout: the cadence governs when the next probe
/// starts, not how long a given probe may take.
pub const PROBE_CADENCE: Duration = Duration::from_secs(7);

/// The correlation engine. Owns the outstanding-probe table and the
/// metrics sink; talks to the chat protocol through [`ChatTransport`].
pub struct Prober {
    transport: Arc<dyn ChatTransport>,
    targets: Vec<Target>,
    responders: HashSet<u64>,
    table: CorrelationTable,
    sink: MetricsSink,
    cadence: Duration,
}

impl Prober {
    pub fn new(transport: Arc<dyn ChatTransport>, targets: Vec<Target>, sink: MetricsSink) -> Self {
        let responders = known_responders(&targets);
        Self {
            transport,
            targets,
            responders,
            table: CorrelationTable::new(),
            sink,
            cadence: PROBE_CADENCE,
        }
    }

    /// Override the probe cadence. Tests use sub-second cadences.
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Number of probes currently awaiting resolution
    pub async fn outstanding_probes(&self) -> usize {
        self.table.outstanding().await
    }

    /// Start one detached probe loop per target. Loops run for the
    /// process lifetime; a stall or send error in one never blocks
    /// another.
    pub fn spawn_loops(self: &Arc<Self>) {
        info!("Checking {} target(s)", self.targets.len());
        for index in 0..self.targets.len() {
            let prober = Arc::clone(self);
            tokio::spawn(prober.probe_loop(index));
        }
    }

    async fn probe_loop(self: Arc<Self>, index: usize) {
        let target = self.targets[index].clone();
        let content = target.probe_content();

        let mut ticker = interval(self.cadence);
        loop {
            ticker.tick().await;
            self.probe_once(index, &target, &content).await;
        }
    }

    /// Send one probe and arm its timeout watcher. A failed send is
    /// logged and skipped; the next cadence tick is the retry.
    async fn probe_once(self: &Arc<Self>, index: usize, target: &Target, content: &str) {
        match self.transport.send_message(target.channel, content).await {
            Ok(probe_id) => {
                self.table.register(probe_id, index).await;

                let prober = Arc::clone(self);
                let timeout = target.timeout();
                tokio::spawn(async move {
                    sleep(timeout).await;
                    prober.expire(probe_id).await;
                });
            }
            Err(err) => {
                warn!(
                    "Failed to send probe to {} in channel {}: {err}",
                    target.bot, target.channel
                );
            }
        }
    }

    /// Timeout path: if the probe is still outstanding, mark its target
    /// down. Losing the race to the listener is the expected no-op.
    pub async fn expire(&self, probe_id: u64) {
        let Some(index) = self.table.resolve(probe_id).await else {
            return;
        };
        let Some(target) = self.targets.get(index) else {
            return;
        };

        info!(
            "Timed out waiting for {} in channel {} after {}s",
            target.bot, target.channel, target.timeout
        );
        self.sink.record_timeout(target);
        self.cleanup(target.channel, probe_id);
    }

    /// Response listener, invoked for every inbound message.
    pub async fn handle_message(&self, message: InboundMessage) {
        // Cheap filters before touching the table: unknown authors and
        // non-replies can never match a probe.
        if !self.responders.contains(&message.author) {
            return;
        }
        let Some(reply_to) = message.reply_to else {
            return;
        };
        if !self.table.contains(reply_to).await {
            return;
        }

        let Some(index) = self.table.resolve(reply_to).await else {
            trace!("Probe {reply_to} already resolved");
            return;
        };
        let Some(target) = self.targets.get(index) else {
            return;
        };

        // A different known responder replying on this thread does not
        // count; the probe stays consumed and the next cadence re-probes.
        if target.bot != message.author {
            debug!(
                "Discarding reply to probe {reply_to}: author {} is not {}",
                message.author, target.bot
            );
            return;
        }

        let latency = snowflake::latency_seconds(reply_to, message.id);
        debug!(
            "Got reply from {} in channel {} after {latency:.3}s (probe {reply_to})",
            target.bot, target.channel
        );
        self.sink.record_success(target, latency);

        self.cleanup(target.channel, reply_to);
        self.cleanup(target.channel, message.id);
    }

    /// Best-effort message deletion, off the resolution path. Failures
    /// are ignored.
    fn cleanup(&self, channel: u64, message: u64) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            let _ = transport.delete_message(channel, message).await;
        });
    }
}
