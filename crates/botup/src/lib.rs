//! Botup - liveness prober for chat bots
//!
//! This library implements the probe/response correlation engine: it sends
//! a probe message to each monitored bot on a fixed cadence, matches
//! asynchronous replies back to the probe that caused them, and resolves
//! every outstanding probe to either a timed success or a timeout failure
//! exactly once. Outcomes are exported as Prometheus gauges.

pub mod correlation;
pub mod metrics;
pub mod prober;
pub mod snowflake;
pub mod target;
pub mod transport;

// Re-export main types
pub use correlation::CorrelationTable;
pub use metrics::MetricsSink;
pub use prober::{Prober, PROBE_CADENCE};
pub use target::{known_responders, Target};
pub use transport::{ChatTransport, InboundMessage, TransportError};
