//! Monitored target definitions.
//!
//! A target describes one bot to probe: who should answer, where the probe
//! is posted, what the probe says, and how long a reply may take. The list
//! of targets is loaded once at startup and never changes afterwards; a
//! target's position in that list is its stable handle.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

/// One monitored bot endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    /// User id of the bot expected to reply
    pub bot: u64,

    /// Channel the probe is posted in
    pub channel: u64,

    /// Keyword the bot recognizes and replies to
    pub keyword: String,

    /// Seconds a probe may stay unanswered before it counts as down
    pub timeout: u64,
}

impl Target {
    /// Probe message content: a mention of the bot followed by the keyword
    pub fn probe_content(&self) -> String {
        format!("<@{}> {}", self.bot, self.keyword)
    }

    /// Reply deadline for a single probe
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Distinct responder ids across all targets.
///
/// The response listener uses this set to discard unrelated traffic before
/// touching the correlation table.
pub fn known_responders(targets: &[Target]) -> HashSet<u64> {
    targets.iter().map(|target| target.bot).collect()
}
