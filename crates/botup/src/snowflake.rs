//! Discord snowflake timestamps.
//!
//! Message ids embed their creation time: the upper 42 bits are
//! milliseconds since the Discord epoch (2015-01-01T00:00:00Z). Latency is
//! computed from these embedded timestamps rather than wall-clock capture
//! time, so clock skew and process pauses between send and receive do not
//! distort the measurement.

use chrono::{DateTime, Utc};

/// Discord epoch in milliseconds since the Unix epoch
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Milliseconds since the Unix epoch at which `id` was created
pub fn unix_millis(id: u64) -> i64 {
    (id >> 22) as i64 + DISCORD_EPOCH_MS
}

/// Creation time embedded in a snowflake id
pub fn timestamp(id: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(unix_millis(id))
}

/// Seconds between the creation of two messages, `earlier` first.
///
/// Negative for malformed input (a reply older than its probe).
pub fn latency_seconds(earlier: u64, later: u64) -> f64 {
    (unix_millis(later) - unix_millis(earlier)) as f64 / 1000.0
}

/// Smallest snowflake that could have been created at `time`.
///
/// Used as an `after` cursor when polling a channel for new messages.
pub fn at(time: DateTime<Utc>) -> u64 {
    let ms = (time.timestamp_millis() - DISCORD_EPOCH_MS).max(0) as u64;
    ms << 22
}

#[cfg(test)]
mod tests {
    use super::*;

    // 175928847299117063 is the worked example from the Discord docs,
    // created 2016-04-30 11:18:25.796 UTC.
    const DOC_EXAMPLE: u64 = 175_928_847_299_117_063;

    #[test]
    fn timestamp_matches_documented_example() {
        let ts = timestamp(DOC_EXAMPLE).unwrap();
        assert_eq!(ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true), "2016-04-30T11:18:25.796Z");
    }

    #[test]
    fn latency_between_offset_ids() {
        let probe = 1u64 << 22;
        let reply = (1u64 + 3_000) << 22; // 3s later
        assert_eq!(latency_seconds(probe, reply), 3.0);
    }

    #[test]
    fn latency_is_negative_for_reordered_ids() {
        let probe = (5_000u64) << 22;
        let reply = (2_000u64) << 22;
        assert!(latency_seconds(probe, reply) < 0.0);
    }

    #[test]
    fn cursor_round_trips_through_timestamp() {
        let now = Utc::now();
        let id = at(now);
        let back = timestamp(id).unwrap();
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }
}
