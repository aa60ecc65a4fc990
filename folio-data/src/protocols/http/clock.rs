use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tracing::debug;

/*----- */
// Server Clock
/*----- */
// Exchanges reject signed requests whose timestamp drifts outside the
// recvWindow, so every signature is stamped with local time shifted by the
// last measured offset to the exchange clock.
#[derive(Debug, Default)]
pub struct ServerClock {
    offset_ms: AtomicI64,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Relaxed)
    }

    pub fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis() + self.offset_ms()
    }

    // Offset is measured against the midpoint of the round trip
    pub fn sync(&self, server_ms: i64, sent_at_ms: i64, received_at_ms: i64) -> i64 {
        let midpoint = sent_at_ms + (received_at_ms - sent_at_ms) / 2;
        let offset = server_ms - midpoint;
        self.offset_ms.store(offset, Ordering::Relaxed);

        debug!(
            offset_ms = offset,
            round_trip_ms = received_at_ms - sent_at_ms,
            "server clock synced"
        );

        offset
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sync_uses_round_trip_midpoint() {
        let clock = ServerClock::new();
        assert_eq!(clock.offset_ms(), 0);

        // sent at 1000, received at 1200, server said 1600 -> midpoint 1100
        let offset = clock.sync(1600, 1000, 1200);
        assert_eq!(offset, 500);
        assert_eq!(clock.offset_ms(), 500);

        // server behind local clock
        let offset = clock.sync(900, 1000, 1000);
        assert_eq!(offset, -100);
    }

    #[test]
    fn test_now_applies_offset() {
        let clock = ServerClock::new();
        let now = Utc::now().timestamp_millis();
        clock.sync(now + 60_000, now, now);

        let shifted = clock.now_ms();
        assert!(shifted >= now + 60_000);
        assert!(shifted < now + 61_000);
    }
}
