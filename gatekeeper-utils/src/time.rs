use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in milliseconds; the throttle's clock.
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
        })
}
