//! Adaptive per-channel slowmode.
//!
//! Messages are counted in one-minute windows. Reaching the threshold inside a
//! window doubles the channel's slowmode, halves the threshold and extends the
//! cooldown by fifteen minutes. The first message after the cooldown ends
//! restores the defaults.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub const DEFAULT_THRESHOLD: u32 = 32;
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 2;
/// Counting window and the ceiling `cooldown_seconds` is compared against.
pub const RESOLUTION_SECONDS: u64 = 60;
pub const COOLDOWN_EXTENSION_SECONDS: u64 = 15 * 60;

const RESOLUTION_MS: u64 = RESOLUTION_SECONDS * 1_000;
const COOLDOWN_EXTENSION_MS: u64 = COOLDOWN_EXTENSION_SECONDS * 1_000;

/// Platform effects the caller has to apply after a message was recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThrottleOutcome {
    /// The previous cooldown expired: clear slowmode and announce it.
    pub cooldown_ended: bool,
    /// A penalty fired: apply this many seconds of slowmode.
    pub penalty_seconds: Option<u64>,
    /// The message was not counted.
    pub ignored: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdaptiveThrottle {
    threshold: u32,
    cooldown_seconds: u64,
    count: u32,
    count_window_end_ms: u64,
    cooldown_end_ms: Option<u64>,
}

impl Default for AdaptiveThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveThrottle {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            count: 0,
            count_window_end_ms: 0,
            cooldown_end_ms: None,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cooldown_end_ms(&self) -> Option<u64> {
        self.cooldown_end_ms
    }

    /// Record one message observed at `now_ms` (unix milliseconds).
    pub fn on_message(&mut self, now_ms: u64) -> ThrottleOutcome {
        let mut outcome = ThrottleOutcome::default();

        match self.cooldown_end_ms {
            Some(end) if now_ms >= end => {
                self.reset();
                outcome.cooldown_ended = true;
            }
            // Compares a delay in seconds against the window length; once the
            // delay passes one minute nothing is counted until the cooldown ends.
            Some(_) if self.cooldown_seconds > RESOLUTION_SECONDS => {
                outcome.ignored = true;
                return outcome;
            }
            _ => {}
        }

        self.count = self.count.saturating_add(1);

        if now_ms >= self.count_window_end_ms {
            self.count = 1;
            self.count_window_end_ms = now_ms + RESOLUTION_MS;
        } else if self.count >= self.threshold {
            let base = self.cooldown_end_ms.unwrap_or(now_ms);
            self.cooldown_end_ms = Some(base + COOLDOWN_EXTENSION_MS);
            self.threshold /= 2;
            self.cooldown_seconds = self.cooldown_seconds.saturating_mul(2);
            self.count = 0;
            self.count_window_end_ms = now_ms + RESOLUTION_MS;
            outcome.penalty_seconds = Some(self.cooldown_seconds);
        }

        outcome
    }

    fn reset(&mut self) {
        self.threshold = DEFAULT_THRESHOLD;
        self.cooldown_seconds = DEFAULT_COOLDOWN_SECONDS;
        self.cooldown_end_ms = None;
    }
}

/// Throttle state of every channel seen since startup.
#[derive(Debug, Default)]
pub struct ChannelThrottles {
    channels: Mutex<HashMap<u64, Arc<Mutex<AdaptiveThrottle>>>>,
}

impl ChannelThrottles {
    pub fn record(&self, channel_id: u64, now_ms: u64) -> ThrottleOutcome {
        let throttle = {
            let mut channels = self
                .channels
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            channels.entry(channel_id).or_default().clone()
        };

        let mut throttle = throttle.lock().unwrap_or_else(PoisonError::into_inner);
        throttle.on_message(now_ms)
    }

    pub fn state(&self, channel_id: u64) -> Option<AdaptiveThrottle> {
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let throttle = channels.get(&channel_id)?;
        let state = throttle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::{AdaptiveThrottle, ChannelThrottles, ThrottleOutcome};

    const MINUTE: u64 = 60_000;

    /// Send `n` messages one millisecond apart starting at `start`; returns the
    /// outcomes and the timestamp after the last message.
    fn burst(throttle: &mut AdaptiveThrottle, start: u64, n: u32) -> (Vec<ThrottleOutcome>, u64) {
        let mut now = start;
        let mut outcomes = Vec::new();
        for _ in 0..n {
            outcomes.push(throttle.on_message(now));
            now += 1;
        }
        (outcomes, now)
    }

    #[test]
    fn thirty_two_messages_in_a_minute_trigger_first_penalty() {
        let mut throttle = AdaptiveThrottle::new();
        let (outcomes, _) = burst(&mut throttle, 1_000, 32);

        assert!(outcomes[..31].iter().all(|o| o.penalty_seconds.is_none()));
        assert_eq!(outcomes[31].penalty_seconds, Some(4));
        assert_eq!(throttle.cooldown_seconds(), 4);
        assert_eq!(throttle.threshold(), 16);
        assert_eq!(throttle.count(), 0);
        assert_eq!(throttle.cooldown_end_ms(), Some(1_031 + 15 * MINUTE));
    }

    #[test]
    fn penalties_escalate_and_extend_cooldown() {
        let mut throttle = AdaptiveThrottle::new();
        let (_, now) = burst(&mut throttle, 1_000, 32);
        let first_end = throttle.cooldown_end_ms().expect("cooldown active");

        let (outcomes, _) = burst(&mut throttle, now, 16);

        assert_eq!(outcomes[15].penalty_seconds, Some(8));
        assert_eq!(throttle.cooldown_seconds(), 8);
        assert_eq!(throttle.threshold(), 8);
        assert_eq!(throttle.cooldown_end_ms(), Some(first_end + 15 * MINUTE));
    }

    #[test]
    fn slow_traffic_never_penalizes() {
        let mut throttle = AdaptiveThrottle::new();
        for minute in 0..10 {
            let (outcomes, _) = burst(&mut throttle, 1 + minute * MINUTE, 31);
            assert!(outcomes.iter().all(|o| *o == ThrottleOutcome::default()));
        }
        assert_eq!(throttle.cooldown_seconds(), 2);
    }

    #[test]
    fn expired_cooldown_resets_on_next_message() {
        let mut throttle = AdaptiveThrottle::new();
        let (_, now) = burst(&mut throttle, 1_000, 32);
        let (_, _) = burst(&mut throttle, now, 16);
        let end = throttle.cooldown_end_ms().expect("cooldown active");

        let outcome = throttle.on_message(end);

        assert!(outcome.cooldown_ended);
        assert_eq!(outcome.penalty_seconds, None);
        assert_eq!(throttle.threshold(), 32);
        assert_eq!(throttle.cooldown_seconds(), 2);
        assert_eq!(throttle.cooldown_end_ms(), None);
        assert_eq!(throttle.count(), 1);
    }

    #[test]
    fn counting_stops_once_cooldown_exceeds_one_minute() {
        // Preserves the ceiling comparison: with a 64s delay the throttle
        // ignores messages entirely until the cooldown expires.
        let mut throttle = AdaptiveThrottle::new();
        let mut now = 1_000;
        for expected in [4, 8, 16, 32, 64] {
            let threshold = throttle.threshold();
            let (outcomes, next) = burst(&mut throttle, now, threshold);
            assert_eq!(outcomes.last().and_then(|o| o.penalty_seconds), Some(expected));
            now = next;
        }
        assert_eq!(throttle.threshold(), 1);

        let outcome = throttle.on_message(now);
        assert!(outcome.ignored);
        assert_eq!(throttle.count(), 0);
        assert_eq!(throttle.cooldown_seconds(), 64);

        let end = throttle.cooldown_end_ms().expect("cooldown active");
        let outcome = throttle.on_message(end);
        assert!(outcome.cooldown_ended);
        assert!(!outcome.ignored);
        assert_eq!(throttle.cooldown_seconds(), 2);
    }

    #[test]
    fn threshold_may_reach_zero() {
        let mut throttle = AdaptiveThrottle {
            threshold: 1,
            cooldown_seconds: 2,
            count: 0,
            count_window_end_ms: 0,
            cooldown_end_ms: None,
        };
        throttle.on_message(0);
        let outcome = throttle.on_message(1);

        assert_eq!(outcome.penalty_seconds, Some(4));
        assert_eq!(throttle.threshold(), 0);

        // Every counted message inside the window now escalates.
        assert_eq!(throttle.on_message(2).penalty_seconds, Some(8));
    }

    #[test]
    fn channels_are_tracked_independently() {
        let throttles = ChannelThrottles::default();
        for i in 0..32 {
            throttles.record(1, 1_000 + i);
        }
        throttles.record(2, 1_000);

        assert_eq!(throttles.state(1).map(|t| t.cooldown_seconds()), Some(4));
        assert_eq!(throttles.state(2).map(|t| t.cooldown_seconds()), Some(2));
        assert!(throttles.state(3).is_none());
    }
}
