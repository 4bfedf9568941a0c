//! Exact sliding-window event counting.
//!
//! Each key maps to an ordered deque of event timestamps. A check trims
//! entries older than `now - window`, counts what remains, and (for
//! recording calls) appends the new event; trim and append happen under one
//! lock acquisition so concurrent checks never interleave between them.
//! Cost is O(events-in-window) per call, acceptable for the short per-key
//! windows used here, and avoids the boundary artifacts of fixed buckets.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// A map of per-key sliding windows over event timestamps.
#[derive(Debug, Default)]
pub struct WindowMap {
    entries: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

/// Outcome of counting events in a key's trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Events remaining in the window (before any append).
    pub count: u32,
    /// The oldest event still inside the window, if any.
    pub oldest: Option<DateTime<Utc>>,
}

impl WindowMap {
    /// Create an empty window map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count in-window events for `key` without recording a new one.
    pub fn count_at(&self, key: &str, window: Duration, now: DateTime<Utc>) -> WindowCount {
        let mut entries = self.entries.lock();
        let Some(events) = entries.get_mut(key) else {
            return WindowCount {
                count: 0,
                oldest: None,
            };
        };
        Self::trim(events, window, now);
        let count = u32::try_from(events.len()).unwrap_or(u32::MAX);
        WindowCount {
            count,
            oldest: events.front().copied(),
        }
    }

    /// Record an event for `key` and return the in-window count *including*
    /// the new event.
    pub fn record_at(&self, key: &str, window: Duration, now: DateTime<Utc>) -> WindowCount {
        let mut entries = self.entries.lock();
        let events = entries.entry(key.to_string()).or_default();
        Self::trim(events, window, now);
        events.push_back(now);
        let count = u32::try_from(events.len()).unwrap_or(u32::MAX);
        WindowCount {
            count,
            oldest: events.front().copied(),
        }
    }

    /// Record an event for `key` only if fewer than `threshold` events are
    /// already in the window.
    ///
    /// Trim, compare, and append happen under a single lock acquisition, so
    /// concurrent callers can never jointly admit more than `threshold`
    /// events per window.
    ///
    /// # Errors
    ///
    /// Returns the pre-append count (with the oldest in-window event) when
    /// the threshold is already reached; nothing is recorded in that case.
    pub fn record_below_at(
        &self,
        key: &str,
        window: Duration,
        threshold: u32,
        now: DateTime<Utc>,
    ) -> std::result::Result<WindowCount, WindowCount> {
        let mut entries = self.entries.lock();
        let events = entries.entry(key.to_string()).or_default();
        Self::trim(events, window, now);
        let count = u32::try_from(events.len()).unwrap_or(u32::MAX);
        if count >= threshold {
            return Err(WindowCount {
                count,
                oldest: events.front().copied(),
            });
        }
        events.push_back(now);
        Ok(WindowCount {
            count: count + 1,
            oldest: events.front().copied(),
        })
    }

    /// Drop all events for `key`.
    pub fn clear(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Number of keys currently tracked (including stale ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no keys are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn trim(events: &mut VecDeque<DateTime<Utc>>, window: Duration, now: DateTime<Utc>) {
        // Strictly older than the horizon: an event exactly `window` old is
        // still inside the trailing window.
        let horizon = now - ChronoDuration::from_std(window).unwrap_or(ChronoDuration::MAX);
        while events.front().is_some_and(|&t| t < horizon) {
            events.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn empty_key_counts_zero() {
        let map = WindowMap::new();
        let counted = map.count_at("k", WINDOW, Utc::now());
        assert_eq!(counted.count, 0);
        assert!(counted.oldest.is_none());
    }

    #[test]
    fn record_increments_count() {
        let map = WindowMap::new();
        let now = Utc::now();

        assert_eq!(map.record_at("k", WINDOW, now).count, 1);
        assert_eq!(map.record_at("k", WINDOW, now).count, 2);
        assert_eq!(map.count_at("k", WINDOW, now).count, 2);
    }

    #[test]
    fn events_age_out_of_window() {
        let map = WindowMap::new();
        let start = Utc::now();

        map.record_at("k", WINDOW, start);
        map.record_at("k", WINDOW, start + ChronoDuration::seconds(30));

        // 61 seconds after the first event, only the second remains.
        let later = start + ChronoDuration::seconds(61);
        let counted = map.count_at("k", WINDOW, later);
        assert_eq!(counted.count, 1);
        assert_eq!(counted.oldest, Some(start + ChronoDuration::seconds(30)));
    }

    #[test]
    fn event_exactly_window_old_still_counts() {
        let map = WindowMap::new();
        let start = Utc::now();

        map.record_at("k", WINDOW, start);

        let at_boundary = map.count_at("k", WINDOW, start + ChronoDuration::seconds(60));
        assert_eq!(at_boundary.count, 1);

        let past_boundary = map.count_at("k", WINDOW, start + ChronoDuration::seconds(61));
        assert_eq!(past_boundary.count, 0);
    }

    #[test]
    fn keys_are_independent() {
        let map = WindowMap::new();
        let now = Utc::now();

        map.record_at("a", WINDOW, now);
        map.record_at("a", WINDOW, now);
        map.record_at("b", WINDOW, now);

        assert_eq!(map.count_at("a", WINDOW, now).count, 2);
        assert_eq!(map.count_at("b", WINDOW, now).count, 1);
    }

    #[test]
    fn clear_drops_key() {
        let map = WindowMap::new();
        let now = Utc::now();

        map.record_at("k", WINDOW, now);
        map.clear("k");

        assert_eq!(map.count_at("k", WINDOW, now).count, 0);
        assert!(map.is_empty());
    }

    #[test]
    fn oldest_tracks_window_front() {
        let map = WindowMap::new();
        let start = Utc::now();

        map.record_at("k", WINDOW, start);
        let counted = map.record_at("k", WINDOW, start + ChronoDuration::seconds(10));
        assert_eq!(counted.oldest, Some(start));
    }
}
