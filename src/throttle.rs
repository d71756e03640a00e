use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

/// Minimum interval between two accepted requests from the same user.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Table size above which stale entries are swept, at most once per window.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Per-user request throttle.
///
/// Remembers when each user last got through. The check and the update
/// happen under the same per-key lock, so two concurrent requests from one
/// user can never both pass.
pub struct Throttle {
    window: Duration,
    capacity: usize,
    last_seen: DashMap<u64, Instant>,
    last_sweep: Mutex<Option<Instant>>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_CAPACITY)
    }
}

impl Throttle {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity,
            last_seen: DashMap::new(),
            last_sweep: Mutex::new(None),
        }
    }

    /// Returns `true` and records `now` if the user may proceed. A rejected
    /// request leaves the recorded time untouched.
    pub fn allow(&self, user_id: u64, now: Instant) -> bool {
        match self.last_seen.entry(user_id) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.window {
                    return false;
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }

        if self.last_seen.len() > self.capacity && self.claim_sweep(now) {
            self.sweep(now);
        }
        true
    }

    /// At most one sweep per window. A caller that finds another sweep in
    /// progress skips it.
    fn claim_sweep(&self, now: Instant) -> bool {
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return false;
        };
        match *last {
            Some(prev) if now.saturating_duration_since(prev) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Drop users whose last accepted request is a full window old. Their
    /// next request would be accepted either way.
    fn sweep(&self, now: Instant) {
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
        let removed = before.saturating_sub(self.last_seen.len());
        if removed > 0 {
            debug!("Throttle sweep removed {} of {} entries", removed, before);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.last_seen.len()
    }
}
