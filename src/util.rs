//! Timing primitives shared by every time-sensitive handler
//!
//! All of these run on virtual time: milliseconds since the engine started,
//! advanced explicitly by the host. Nothing here blocks or spawns.
//!
//! - [`TimerQueue`] - ordered fixed-delay timers with cancellation
//! - [`Debouncer`] - collapse bursts into one call after a quiet period
//! - [`Throttle`] - at most one pass per interval
//! - [`FrameGate`] - at most one callback per rendered frame

use std::collections::BTreeMap;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Pending fixed-delay timers, fired in (due time, scheduling order)
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: BTreeMap<(u64, TimerId), T>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Schedule `task` to become due `delay_ms` after `now`
    pub fn schedule(&mut self, now: u64, delay_ms: u64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((now.saturating_add(delay_ms), id), task);
        id
    }

    /// Cancel a pending timer, returning its task if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = *self.pending.keys().find(|(_, pending)| *pending == id)?;
        self.pending.remove(&key)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|(_, pending)| *pending == id)
    }

    /// Remove and return the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, TimerId, T)> {
        let &(due, id) = self.pending.keys().next()?;
        if due > now {
            return None;
        }
        let task = self.pending.remove(&(due, id))?;
        Some((due, id, task))
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Trailing-edge debounce
///
/// Every call clears the pending timer before scheduling a new one, so only
/// the last call of a burst survives the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait_ms: u64,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            pending: None,
        }
    }

    /// Reschedule `task` to fire `wait_ms` from `now`
    pub fn call<T>(&mut self, timers: &mut TimerQueue<T>, now: u64, task: T) -> TimerId {
        self.cancel_pending(timers);
        let id = timers.schedule(now, self.wait_ms, task);
        self.pending = Some(id);
        id
    }

    /// Drop the pending invocation, if any. Returns true if one was cancelled.
    pub fn cancel_pending<T>(&mut self, timers: &mut TimerQueue<T>) -> bool {
        match self.pending.take() {
            Some(id) => timers.cancel(id).is_some(),
            None => false,
        }
    }

    /// Acknowledge that timer `id` fired. Returns false for stale timers.
    pub fn fired(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }
}

/// Leading-edge throttle: the first call passes, later calls are dropped
/// until `limit_ms` has elapsed
#[derive(Debug, Clone)]
pub struct Throttle {
    limit_ms: u64,
    blocked_until: Option<u64>,
}

impl Throttle {
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms,
            blocked_until: None,
        }
    }

    pub fn try_pass(&mut self, now: u64) -> bool {
        match self.blocked_until {
            Some(until) if now < until => false,
            _ => {
                self.blocked_until = Some(now.saturating_add(self.limit_ms));
                true
            }
        }
    }
}

/// One-callback-per-frame gate (the "ticking" flag)
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    scheduled: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a callback on the next frame. Returns true only when this call
    /// scheduled it; false if one was already pending.
    pub fn request(&mut self) -> bool {
        if self.scheduled {
            false
        } else {
            self.scheduled = true;
            true
        }
    }

    /// Consume the pending request at frame time
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.scheduled)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}
