//! Sequential animation player
//!
//! Strict FIFO with a single animation in flight. An entry counts as playing
//! from the moment it leaves the queue (including its start delay) until the
//! host reports `animation_end` for its target.

use super::{Task, Timers};
use crate::host::{Document, ElementId};
use crate::util::TimerId;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// One queued animation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTask {
    pub target: ElementId,
    /// CSS `animation` shorthand, e.g. "pulse 0.5s ease"
    pub animation: String,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum InFlight {
    /// Dequeued, waiting out its delay
    Delayed(AnimationTask),
    /// Style written, waiting for completion
    Running {
        target: ElementId,
        stall_timer: Option<TimerId>,
    },
}

#[derive(Debug, Default)]
pub struct AnimationQueue {
    queue: VecDeque<AnimationTask>,
    in_flight: Option<InFlight>,
    stall_timeout_ms: Option<u64>,
    completed: u64,
    evicted: u64,
}

impl AnimationQueue {
    pub fn new(stall_timeout_ms: Option<u64>) -> Self {
        Self {
            stall_timeout_ms,
            ..Self::default()
        }
    }

    /// Append and try to start the head
    pub fn enqueue(&mut self, task: AnimationTask, timers: &mut Timers, now: u64) {
        self.queue.push_back(task);
        self.advance(timers, now);
    }

    fn advance(&mut self, timers: &mut Timers, now: u64) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(task) = self.queue.pop_front() else {
            return;
        };
        timers.schedule(now, task.delay_ms, Task::PlayAnimation);
        self.in_flight = Some(InFlight::Delayed(task));
    }

    /// Delay elapsed: write the animation and wait for it to finish
    pub fn on_play(&mut self, doc: &mut dyn Document, timers: &mut Timers, now: u64) {
        let Some(InFlight::Delayed(task)) = self.in_flight.take() else {
            return;
        };
        doc.set_style(task.target, "animation", &task.animation);
        debug!(target = task.target.0, animation = %task.animation, "animation started");

        let stall_timer = self.stall_timeout_ms.map(|ms| {
            timers.schedule(
                now,
                ms,
                Task::AnimationStalled {
                    target: task.target,
                },
            )
        });
        self.in_flight = Some(InFlight::Running {
            target: task.target,
            stall_timer,
        });
    }

    /// Completion notification. Returns true if it finished the running
    /// animation; events for any other element are ignored.
    pub fn on_animation_end(&mut self, target: ElementId, timers: &mut Timers, now: u64) -> bool {
        match &self.in_flight {
            Some(InFlight::Running {
                target: running,
                stall_timer,
            }) if *running == target => {
                if let Some(id) = stall_timer {
                    timers.cancel(*id);
                }
            }
            _ => return false,
        }
        self.in_flight = None;
        self.completed += 1;
        self.advance(timers, now);
        true
    }

    /// Stall timer fired: give up on the running animation
    pub fn on_stall(&mut self, id: TimerId, timers: &mut Timers, now: u64) -> bool {
        match &self.in_flight {
            Some(InFlight::Running {
                target,
                stall_timer: Some(stall),
            }) if *stall == id => {
                warn!(
                    target = target.0,
                    timeout_ms = self.stall_timeout_ms.unwrap_or_default(),
                    "animation never completed; evicting"
                );
            }
            _ => return false,
        }
        self.in_flight = None;
        self.evicted += 1;
        self.advance(timers, now);
        true
    }

    pub fn is_playing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Element currently awaiting completion, if its style has been written
    pub fn running_target(&self) -> Option<ElementId> {
        match &self.in_flight {
            Some(InFlight::Running { target, .. }) => Some(*target),
            _ => None,
        }
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
