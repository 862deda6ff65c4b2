//! Horizontal swipe detection

use crate::config::GestureConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Swipe {
    /// Finger moved right-to-left
    Left,
    /// Finger moved left-to-right
    Right,
}

/// Classify a gesture by its travel (start minus end). A swipe must be
/// more horizontal than vertical and longer than `threshold`.
pub fn classify(dx: f64, dy: f64, threshold: f64) -> Option<Swipe> {
    if dx.abs() > dy.abs() && dx.abs() > threshold {
        Some(if dx > 0.0 { Swipe::Left } else { Swipe::Right })
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct GestureDetector {
    start: Option<(f64, f64)>,
    threshold: f64,
}

impl GestureDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            start: None,
            threshold: config.swipe_threshold,
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
    }

    /// Finish the gesture. The start point is consumed either way.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<Swipe> {
        let (start_x, start_y) = self.start.take()?;
        classify(start_x - x, start_y - y, self.threshold)
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }
}
