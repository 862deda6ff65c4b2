// Events that flow from the host page into the engine
//
// Everything the host can report is one variant of HostEvent. Using an enum
// keeps dispatch a single match and lets scenario files describe traces
// with the same types the engine consumes.

use crate::host::ElementId;
use serde::{Deserialize, Serialize};

/// Main event type delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")] // {"type": "pointer_down", ...}
pub enum HostEvent {
    /// The page scroll offset changed (read it back from the document)
    Scroll,

    /// Touch/pointer contact started
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<ElementId>,
    },

    /// Touch/pointer contact ended
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<ElementId>,
    },

    /// Primary activation at a viewport position
    Click { target: ElementId, x: f64, y: f64 },

    /// Key pressed while `target` had focus. `key` uses DOM key names
    /// ("Enter", " ", "Escape", ...).
    KeyDown { target: ElementId, key: String },

    Focus { target: ElementId },

    Blur { target: ElementId },

    /// A form is about to submit
    FormSubmit { form: ElementId },

    /// Device rotated
    OrientationChange,

    /// The reduced-motion preference flipped
    ReducedMotionChanged { reduce: bool },

    /// Visibility notification for an observed element
    Intersection { target: ElementId, ratio: f64 },

    /// A CSS animation on `target` finished
    AnimationEnd { target: ElementId },

    /// A paint or input timing entry
    PerformanceEntry {
        metric: PerformanceMetric,
        start_time: f64,
        #[serde(default)]
        processing_start: Option<f64>,
    },
}

impl HostEvent {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerUp { .. } => "pointer_up",
            Self::Click { .. } => "click",
            Self::KeyDown { .. } => "key_down",
            Self::Focus { .. } => "focus",
            Self::Blur { .. } => "blur",
            Self::FormSubmit { .. } => "form_submit",
            Self::OrientationChange => "orientation_change",
            Self::ReducedMotionChanged { .. } => "reduced_motion_changed",
            Self::Intersection { .. } => "intersection",
            Self::AnimationEnd { .. } => "animation_end",
            Self::PerformanceEntry { .. } => "performance_entry",
        }
    }
}

/// Performance entry types the engine records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceMetric {
    LargestContentfulPaint,
    FirstInput,
}

/// Result of dispatching an event
///
/// Tells the host whether the engine consumed the event and its default
/// action must be suppressed (keyboard activation), or whether it should
/// proceed normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Handled {
    /// Consumed: suppress the default action
    Yes,
    /// Not consumed
    #[default]
    No,
}

impl Handled {
    pub fn from_bool(handled: bool) -> Self {
        if handled {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn was_handled(self) -> bool {
        self == Self::Yes
    }

    /// Yes if either side was handled
    pub fn or(self, other: Handled) -> Handled {
        Self::from_bool(self.was_handled() || other.was_handled())
    }
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        Self::from_bool(handled)
    }
}
