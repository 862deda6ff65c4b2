//! Enhancement components
//!
//! Each module owns one concern and exposes plain handler methods that take
//! the document (and, when they defer work, the shared timer queue). None of
//! them know about each other; the orchestrator wires them together.

pub mod accessibility;
pub mod animation;
pub mod environment;
pub mod gesture;
pub mod interactions;
pub mod mobile;
pub mod navigation;
pub mod parallax;
pub mod styles;
pub mod visibility;

pub use accessibility::AccessibilityAugmenter;
pub use animation::{AnimationQueue, AnimationTask};
pub use environment::{PerformanceMonitor, PerformanceSnapshot};
pub use gesture::{GestureDetector, Swipe};
pub use interactions::{InteractionEnhancer, RippleFeedback};
pub use mobile::MobileEnhancer;
pub use navigation::{NavTransition, NavVisibility, NavigationController, ScrollState};
pub use parallax::ParallaxScroller;
pub use visibility::{EnhancementTarget, RevealVariant, VisibilityWatcher};

use crate::host::ElementId;
use crate::util::TimerQueue;

/// Deferred work, fired by the orchestrator's timer queue
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Debounced header update
    NavigationScroll,
    /// Empty the live region
    ClearAnnouncement { region: ElementId },
    /// Queued animation's start delay elapsed
    PlayAnimation,
    /// Running animation never reported completion
    AnimationStalled { target: ElementId },
    /// Drop `touching` after pointer-up
    ReleaseTouch { target: ElementId },
    /// Ripple lifetime over
    RemoveRipple { ripple: ElementId },
    /// Post-rotation scroll
    OrientationNudge,
}

pub type Timers = TimerQueue<Task>;
