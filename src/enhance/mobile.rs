//! Mobile-only enhancements: touch feedback, footer nav, input font floor,
//! orientation nudge

use super::{Task, Timers};
use crate::config::TouchConfig;
use crate::host::{Document, ElementId};
use crate::util::Throttle;
use std::collections::HashSet;
use tracing::debug;

pub const TOUCH_SELECTOR: &str = ".btn, .nav-item, .mobile-nav-item";
pub const MOBILE_NAV_SELECTOR: &str = ".mobile-footer-nav";
pub const MOBILE_NAV_ITEM_SELECTOR: &str = ".mobile-footer-nav .nav-item";
pub const INPUT_SELECTOR: &str = "input, select, textarea";

pub const SAFE_AREA_DECLARATION: &str = "padding-bottom: env(safe-area-inset-bottom)";
pub const SAFE_AREA_PADDING: &str = "calc(8px + env(safe-area-inset-bottom))";

/// Smallest input font size that does not trigger zoom-on-focus
pub const MIN_INPUT_FONT_PX: f64 = 16.0;

#[derive(Debug)]
pub struct MobileEnhancer {
    touch_targets: HashSet<ElementId>,
    haptics: Throttle,
    config: TouchConfig,
    inputs_adjusted: usize,
}

impl MobileEnhancer {
    /// Enhance the footer nav first so its items pick up touch feedback
    pub fn install(doc: &mut dyn Document, config: &TouchConfig) -> Self {
        enhance_mobile_nav(doc);
        let inputs_adjusted = enforce_input_font_floor(doc);

        Self {
            touch_targets: doc.query_all(TOUCH_SELECTOR).into_iter().collect(),
            haptics: Throttle::new(config.haptic_throttle_ms),
            config: config.clone(),
            inputs_adjusted,
        }
    }

    /// Press feedback for every touch target on the bubbling path
    pub fn on_pointer_down(&mut self, doc: &mut dyn Document, now: u64, target: ElementId) -> bool {
        let pressed = self.targets_on_path(doc, target);
        if pressed.is_empty() {
            return false;
        }
        for el in &pressed {
            doc.add_class(*el, "touching");
        }
        if doc.capabilities().vibration && self.haptics.try_pass(now) {
            doc.vibrate(self.config.haptic_pulse_ms);
        }
        true
    }

    /// Schedule `touching` removal for every touch target on the path
    pub fn on_pointer_up(&self, doc: &dyn Document, timers: &mut Timers, now: u64, target: ElementId) {
        for el in self.targets_on_path(doc, target) {
            timers.schedule(now, self.config.release_delay_ms, Task::ReleaseTouch { target: el });
        }
    }

    pub fn on_orientation_change(&self, timers: &mut Timers, now: u64) {
        timers.schedule(now, self.config.orientation_nudge_ms, Task::OrientationNudge);
    }

    pub fn inputs_adjusted(&self) -> usize {
        self.inputs_adjusted
    }

    fn targets_on_path(&self, doc: &dyn Document, target: ElementId) -> Vec<ElementId> {
        doc.ancestors_or_self(target)
            .into_iter()
            .filter(|el| self.touch_targets.contains(el))
            .collect()
    }
}

pub fn release_touch(doc: &mut dyn Document, target: ElementId) {
    doc.remove_class(target, "touching");
}

/// Scroll by one pixel to collapse mobile browser chrome after rotation
pub fn orientation_nudge(doc: &mut dyn Document) {
    doc.scroll_to(0.0, 1.0);
}

fn enhance_mobile_nav(doc: &mut dyn Document) {
    let Some(nav) = doc.query_first(MOBILE_NAV_SELECTOR) else {
        debug!("no mobile footer nav");
        return;
    };
    doc.add_class(nav, "mobile-nav-enhanced");
    for item in doc.query_all(MOBILE_NAV_ITEM_SELECTOR) {
        doc.add_class(item, "mobile-nav-item");
    }
    if doc.supports_css(SAFE_AREA_DECLARATION) {
        doc.set_style(nav, "padding-bottom", SAFE_AREA_PADDING);
    }
}

/// Raise inline font sizes below 16px (or missing) to 16px. Sizes in
/// units other than px are left alone.
fn enforce_input_font_floor(doc: &mut dyn Document) -> usize {
    let mut adjusted = 0;
    for input in doc.query_all(INPUT_SELECTOR) {
        let too_small = match doc.style(input, "font-size") {
            None => true,
            Some(size) => parse_px(&size).is_some_and(|px| px < MIN_INPUT_FONT_PX),
        };
        if too_small {
            doc.set_style(input, "font-size", "16px");
            adjusted += 1;
        }
    }
    adjusted
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}
