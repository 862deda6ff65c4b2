//! Buttons, ripple feedback, form styling, loading state and tooltips

use super::{Task, Timers};
use crate::config::{ButtonsConfig, FlairMode};
use crate::host::{Document, ElementId, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const BUTTON_SELECTOR: &str = ".btn";
pub const FORM_GROUP_SELECTOR: &str = ".form-group";
pub const CONTROL_SELECTOR: &str = "input, select, textarea";
pub const SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;
pub const TOOLTIP_SELECTOR: &str = "[data-tooltip]";

/// How long a ripple stays in the document
pub const RIPPLE_LIFETIME_MS: u64 = 600;

pub const LOADING_MARKUP: &str = r#"<div class="loading-enhanced"></div> Loading..."#;

// ─────────────────────────────────────────────────────────────────────────────
// Ripple
// ─────────────────────────────────────────────────────────────────────────────

/// Ripple square for a click at viewport point (`x`, `y`) on a box
/// `rect`: returns (size, left, top) relative to the box
pub fn ripple_geometry(rect: Rect, x: f64, y: f64) -> (f64, f64, f64) {
    let size = rect.width.max(rect.height);
    (size, x - rect.x - size / 2.0, y - rect.y - size / 2.0)
}

/// Elements that spawn a ripple when clicked
#[derive(Debug, Default)]
pub struct RippleFeedback {
    targets: HashSet<ElementId>,
}

impl RippleFeedback {
    pub fn attach(&mut self, el: ElementId) {
        self.targets.insert(el);
    }

    pub fn is_attached(&self, el: ElementId) -> bool {
        self.targets.contains(&el)
    }

    /// Click bubbling from `target`: every attached element on the path
    /// gets its own ripple. Returns the ripple elements created.
    pub fn on_click(
        &self,
        doc: &mut dyn Document,
        timers: &mut Timers,
        now: u64,
        target: ElementId,
        x: f64,
        y: f64,
    ) -> Vec<ElementId> {
        doc.ancestors_or_self(target)
            .into_iter()
            .filter(|el| self.targets.contains(el))
            .filter_map(|host| spawn_ripple(doc, timers, now, host, x, y))
            .collect()
    }
}

fn spawn_ripple(
    doc: &mut dyn Document,
    timers: &mut Timers,
    now: u64,
    host: ElementId,
    x: f64,
    y: f64,
) -> Option<ElementId> {
    let Some(rect) = doc.bounding_rect(host) else {
        debug!(host = host.0, "ripple skipped: element has no layout");
        return None;
    };
    let (size, left, top) = ripple_geometry(rect, x, y);

    let ripple = doc.create_element("span");
    doc.set_style(ripple, "width", &px(size));
    doc.set_style(ripple, "height", &px(size));
    doc.set_style(ripple, "left", &px(left));
    doc.set_style(ripple, "top", &px(top));
    doc.add_class(ripple, "ripple");
    doc.append_child(host, ripple);

    timers.schedule(now, RIPPLE_LIFETIME_MS, Task::RemoveRipple { ripple });
    Some(ripple)
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Button flair
// ─────────────────────────────────────────────────────────────────────────────

/// Decide the flair class (if any) for `count` buttons in document order
pub fn choose_flair(config: &ButtonsConfig, count: usize) -> Vec<Option<String>> {
    match &config.flair {
        FlairMode::Off => vec![None; count],
        FlairMode::Random => roll_flair(&mut rand::thread_rng(), config, count),
        FlairMode::Seeded { seed } => roll_flair(&mut StdRng::seed_from_u64(*seed), config, count),
        FlairMode::Explicit(assignments) => (0..count)
            .map(|i| assignments.get(i).filter(|class| !class.is_empty()).cloned())
            .collect(),
    }
}

fn roll_flair(rng: &mut impl Rng, config: &ButtonsConfig, count: usize) -> Vec<Option<String>> {
    (0..count)
        .map(|_| {
            if config.variants.is_empty() || !rng.gen_bool(config.probability.clamp(0.0, 1.0)) {
                return None;
            }
            let pick = rng.gen_range(0..config.variants.len());
            Some(config.variants[pick].clone())
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Enhancer
// ─────────────────────────────────────────────────────────────────────────────

/// Button, form and tooltip enhancements
#[derive(Debug, Default)]
pub struct InteractionEnhancer {
    /// control -> its `.form-group`
    focus_groups: HashMap<ElementId, ElementId>,
    forms: HashSet<ElementId>,
    buttons: usize,
    flaired: usize,
}

impl InteractionEnhancer {
    pub fn install(doc: &mut dyn Document, config: &ButtonsConfig, ripple: &mut RippleFeedback) -> Self {
        let mut enhancer = Self::default();

        let buttons = doc.query_all(BUTTON_SELECTOR);
        let flair = choose_flair(config, buttons.len());
        for (btn, flair) in buttons.iter().zip(flair) {
            doc.add_class(*btn, "btn-enhanced");
            ripple.attach(*btn);
            if let Some(class) = flair {
                doc.add_class(*btn, &class);
                enhancer.flaired += 1;
            }
        }
        enhancer.buttons = buttons.len();

        for group in doc.query_all(FORM_GROUP_SELECTOR) {
            doc.add_class(group, "form-group-enhanced");
            let control = doc.query_within(group, CONTROL_SELECTOR).into_iter().next();
            let label = doc.query_within(group, "label").into_iter().next();
            if let (Some(control), Some(label)) = (control, label) {
                doc.add_class(control, "form-control-enhanced");
                doc.add_class(label, "form-label-enhanced");
                enhancer.focus_groups.insert(control, group);
            }
        }

        enhancer.forms = doc.query_all("form").into_iter().collect();

        for el in doc.query_all(TOOLTIP_SELECTOR) {
            doc.add_class(el, "tooltip-enhanced");
        }

        enhancer
    }

    pub fn on_focus(&self, doc: &mut dyn Document, target: ElementId) -> bool {
        let Some(group) = self.focus_groups.get(&target) else {
            return false;
        };
        doc.add_class(*group, "focused");
        true
    }

    pub fn on_blur(&self, doc: &mut dyn Document, target: ElementId) -> bool {
        let Some(group) = self.focus_groups.get(&target) else {
            return false;
        };
        doc.remove_class(*group, "focused");
        true
    }

    /// Put the form's submit button into its loading state. Returns the
    /// button, if the form has one.
    pub fn on_submit(&self, doc: &mut dyn Document, form: ElementId) -> Option<ElementId> {
        if !self.forms.contains(&form) {
            return None;
        }
        let button = doc.query_within(form, SUBMIT_SELECTOR).into_iter().next()?;
        doc.add_class(button, "loading");
        doc.set_inner_html(button, LOADING_MARKUP);
        Some(button)
    }

    pub fn button_count(&self) -> usize {
        self.buttons
    }

    pub fn flair_count(&self) -> usize {
        self.flaired
    }
}
