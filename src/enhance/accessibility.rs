//! Keyboard activation, fallback labels, live announcer and skip link

use super::{Task, Timers};
use crate::events::Handled;
use crate::host::{Document, ElementId};
use std::collections::HashSet;
use tracing::debug;

pub const KEYBOARD_SELECTOR: &str = ".nav-item, .btn, .mobile-nav-item";
pub const LIVE_REGION_ID: &str = "live-region";
pub const FALLBACK_BUTTON_LABEL: &str = "Interactive button";

const SKIP_LINK_HIDDEN_TOP: &str = "-40px";
const SKIP_LINK_SHOWN_TOP: &str = "6px";

/// Keys that activate a focused control
fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

#[derive(Debug, Default)]
pub struct AccessibilityAugmenter {
    keyboard_targets: HashSet<ElementId>,
    live_region: Option<ElementId>,
    skip_link: Option<ElementId>,
    labelled: usize,
}

impl AccessibilityAugmenter {
    pub fn install(doc: &mut dyn Document) -> Self {
        let mut augmenter = Self::default();

        for el in doc.query_all(KEYBOARD_SELECTOR) {
            doc.set_attribute(el, "tabindex", "0");
            augmenter.keyboard_targets.insert(el);
        }

        for btn in doc.query_all(".btn") {
            let has_label = doc
                .attribute(btn, "aria-label")
                .is_some_and(|label| !label.is_empty());
            if !has_label && doc.text_content(btn).trim().is_empty() {
                doc.set_attribute(btn, "aria-label", FALLBACK_BUTTON_LABEL);
                augmenter.labelled += 1;
            }
        }

        let Some(body) = doc.body() else {
            debug!("document has no body; skipping live region and skip link");
            return augmenter;
        };
        augmenter.live_region = Some(create_live_region(doc, body));
        augmenter.skip_link = Some(create_skip_link(doc, body));
        augmenter
    }

    /// Enter/Space on an enhanced control activates it and suppresses the
    /// default action
    pub fn on_key_down(&self, doc: &mut dyn Document, target: ElementId, key: &str) -> Handled {
        if !self.keyboard_targets.contains(&target) || !is_activation_key(key) {
            return Handled::No;
        }
        doc.click(target);
        Handled::Yes
    }

    pub fn on_focus(&self, doc: &mut dyn Document, target: ElementId) -> bool {
        self.move_skip_link(doc, target, SKIP_LINK_SHOWN_TOP)
    }

    pub fn on_blur(&self, doc: &mut dyn Document, target: ElementId) -> bool {
        self.move_skip_link(doc, target, SKIP_LINK_HIDDEN_TOP)
    }

    fn move_skip_link(&self, doc: &mut dyn Document, target: ElementId, top: &str) -> bool {
        if self.skip_link != Some(target) {
            return false;
        }
        doc.set_style(target, "top", top);
        true
    }

    pub fn live_region(&self) -> Option<ElementId> {
        self.live_region
    }

    pub fn skip_link(&self) -> Option<ElementId> {
        self.skip_link
    }

    /// Buttons that received the fallback label
    pub fn labelled_count(&self) -> usize {
        self.labelled
    }
}

fn create_live_region(doc: &mut dyn Document, body: ElementId) -> ElementId {
    let region = doc.create_element("div");
    doc.set_attribute(region, "aria-live", "polite");
    doc.set_attribute(region, "aria-atomic", "true");
    doc.set_style(region, "position", "absolute");
    doc.set_style(region, "left", "-10000px");
    doc.set_attribute(region, "id", LIVE_REGION_ID);
    doc.append_child(body, region);
    region
}

fn create_skip_link(doc: &mut dyn Document, body: ElementId) -> ElementId {
    let link = doc.create_element("a");
    doc.set_attribute(link, "href", "#main-content");
    doc.set_text_content(link, "Skip to main content");
    doc.add_class(link, "skip-link");
    for (property, value) in [
        ("position", "absolute"),
        ("top", SKIP_LINK_HIDDEN_TOP),
        ("left", "6px"),
        ("z-index", "10000"),
        ("background", "var(--primary-gold)"),
        ("color", "#000"),
        ("padding", "8px"),
        ("text-decoration", "none"),
        ("border-radius", "4px"),
    ] {
        doc.set_style(link, property, value);
    }
    doc.prepend_child(body, link);
    link
}

/// Put `message` in the live region and schedule it to be cleared.
/// Earlier clears stay scheduled, so back-to-back messages each produce
/// their own set and clear. Returns false when there is no live region.
pub fn announce(
    doc: &mut dyn Document,
    timers: &mut Timers,
    now: u64,
    message: &str,
    clear_delay_ms: u64,
) -> bool {
    let Some(region) = doc.element_by_id(LIVE_REGION_ID) else {
        debug!("announce skipped: no live region");
        return false;
    };
    doc.set_text_content(region, message);
    timers.schedule(now, clear_delay_ms, Task::ClearAnnouncement { region });
    true
}

pub fn clear_announcement(doc: &mut dyn Document, region: ElementId) {
    doc.set_text_content(region, "");
}
