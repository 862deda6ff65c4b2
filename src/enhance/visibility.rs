//! Viewport-visibility notifier, scroll reveal and lazy images
//!
//! One watcher serves every "do this the first time it scrolls into view"
//! consumer. Callbacks are `FnOnce` and removed before they run, so a target
//! can never fire twice no matter how many notifications the host sends.

use crate::host::{Document, ElementId, VisibilityOptions};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Elements that receive staggered reveal classes, scanned in this order
pub const REVEAL_SELECTORS: [&str; 8] = [
    ".card",
    ".btn",
    ".form-group",
    ".nav-item",
    ".game-content-desktop",
    ".main-game-content-mobile",
    ".contact-info-sidebar",
    ".announcement-bar",
];

pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";

pub type VisibleCallback = Box<dyn FnOnce(&mut dyn Document, ElementId)>;

/// Shared first-visibility notifier
pub struct VisibilityWatcher {
    options: VisibilityOptions,
    pending: HashMap<ElementId, VisibleCallback>,
}

impl std::fmt::Debug for VisibilityWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityWatcher")
            .field("options", &self.options)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl VisibilityWatcher {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            pending: HashMap::new(),
        }
    }

    pub fn options(&self) -> VisibilityOptions {
        self.options
    }

    /// Run `on_first_visible` the first time `target` meets the threshold.
    /// Re-registering replaces the pending callback. Returns false (and
    /// registers nothing) when the host cannot report intersections.
    pub fn register<F>(&mut self, doc: &mut dyn Document, target: ElementId, on_first_visible: F) -> bool
    where
        F: FnOnce(&mut dyn Document, ElementId) + 'static,
    {
        if !doc.capabilities().intersection_observer {
            debug!(target = target.0, "intersection observer unavailable; not watching");
            return false;
        }
        self.pending.insert(target, Box::new(on_first_visible));
        doc.observe_visibility(target, self.options);
        true
    }

    /// Handle an intersection notification. Returns true if a callback ran.
    pub fn notify(&mut self, doc: &mut dyn Document, target: ElementId, ratio: f64) -> bool {
        if ratio <= 0.0 || ratio < self.options.threshold {
            return false;
        }
        let Some(callback) = self.pending.remove(&target) else {
            return false;
        };
        doc.unobserve_visibility(target);
        callback(doc, target);
        true
    }

    pub fn is_watching(&self, target: ElementId) -> bool {
        self.pending.contains_key(&target)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll reveal
// ─────────────────────────────────────────────────────────────────────────────

/// Entrance direction, cycled by match index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealVariant {
    Center,
    Left,
    Right,
}

impl RevealVariant {
    pub fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => Self::Center,
            1 => Self::Left,
            _ => Self::Right,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Center => "scroll-reveal",
            Self::Left => "scroll-reveal-left",
            Self::Right => "scroll-reveal-right",
        }
    }
}

/// One element scheduled for a reveal animation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementTarget {
    pub element: ElementId,
    pub variant: RevealVariant,
    pub delay_ms: u64,
}

impl EnhancementTarget {
    /// `animation-delay` value, e.g. "0.3s"
    pub fn delay_css(&self) -> String {
        format!("{}s", self.delay_ms as f64 / 1000.0)
    }
}

/// Plan reveal targets: per selector, in match order, index drives both
/// the variant and the stagger delay
pub fn scan_reveal_targets(doc: &dyn Document, stagger_ms: u64) -> Vec<EnhancementTarget> {
    REVEAL_SELECTORS
        .iter()
        .flat_map(|selector| {
            doc.query_all(selector)
                .into_iter()
                .enumerate()
                .map(|(index, element)| EnhancementTarget {
                    element,
                    variant: RevealVariant::for_index(index),
                    delay_ms: index as u64 * stagger_ms,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Apply reveal classes and start watching. Returns the number of targets
/// registered (zero when the host cannot report visibility, in which case
/// nothing is marked so content is never left hidden).
pub fn install_reveals(
    watcher: &mut VisibilityWatcher,
    doc: &mut dyn Document,
    targets: &[EnhancementTarget],
) -> usize {
    if !doc.capabilities().intersection_observer {
        debug!("scroll reveal skipped: no intersection observer");
        return 0;
    }
    let mut registered = 0;
    for target in targets {
        doc.set_style(target.element, "animation-delay", &target.delay_css());
        doc.add_class(target.element, target.variant.class_name());
        if watcher.register(doc, target.element, |doc, el| doc.add_class(el, "revealed")) {
            registered += 1;
        }
    }
    registered
}

// ─────────────────────────────────────────────────────────────────────────────
// Lazy images
// ─────────────────────────────────────────────────────────────────────────────

/// Watch every `img[data-src]`; on first visibility copy `data-src` into
/// `src` and fade it in
pub fn install_lazy_images(watcher: &mut VisibilityWatcher, doc: &mut dyn Document) -> usize {
    let images = doc.query_all(LAZY_IMAGE_SELECTOR);
    images
        .into_iter()
        .filter(|img| watcher.register(doc, *img, load_image))
        .count()
}

fn load_image(doc: &mut dyn Document, img: ElementId) {
    let Some(src) = doc.attribute(img, "data-src") else {
        return;
    };
    doc.set_attribute(img, "src", &src);
    doc.add_class(img, "fade-in");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Capabilities, MemoryDocument, MutationKind};

    fn cards(n: usize) -> (MemoryDocument, Vec<ElementId>) {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let cards = (0..n).map(|_| doc.add_element(body, "div", &["card"])).collect();
        (doc, cards)
    }

    #[test]
    fn test_reveal_fires_at_most_once() {
        let (mut doc, cards) = cards(1);
        let mut watcher = VisibilityWatcher::new(VisibilityOptions::default());
        let targets = scan_reveal_targets(&doc, 100);
        assert_eq!(install_reveals(&mut watcher, &mut doc, &targets), 1);

        assert!(watcher.notify(&mut doc, cards[0], 0.5));
        assert!(!watcher.notify(&mut doc, cards[0], 0.9));
        assert!(!watcher.notify(&mut doc, cards[0], 1.0));

        let reveals = doc.count_mutations(|m| {
            m.kind
                == MutationKind::AddClass {
                    class: "revealed".to_string(),
                }
        });
        assert_eq!(reveals, 1);
        assert!(!doc.is_observed(cards[0]));
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let (mut doc, cards) = cards(1);
        let mut watcher = VisibilityWatcher::new(VisibilityOptions::default());
        watcher.register(&mut doc, cards[0], |doc, el| doc.add_class(el, "seen"));

        assert!(!watcher.notify(&mut doc, cards[0], 0.05));
        assert!(watcher.is_watching(cards[0]));
        assert!(watcher.notify(&mut doc, cards[0], 0.1));
        assert!(doc.has_class(cards[0], "seen"));
    }

    #[test]
    fn test_variants_and_stagger_follow_match_index() {
        let (mut doc, cards) = cards(4);
        let body = doc.body().unwrap();
        let btn = doc.add_element(body, "button", &["btn"]);

        let targets = scan_reveal_targets(&doc, 100);
        assert_eq!(targets.len(), 5);

        let variants: Vec<_> = targets.iter().map(|t| t.variant).collect();
        assert_eq!(
            variants,
            vec![
                RevealVariant::Center,
                RevealVariant::Left,
                RevealVariant::Right,
                RevealVariant::Center,
                RevealVariant::Center,
            ]
        );
        assert_eq!(targets[3].element, cards[3]);
        assert_eq!(targets[3].delay_css(), "0.3s");
        // Index restarts for each selector
        assert_eq!(targets[4].element, btn);
        assert_eq!(targets[4].delay_css(), "0s");
    }

    #[test]
    fn test_reveal_classes_and_delay_written() {
        let (mut doc, cards) = cards(2);
        let mut watcher = VisibilityWatcher::new(VisibilityOptions::default());
        let targets = scan_reveal_targets(&doc, 100);
        install_reveals(&mut watcher, &mut doc, &targets);

        assert!(doc.has_class(cards[0], "scroll-reveal"));
        assert!(doc.has_class(cards[1], "scroll-reveal-left"));
        assert_eq!(doc.style(cards[1], "animation-delay").as_deref(), Some("0.1s"));
    }

    #[test]
    fn test_no_observer_capability_leaves_page_untouched() {
        let (doc, cards) = cards(2);
        let mut doc = doc.with_capabilities(Capabilities {
            intersection_observer: false,
            ..Capabilities::default()
        });
        let mut watcher = VisibilityWatcher::new(VisibilityOptions::default());
        let targets = scan_reveal_targets(&doc, 100);

        assert_eq!(install_reveals(&mut watcher, &mut doc, &targets), 0);
        assert!(!doc.has_class(cards[0], "scroll-reveal"));
        assert!(doc.log().is_empty());
        assert_eq!(watcher.pending_count(), 0);
    }

    #[test]
    fn test_lazy_image_loads_on_first_visibility() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let img = doc.add_element(body, "img", &[]);
        doc.seed_attribute(img, "data-src", "/img/banner.webp");
        let eager = doc.add_element(body, "img", &[]);
        doc.seed_attribute(eager, "src", "/img/logo.png");

        let mut watcher = VisibilityWatcher::new(VisibilityOptions::default());
        assert_eq!(install_lazy_images(&mut watcher, &mut doc), 1);
        assert_eq!(doc.attribute(img, "src"), None);

        watcher.notify(&mut doc, img, 1.0);
        assert_eq!(doc.attribute(img, "src").as_deref(), Some("/img/banner.webp"));
        assert!(doc.has_class(img, "fade-in"));
    }
}
