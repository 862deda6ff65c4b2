//! Host document capability interface
//!
//! The engine never touches a real rendering environment. Everything it needs
//! from the page goes through [`Document`], so a browser binding, a headless
//! test double, or the bundled [`MemoryDocument`] can all host it.
//!
//! Every method must tolerate stale or unknown [`ElementId`]s by doing
//! nothing (or returning an empty/`None` answer). The engine relies on that
//! to turn "missing target" into a no-op instead of a failure.

pub mod memory;
pub mod selector;

pub use memory::{MemoryDocument, Mutation, MutationKind};

use serde::{Deserialize, Serialize};

/// Opaque handle to an element owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned box in document coordinates (logical px)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Optional platform features. A missing capability disables the matching
/// enhancement; nothing falls back to polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Viewport-intersection notifications
    pub intersection_observer: bool,
    /// Haptic feedback
    pub vibration: bool,
    /// Paint / input-delay performance entries
    pub performance_observer: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            vibration: false,
            performance_observer: true,
        }
    }
}

/// Parameters for viewport-intersection notifications
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityOptions {
    /// Fraction of the element box that must be visible (0.0 - 1.0)
    pub threshold: f64,
    /// Pixels trimmed off the bottom of the viewport before testing
    pub bottom_margin_px: f64,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin_px: 50.0,
        }
    }
}

impl VisibilityOptions {
    /// Visible fraction of `element` inside `viewport` after the bottom
    /// margin is trimmed. Both boxes use the same coordinate space.
    pub fn ratio(&self, element: Rect, viewport: Rect) -> f64 {
        let area = element.area();
        if area <= 0.0 {
            return 0.0;
        }
        let bottom = viewport.bottom() - self.bottom_margin_px;
        let width = element.right().min(viewport.right()) - element.x.max(viewport.x);
        let height = element.bottom().min(bottom) - element.y.max(viewport.y);
        if width <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        (width * height / area).clamp(0.0, 1.0)
    }
}

/// Document capability interface
///
/// Selectors follow CSS syntax; hosts are expected to support at least class,
/// tag, id and attribute selectors, compounds, descendant combinators and
/// comma-separated lists. Results are in document order.
pub trait Document {
    // ── Lookup ────────────────────────────────────────────────────────────

    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    /// Matches among the descendants of `root`
    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId>;

    fn query_first(&self, selector: &str) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    fn parent_element(&self, el: ElementId) -> Option<ElementId>;

    /// `el` followed by its ancestors, innermost first (event bubbling order)
    fn ancestors_or_self(&self, el: ElementId) -> Vec<ElementId> {
        let mut chain = vec![el];
        let mut cursor = el;
        while let Some(parent) = self.parent_element(cursor) {
            chain.push(parent);
            cursor = parent;
        }
        chain
    }

    fn body(&self) -> Option<ElementId>;

    fn head(&self) -> Option<ElementId>;

    // ── Classes, styles, attributes, text ────────────────────────────────

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn add_class(&mut self, el: ElementId, class: &str);

    fn remove_class(&mut self, el: ElementId, class: &str);

    fn style(&self, el: ElementId, property: &str) -> Option<String>;

    fn set_style(&mut self, el: ElementId, property: &str, value: &str);

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    fn text_content(&self, el: ElementId) -> String;

    fn set_text_content(&mut self, el: ElementId, text: &str);

    fn set_inner_html(&mut self, el: ElementId, html: &str);

    // ── Tree mutation ─────────────────────────────────────────────────────

    fn create_element(&mut self, tag: &str) -> ElementId;

    fn append_child(&mut self, parent: ElementId, child: ElementId);

    /// Insert `child` as the first child of `parent`
    fn prepend_child(&mut self, parent: ElementId, child: ElementId);

    fn remove(&mut self, el: ElementId);

    /// Dispatch a primary activation (synthetic click) on `el`
    fn click(&mut self, el: ElementId);

    // ── Geometry and viewport ─────────────────────────────────────────────

    /// Element box relative to the viewport, if laid out
    fn bounding_rect(&self, el: ElementId) -> Option<Rect>;

    fn scroll_y(&self) -> f64;

    fn scroll_to(&mut self, x: f64, y: f64);

    fn viewport_width(&self) -> f64;

    // ── Environment ───────────────────────────────────────────────────────

    fn capabilities(&self) -> Capabilities;

    /// Whether a CSS declaration such as `padding-bottom: env(...)` is supported
    fn supports_css(&self, declaration: &str) -> bool;

    fn prefers_reduced_motion(&self) -> bool;

    /// Pulse haptic feedback. Returns false if the host cannot vibrate.
    fn vibrate(&mut self, duration_ms: u32) -> bool;

    /// Start delivering intersection events for `el`
    fn observe_visibility(&mut self, el: ElementId, options: VisibilityOptions);

    fn unobserve_visibility(&mut self, el: ElementId);

    /// Called whenever the engine clock moves, before any handler runs.
    /// Hosts that timestamp their own records can follow along.
    fn sync_clock(&mut self, _now_ms: u64) {}
}
