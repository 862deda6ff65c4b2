//! In-memory document
//!
//! A small element tree that implements [`Document`] without a rendering
//! environment. Tests and the `replay` command use it to drive the engine
//! with deterministic event traces and then inspect what changed.
//!
//! Setup helpers (`add_element`, `seed_*`, `set_layout`) are not recorded.
//! Everything the engine does through the [`Document`] trait is appended to
//! an ordered mutation log stamped with the virtual clock.

use super::selector::{ElementView, SelectorList};
use super::{Capabilities, Document, ElementId, Rect, VisibilityOptions};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

/// One recorded change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutation {
    pub at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementId>,
    #[serde(flatten)]
    pub kind: MutationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationKind {
    AddClass { class: String },
    RemoveClass { class: String },
    SetStyle { property: String, value: String },
    SetAttribute { name: String, value: String },
    SetText { text: String },
    SetInnerHtml { html: String },
    Create { tag: String },
    Append { parent: ElementId },
    Prepend { parent: ElementId },
    Remove,
    Click,
    ScrollTo { x: f64, y: f64 },
    Vibrate { ms: u32 },
    Observe,
    Unobserve,
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    inner_html: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    layout: Option<Rect>,
    removed: bool,
}

/// Element tree plus the environment a page would see
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: ElementId,
    head: ElementId,
    body: ElementId,
    viewport_width: f64,
    viewport_height: f64,
    scroll: (f64, f64),
    capabilities: Capabilities,
    css_support: HashSet<String>,
    reduced_motion: bool,
    observed: BTreeMap<ElementId, VisibilityOptions>,
    clock_ms: u64,
    log: Vec<Mutation>,
}

impl MemoryDocument {
    /// Empty `html > head + body` document with a 1280x800 viewport
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: ElementId(0),
            head: ElementId(0),
            body: ElementId(0),
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll: (0.0, 0.0),
            capabilities: Capabilities::default(),
            css_support: HashSet::new(),
            reduced_motion: false,
            observed: BTreeMap::new(),
            clock_ms: 0,
            log: Vec::new(),
        };
        doc.root = doc.push_node("html", None);
        doc.head = doc.push_node("head", Some(doc.root));
        doc.body = doc.push_node("body", Some(doc.root));
        doc
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.set_viewport(width, height);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    // ── Setup (not recorded) ──────────────────────────────────────────────

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    pub fn set_reduced_motion(&mut self, reduce: bool) {
        self.reduced_motion = reduce;
    }

    /// Declare a CSS declaration as supported (`supports_css` answers true)
    pub fn support_css(&mut self, declaration: &str) {
        self.css_support.insert(normalize_declaration(declaration));
    }

    /// Move the scroll position without recording a mutation (user scrolling)
    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll.1 = y;
    }

    /// Append a new element under `parent`
    pub fn add_element(&mut self, parent: ElementId, tag: &str, classes: &[&str]) -> ElementId {
        let id = self.push_node(tag, Some(parent));
        if let Some(node) = self.node_mut(id) {
            node.classes = classes.iter().map(|c| c.to_string()).collect();
        }
        id
    }

    pub fn seed_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn seed_text(&mut self, el: ElementId, text: &str) {
        if let Some(node) = self.node_mut(el) {
            node.text = text.to_string();
        }
    }

    pub fn seed_style(&mut self, el: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(el) {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    /// Give an element a box in document coordinates
    pub fn set_layout(&mut self, el: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(el) {
            node.layout = Some(rect);
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.node(el).map(|n| n.classes.clone()).unwrap_or_default()
    }

    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).and_then(|n| n.parent)
    }

    pub fn tag(&self, el: ElementId) -> Option<&str> {
        self.node(el).map(|n| n.tag.as_str())
    }

    pub fn inner_html(&self, el: ElementId) -> Option<&str> {
        self.node(el).and_then(|n| n.inner_html.as_deref())
    }

    pub fn is_attached(&self, el: ElementId) -> bool {
        self.node(el).is_some()
    }

    pub fn is_observed(&self, el: ElementId) -> bool {
        self.observed.contains_key(&el)
    }

    pub fn observed(&self) -> Vec<ElementId> {
        self.observed.keys().copied().collect()
    }

    /// Number of recorded mutations matching `predicate`
    pub fn count_mutations(&self, predicate: impl Fn(&Mutation) -> bool) -> usize {
        self.log.iter().filter(|m| predicate(m)).count()
    }

    /// Observed elements that currently meet their visibility threshold,
    /// paired with their intersection ratio, in element order
    pub fn intersections(&self) -> Vec<(ElementId, f64)> {
        let viewport = Rect::new(
            self.scroll.0,
            self.scroll.1,
            self.viewport_width,
            self.viewport_height,
        );
        self.observed
            .iter()
            .filter_map(|(&el, options)| {
                let layout = self.node(el)?.layout?;
                let ratio = options.ratio(layout, viewport);
                (ratio > 0.0 && ratio >= options.threshold).then_some((el, ratio))
            })
            .collect()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn push_node(&mut self, tag: &str, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            parent,
            ..Node::default()
        });
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.index()).filter(|n| !n.removed)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(el.index()).filter(|n| !n.removed)
    }

    fn record(&mut self, element: Option<ElementId>, kind: MutationKind) {
        self.log.push(Mutation {
            at_ms: self.clock_ms,
            element,
            kind,
        });
    }

    fn detach(&mut self, el: ElementId) {
        let Some(parent) = self.node(el).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = self.node_mut(parent) {
            parent.children.retain(|c| *c != el);
        }
        if let Some(node) = self.node_mut(el) {
            node.parent = None;
        }
    }

    fn clear_children(&mut self, el: ElementId) {
        let children = self.children(el);
        for child in children {
            self.mark_removed(child);
        }
        if let Some(node) = self.node_mut(el) {
            node.children.clear();
        }
    }

    fn mark_removed(&mut self, el: ElementId) {
        for child in self.children(el) {
            self.mark_removed(child);
        }
        self.observed.remove(&el);
        if let Some(node) = self.nodes.get_mut(el.index()) {
            node.removed = true;
        }
    }

    /// Preorder walk of the subtree under `root` (excluding `root`)
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(self.children(el).into_iter().rev());
        }
        out
    }

    fn is_connected(&self, el: ElementId) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn select(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|el| list.matches(self, *el))
            .collect()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementView for MemoryDocument {
    fn tag_name(&self, el: ElementId) -> Option<&str> {
        self.tag(el)
    }

    fn has_class_name(&self, el: ElementId, class: &str) -> bool {
        self.node(el)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn attribute_value(&self, el: ElementId, name: &str) -> Option<&str> {
        self.node(el)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    fn parent_of(&self, el: ElementId) -> Option<ElementId> {
        self.parent(el)
    }
}

impl Document for MemoryDocument {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        self.select(self.root, selector)
    }

    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        if self.node(root).is_none() {
            return Vec::new();
        }
        self.select(root, selector)
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .find(|el| self.attribute_value(*el, "id") == Some(id))
    }

    fn parent_element(&self, el: ElementId) -> Option<ElementId> {
        self.parent(el)
    }

    fn body(&self) -> Option<ElementId> {
        Some(self.body)
    }

    fn head(&self) -> Option<ElementId> {
        Some(self.head)
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.has_class_name(el, class)
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        if node.classes.iter().any(|c| c == class) {
            return;
        }
        node.classes.push(class.to_string());
        self.record(
            Some(el),
            MutationKind::AddClass {
                class: class.to_string(),
            },
        );
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        if node.classes.len() != before {
            self.record(
                Some(el),
                MutationKind::RemoveClass {
                    class: class.to_string(),
                },
            );
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.node(el).and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        node.styles.insert(property.to_string(), value.to_string());
        self.record(
            Some(el),
            MutationKind::SetStyle {
                property: property.to_string(),
                value: value.to_string(),
            },
        );
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.attribute_value(el, name).map(str::to_string)
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        node.attributes.insert(name.to_string(), value.to_string());
        self.record(
            Some(el),
            MutationKind::SetAttribute {
                name: name.to_string(),
                value: value.to_string(),
            },
        );
    }

    fn text_content(&self, el: ElementId) -> String {
        let Some(node) = self.node(el) else {
            return String::new();
        };
        let mut text = node.text.clone();
        for child in self.descendants(el) {
            if let Some(child) = self.node(child) {
                text.push_str(&child.text);
            }
        }
        text
    }

    fn set_text_content(&mut self, el: ElementId, text: &str) {
        if self.node(el).is_none() {
            return;
        }
        self.clear_children(el);
        if let Some(node) = self.node_mut(el) {
            node.text = text.to_string();
            node.inner_html = None;
        }
        self.record(
            Some(el),
            MutationKind::SetText {
                text: text.to_string(),
            },
        );
    }

    fn set_inner_html(&mut self, el: ElementId, html: &str) {
        if self.node(el).is_none() {
            return;
        }
        self.clear_children(el);
        if let Some(node) = self.node_mut(el) {
            node.text = strip_tags(html);
            node.inner_html = Some(html.to_string());
        }
        self.record(
            Some(el),
            MutationKind::SetInnerHtml {
                html: html.to_string(),
            },
        );
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        let id = self.push_node(tag, None);
        self.record(
            Some(id),
            MutationKind::Create {
                tag: tag.to_ascii_lowercase(),
            },
        );
        id
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        self.record(Some(child), MutationKind::Append { parent });
    }

    fn prepend_child(&mut self, parent: ElementId, child: ElementId) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(0, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        self.record(Some(child), MutationKind::Prepend { parent });
    }

    fn remove(&mut self, el: ElementId) {
        if self.node(el).is_none() || el == self.root {
            return;
        }
        self.detach(el);
        self.mark_removed(el);
        self.record(Some(el), MutationKind::Remove);
    }

    fn click(&mut self, el: ElementId) {
        if self.node(el).is_some() {
            self.record(Some(el), MutationKind::Click);
        }
    }

    fn bounding_rect(&self, el: ElementId) -> Option<Rect> {
        if !self.is_connected(el) {
            return None;
        }
        let layout = self.node(el)?.layout?;
        Some(Rect::new(
            layout.x - self.scroll.0,
            layout.y - self.scroll.1,
            layout.width,
            layout.height,
        ))
    }

    fn scroll_y(&self) -> f64 {
        self.scroll.1
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = (x, y);
        self.record(None, MutationKind::ScrollTo { x, y });
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn supports_css(&self, declaration: &str) -> bool {
        self.css_support
            .contains(&normalize_declaration(declaration))
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn vibrate(&mut self, duration_ms: u32) -> bool {
        if !self.capabilities.vibration {
            return false;
        }
        self.record(None, MutationKind::Vibrate { ms: duration_ms });
        true
    }

    fn observe_visibility(&mut self, el: ElementId, options: VisibilityOptions) {
        if self.node(el).is_none() || !self.capabilities.intersection_observer {
            return;
        }
        self.observed.insert(el, options);
        self.record(Some(el), MutationKind::Observe);
    }

    fn unobserve_visibility(&mut self, el: ElementId) {
        if self.observed.remove(&el).is_some() {
            self.record(Some(el), MutationKind::Unobserve);
        }
    }

    fn sync_clock(&mut self, now_ms: u64) {
        self.clock_ms = now_ms;
    }
}

fn normalize_declaration(declaration: &str) -> String {
    declaration.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_tags(html: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
    tags.replace_all(html, "").trim().to_string()
}

/// Class names currently present on `el`, as a set (test convenience)
pub fn class_set(doc: &MemoryDocument, el: ElementId) -> BTreeSet<String> {
    doc.classes(el).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MemoryDocument, ElementId, ElementId, ElementId) {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let nav = doc.add_element(body, "nav", &["main-nav"]);
        let link = doc.add_element(nav, "a", &["nav-item"]);
        let form = doc.add_element(body, "form", &[]);
        (doc, nav, link, form)
    }

    #[test]
    fn test_query_in_document_order() {
        let (mut doc, nav, link, _) = page();
        let body = doc.body().unwrap();
        let late = doc.add_element(body, "div", &["nav-item"]);

        assert_eq!(doc.query_all(".nav-item"), vec![link, late]);
        assert_eq!(doc.query_all(".main-nav a"), vec![link]);
        assert_eq!(doc.query_within(nav, ".nav-item"), vec![link]);
    }

    #[test]
    fn test_add_class_records_only_changes() {
        let (mut doc, nav, _, _) = page();
        doc.add_class(nav, "scrolled");
        doc.add_class(nav, "scrolled");
        doc.remove_class(nav, "missing");

        assert_eq!(doc.log().len(), 1);
        assert!(doc.has_class(nav, "scrolled"));
    }

    #[test]
    fn test_removed_elements_are_inert() {
        let (mut doc, nav, link, _) = page();
        doc.remove(nav);

        assert!(doc.query_all(".nav-item").is_empty());
        doc.add_class(link, "x");
        assert!(!doc.has_class(link, "x"));
        assert_eq!(doc.text_content(link), "");
    }

    #[test]
    fn test_prepend_and_element_by_id() {
        let (mut doc, nav, _, _) = page();
        let body = doc.body().unwrap();
        let skip = doc.create_element("a");
        doc.set_attribute(skip, "id", "skip");
        doc.prepend_child(body, skip);

        assert_eq!(doc.children(body)[0], skip);
        assert_eq!(doc.children(body)[1], nav);
        assert_eq!(doc.element_by_id("skip"), Some(skip));
    }

    #[test]
    fn test_inner_html_replaces_text() {
        let (mut doc, _, _, form) = page();
        doc.set_inner_html(form, r#"<div class="spinner"></div> Loading..."#);

        assert_eq!(doc.text_content(form), "Loading...");
        assert!(doc.inner_html(form).unwrap().contains("spinner"));
    }

    #[test]
    fn test_bounding_rect_is_viewport_relative() {
        let (mut doc, nav, _, _) = page();
        doc.set_layout(nav, Rect::new(0.0, 500.0, 100.0, 40.0));
        doc.set_scroll_y(200.0);

        assert_eq!(doc.bounding_rect(nav), Some(Rect::new(0.0, 300.0, 100.0, 40.0)));
        let detached = doc.create_element("span");
        assert_eq!(doc.bounding_rect(detached), None);
    }

    #[test]
    fn test_intersections_respect_bottom_margin() {
        let mut doc = MemoryDocument::new().with_viewport(400.0, 800.0);
        let body = doc.body().unwrap();
        let card = doc.add_element(body, "div", &["card"]);
        // Box starts 30px above the viewport bottom: inside the 50px margin
        doc.set_layout(card, Rect::new(0.0, 770.0, 400.0, 100.0));
        doc.observe_visibility(card, VisibilityOptions::default());
        assert!(doc.intersections().is_empty());

        doc.set_scroll_y(100.0);
        let hits = doc.intersections();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, card);
    }

    #[test]
    fn test_capabilities_gate_vibration_and_observation() {
        let (mut doc, nav, _, _) = page();
        assert!(!doc.vibrate(10));

        doc.set_capabilities(Capabilities {
            intersection_observer: false,
            vibration: true,
            performance_observer: false,
        });
        assert!(doc.vibrate(10));
        doc.observe_visibility(nav, VisibilityOptions::default());
        assert!(!doc.is_observed(nav));
    }

    #[test]
    fn test_supports_css_normalizes_whitespace() {
        let mut doc = MemoryDocument::new();
        doc.support_css("padding-bottom:  env(safe-area-inset-bottom)");
        assert!(doc.supports_css("padding-bottom: env(safe-area-inset-bottom)"));
        assert!(!doc.supports_css("display: grid"));
    }
}
