//! Header scroll-state machine
//!
//! The transition function is pure: given the previous state and a scroll
//! offset it returns the next state and what should change on the page.
//! [`NavigationController`] debounces scroll events and applies transitions.

use super::{Task, Timers};
use crate::config::NavigationConfig;
use crate::host::{Document, ElementId};
use crate::util::{Debouncer, TimerId};
use serde::Serialize;
use tracing::debug;

pub const HEADER_SELECTOR: &str = ".main-header";
pub const NAV_LINK_SELECTOR: &str = ".main-nav a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavVisibility {
    Visible,
    Hidden,
}

impl NavVisibility {
    fn transform(self) -> &'static str {
        match self {
            Self::Visible => "translateY(0)",
            Self::Hidden => "translateY(-100%)",
        }
    }
}

/// What one handler invocation changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavTransition {
    /// Whether the header should carry `scrolled`
    pub scrolled: bool,
    /// New visibility, if it changed
    pub visibility: Option<NavVisibility>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollState {
    pub last_y: f64,
    pub visibility: NavVisibility,
    pub scrolled: bool,
}

impl ScrollState {
    pub fn new(initial_y: f64) -> Self {
        Self {
            last_y: initial_y,
            visibility: NavVisibility::Visible,
            scrolled: false,
        }
    }

    /// Advance to scroll offset `y`
    ///
    /// Visibility only changes on mobile: hide when moving down past the
    /// hide threshold, otherwise show a hidden header. An unchanged offset
    /// counts as not moving down.
    pub fn step(&mut self, y: f64, is_mobile: bool, config: &NavigationConfig) -> NavTransition {
        let scrolled = y > config.scrolled_threshold;

        let visibility = if !is_mobile {
            None
        } else if y > self.last_y
            && y > config.hide_threshold
            && self.visibility == NavVisibility::Visible
        {
            Some(NavVisibility::Hidden)
        } else if y <= self.last_y && self.visibility == NavVisibility::Hidden {
            Some(NavVisibility::Visible)
        } else {
            None
        };

        self.scrolled = scrolled;
        if let Some(v) = visibility {
            self.visibility = v;
        }
        self.last_y = y;

        NavTransition {
            scrolled,
            visibility,
        }
    }
}

/// Debounced header controller. Only exists when the page has a header.
#[derive(Debug)]
pub struct NavigationController {
    header: ElementId,
    state: ScrollState,
    debounce: Debouncer,
    is_mobile: bool,
    config: NavigationConfig,
}

impl NavigationController {
    pub fn new(doc: &dyn Document, config: &NavigationConfig, is_mobile: bool) -> Option<Self> {
        let header = doc.query_first(HEADER_SELECTOR)?;
        Some(Self {
            header,
            state: ScrollState::new(doc.scroll_y()),
            debounce: Debouncer::new(config.debounce_ms),
            is_mobile,
            config: config.clone(),
        })
    }

    pub fn header(&self) -> ElementId {
        self.header
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// (Re)arm the debounce timer
    pub fn on_scroll(&mut self, timers: &mut Timers, now: u64) {
        self.debounce.call(timers, now, Task::NavigationScroll);
    }

    /// Debounce timer fired. Stale timers are ignored.
    pub fn on_timer(&mut self, id: TimerId, doc: &mut dyn Document) -> Option<NavTransition> {
        if !self.debounce.fired(id) {
            return None;
        }
        let y = doc.scroll_y();
        let transition = self.state.step(y, self.is_mobile, &self.config);
        self.apply(doc, transition);
        Some(transition)
    }

    fn apply(&self, doc: &mut dyn Document, transition: NavTransition) {
        if transition.scrolled {
            doc.add_class(self.header, "nav-enhanced");
            doc.add_class(self.header, "scrolled");
        } else {
            doc.remove_class(self.header, "scrolled");
        }
        if let Some(visibility) = transition.visibility {
            debug!(?visibility, y = self.state.last_y, "header visibility changed");
            doc.set_style(self.header, "transform", visibility.transform());
        }
    }
}

/// Mark primary navigation links. Returns them so the caller can wire
/// ripple feedback.
pub fn enhance_nav_links(doc: &mut dyn Document) -> Vec<ElementId> {
    let links = doc.query_all(NAV_LINK_SELECTOR);
    for link in &links {
        doc.add_class(*link, "nav-item-enhanced");
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::util::TimerQueue;

    fn trace(ys: &[f64], is_mobile: bool) -> Vec<ScrollState> {
        let config = NavigationConfig::default();
        let mut state = ScrollState::new(0.0);
        ys.iter()
            .map(|y| {
                state.step(*y, is_mobile, &config);
                state
            })
            .collect()
    }

    #[test]
    fn test_mobile_trace_hides_then_shows() {
        let states = trace(&[0.0, 120.0, 130.0, 90.0], true);
        let visibility: Vec<_> = states.iter().map(|s| s.visibility).collect();
        assert_eq!(
            visibility,
            vec![
                NavVisibility::Visible,
                NavVisibility::Hidden,
                NavVisibility::Hidden,
                NavVisibility::Visible,
            ]
        );
    }

    #[test]
    fn test_desktop_trace_only_tracks_scrolled() {
        let states = trace(&[0.0, 120.0, 130.0, 90.0], false);
        assert!(states.iter().all(|s| s.visibility == NavVisibility::Visible));
        let scrolled: Vec<_> = states.iter().map(|s| s.scrolled).collect();
        assert_eq!(scrolled, vec![false, true, true, true]);
    }

    #[test]
    fn test_unchanged_offset_shows_hidden_header() {
        let config = NavigationConfig::default();
        let mut state = ScrollState::new(0.0);
        state.step(150.0, true, &config);
        assert_eq!(state.visibility, NavVisibility::Hidden);

        let t = state.step(150.0, true, &config);
        assert_eq!(t.visibility, Some(NavVisibility::Visible));
        assert_eq!(state.visibility, NavVisibility::Visible);

        // Already visible: a repeated offset is not a transition
        let t = state.step(150.0, true, &config);
        assert_eq!(t.visibility, None);
    }

    #[test]
    fn test_shallow_downward_scroll_keeps_header() {
        let config = NavigationConfig::default();
        let mut state = ScrollState::new(0.0);
        let t = state.step(80.0, true, &config);
        assert_eq!(t.visibility, None);
        assert!(t.scrolled);
    }

    #[test]
    fn test_controller_debounces_and_applies() {
        let mut doc = MemoryDocument::new().with_viewport(400.0, 800.0);
        let body = doc.body().unwrap();
        let header = doc.add_element(body, "header", &["main-header"]);
        let mut timers: Timers = TimerQueue::new();
        let mut nav = NavigationController::new(&doc, &NavigationConfig::default(), true).unwrap();

        for (now, y) in [(0, 40.0), (3, 90.0), (6, 140.0)] {
            doc.set_scroll_y(y);
            nav.on_scroll(&mut timers, now);
        }
        assert_eq!(timers.len(), 1);

        let (due, id, task) = timers.pop_due(100).unwrap();
        assert_eq!(due, 16);
        assert_eq!(task, Task::NavigationScroll);
        let transition = nav.on_timer(id, &mut doc).unwrap();

        assert_eq!(transition.visibility, Some(NavVisibility::Hidden));
        assert!(doc.has_class(header, "scrolled"));
        assert!(doc.has_class(header, "nav-enhanced"));
        assert_eq!(doc.style(header, "transform").as_deref(), Some("translateY(-100%)"));
    }

    #[test]
    fn test_no_header_no_controller() {
        let doc = MemoryDocument::new();
        assert!(NavigationController::new(&doc, &NavigationConfig::default(), true).is_none());
    }

    #[test]
    fn test_nav_links_marked() {
        let mut doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let nav = doc.add_element(body, "nav", &["main-nav"]);
        let link = doc.add_element(nav, "a", &[]);
        let other = doc.add_element(body, "a", &[]);

        assert_eq!(enhance_nav_links(&mut doc), vec![link]);
        assert!(doc.has_class(link, "nav-item-enhanced"));
        assert!(!doc.has_class(other, "nav-item-enhanced"));
    }
}
