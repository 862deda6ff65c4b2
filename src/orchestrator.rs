//! Orchestrator: builds every enhancement once and routes host input to it
//!
//! Construction runs the whole startup sequence against the document. After
//! that the host drives the engine through three entry points:
//!
//! - [`Orchestrator::handle_event`] for anything the page reports
//! - [`Orchestrator::advance_to`] to move the virtual clock and fire timers
//! - [`Orchestrator::render_frame`] once per display frame
//!
//! Nothing here returns an error. A missing element, capability or feature
//! simply leaves the matching enhancement out.

use crate::config::Config;
use crate::enhance::{
    accessibility, environment, mobile, navigation, styles, visibility, AccessibilityAugmenter,
    AnimationQueue, AnimationTask, GestureDetector, InteractionEnhancer, MobileEnhancer,
    NavigationController, ParallaxScroller, PerformanceMonitor, PerformanceSnapshot,
    RippleFeedback, ScrollState, Swipe, Task, Timers, VisibilityWatcher,
};
use crate::events::{Handled, HostEvent};
use crate::host::{Document, ElementId, VisibilityOptions};
use crate::util::{TimerId, TimerQueue};
use serde::Serialize;
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Startup report
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Installed and running
    Active,
    /// Turned off in `[features]`
    Disabled,
    /// Enabled, but this page or host cannot support it
    Skipped,
}

/// Activation result for one module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleStatus {
    pub name: &'static str,
    pub state: ModuleState,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StartupReport {
    pub viewport_width: f64,
    pub is_mobile: bool,
    pub modules: Vec<ModuleStatus>,
}

impl StartupReport {
    fn record(&mut self, name: &'static str, state: ModuleState, detail: impl Into<String>) {
        let detail = detail.into();
        debug!(module = name, ?state, %detail, "startup");
        self.modules.push(ModuleStatus {
            name,
            state,
            detail,
        });
    }

    fn disabled(&mut self, name: &'static str) {
        self.record(name, ModuleState::Disabled, "disabled in config");
    }

    pub fn module(&self, name: &str) -> Option<&ModuleStatus> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.module(name)
            .is_some_and(|m| m.state == ModuleState::Active)
    }
}

/// Running counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub events: u64,
    pub timers_fired: u64,
    pub frames_rendered: u64,
    pub swipes_left: u64,
    pub swipes_right: u64,
}

pub type SwipeHandler = Box<dyn FnMut(Swipe)>;

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

pub struct Orchestrator<D: Document> {
    doc: D,
    config: Config,
    now: u64,
    timers: Timers,
    watcher: VisibilityWatcher,
    ripple: RippleFeedback,
    parallax: Option<ParallaxScroller>,
    navigation: Option<NavigationController>,
    mobile: Option<MobileEnhancer>,
    gestures: Option<GestureDetector>,
    interactions: Option<InteractionEnhancer>,
    accessibility: Option<AccessibilityAugmenter>,
    animations: Option<AnimationQueue>,
    performance: Option<PerformanceMonitor>,
    tracks_reduced_motion: bool,
    swipe_handler: Option<SwipeHandler>,
    report: StartupReport,
    stats: EngineStats,
}

impl<D: Document> Orchestrator<D> {
    /// Run the startup sequence against `doc` at virtual time zero
    pub fn new(mut doc: D, config: Config) -> Self {
        let viewport_width = doc.viewport_width();
        let is_mobile = config.viewport.is_mobile(viewport_width);
        let caps = doc.capabilities();
        let features = config.features.clone();

        let mut report = StartupReport {
            viewport_width,
            is_mobile,
            modules: Vec::new(),
        };
        let mut ripple = RippleFeedback::default();
        let mut watcher = VisibilityWatcher::new(VisibilityOptions {
            threshold: config.reveal.threshold,
            bottom_margin_px: config.reveal.bottom_margin_px,
        });

        // Style block
        match styles::inject_styles(&mut doc) {
            Some(_) => report.record("styles", ModuleState::Active, "style block in head"),
            None => report.record("styles", ModuleState::Skipped, "no head element"),
        }

        // Scroll reveal
        if !features.reveal {
            report.disabled("reveal");
        } else if !caps.intersection_observer {
            report.record("reveal", ModuleState::Skipped, "no intersection observer");
        } else {
            let targets = visibility::scan_reveal_targets(&doc, config.reveal.stagger_ms);
            let count = visibility::install_reveals(&mut watcher, &mut doc, &targets);
            report.record("reveal", ModuleState::Active, format!("{} targets", count));
        }

        // Parallax
        let parallax = if !features.parallax {
            report.disabled("parallax");
            None
        } else if is_mobile {
            report.record("parallax", ModuleState::Skipped, "mobile viewport");
            None
        } else {
            report.record("parallax", ModuleState::Active, "header and layers");
            Some(ParallaxScroller::new(&config.parallax))
        };

        // Navigation
        let navigation = if !features.navigation {
            report.disabled("navigation");
            None
        } else {
            match NavigationController::new(&doc, &config.navigation, is_mobile) {
                Some(nav) => {
                    let links = navigation::enhance_nav_links(&mut doc);
                    for link in &links {
                        ripple.attach(*link);
                    }
                    report.record(
                        "navigation",
                        ModuleState::Active,
                        format!("header + {} links", links.len()),
                    );
                    Some(nav)
                }
                None => {
                    report.record("navigation", ModuleState::Skipped, "no .main-header");
                    None
                }
            }
        };

        // Mobile enhancements and gestures
        let (mobile, gestures) = if !features.mobile {
            report.disabled("mobile");
            report.disabled("gestures");
            (None, None)
        } else if !is_mobile {
            report.record("mobile", ModuleState::Skipped, "desktop viewport");
            report.record("gestures", ModuleState::Skipped, "desktop viewport");
            (None, None)
        } else {
            let enhancer = MobileEnhancer::install(&mut doc, &config.touch);
            report.record(
                "mobile",
                ModuleState::Active,
                format!("{} inputs adjusted", enhancer.inputs_adjusted()),
            );
            report.record("gestures", ModuleState::Active, "horizontal swipes");
            (Some(enhancer), Some(GestureDetector::new(&config.gestures)))
        };

        // Lazy images
        if !features.lazy_images {
            report.disabled("lazy_images");
        } else if !caps.intersection_observer {
            report.record("lazy_images", ModuleState::Skipped, "no intersection observer");
        } else {
            let count = visibility::install_lazy_images(&mut watcher, &mut doc);
            report.record("lazy_images", ModuleState::Active, format!("{} images", count));
        }

        // Reduced motion
        let tracks_reduced_motion = features.reduced_motion;
        if tracks_reduced_motion {
            let reduce = doc.prefers_reduced_motion();
            if reduce {
                environment::apply_reduced_motion(&mut doc, true);
            }
            report.record(
                "reduced_motion",
                ModuleState::Active,
                if reduce { "reducing" } else { "watching" },
            );
        } else {
            report.disabled("reduced_motion");
        }

        // Preload
        if features.preload {
            let count = environment::preload_stylesheets(&mut doc, &config.preload.stylesheets);
            report.record("preload", ModuleState::Active, format!("{} stylesheets", count));
        } else {
            report.disabled("preload");
        }

        // Performance
        let performance = if !features.performance {
            report.disabled("performance");
            None
        } else if !caps.performance_observer {
            report.record("performance", ModuleState::Skipped, "no performance observer");
            None
        } else {
            report.record("performance", ModuleState::Active, "lcp and first input");
            Some(PerformanceMonitor::new())
        };

        // Interactions
        let interactions = if features.interactions {
            let enhancer = InteractionEnhancer::install(&mut doc, &config.buttons, &mut ripple);
            report.record(
                "interactions",
                ModuleState::Active,
                format!(
                    "{} buttons, {} with flair",
                    enhancer.button_count(),
                    enhancer.flair_count()
                ),
            );
            Some(enhancer)
        } else {
            report.disabled("interactions");
            None
        };

        // Accessibility
        let accessibility = if features.accessibility {
            let augmenter = AccessibilityAugmenter::install(&mut doc);
            report.record(
                "accessibility",
                ModuleState::Active,
                format!("{} fallback labels", augmenter.labelled_count()),
            );
            Some(augmenter)
        } else {
            report.disabled("accessibility");
            None
        };

        // Animation queue
        let animations = if features.animation_queue {
            let detail = match config.animation.stall_timeout_ms {
                Some(ms) => format!("stall timeout {}ms", ms),
                None => "no stall timeout".to_string(),
            };
            report.record("animation_queue", ModuleState::Active, detail);
            Some(AnimationQueue::new(config.animation.stall_timeout_ms))
        } else {
            report.disabled("animation_queue");
            None
        };

        Self {
            doc,
            config,
            now: 0,
            timers: TimerQueue::new(),
            watcher,
            ripple,
            parallax,
            navigation,
            mobile,
            gestures,
            interactions,
            accessibility,
            animations,
            performance,
            tracks_reduced_motion,
            swipe_handler: None,
            report,
            stats: EngineStats::default(),
        }
    }

    /// Forward classified swipes to the host
    pub fn on_swipe(&mut self, handler: impl FnMut(Swipe) + 'static) {
        self.swipe_handler = Some(Box::new(handler));
    }

    // ── Event dispatch ────────────────────────────────────────────────────

    /// Route one host event. `Handled::Yes` means the host must suppress
    /// the event's default action.
    pub fn handle_event(&mut self, event: HostEvent) -> Handled {
        self.stats.events += 1;
        let now = self.now;

        match event {
            HostEvent::Scroll => {
                if let Some(parallax) = &mut self.parallax {
                    parallax.on_scroll();
                }
                if let Some(nav) = &mut self.navigation {
                    nav.on_scroll(&mut self.timers, now);
                }
                Handled::No
            }

            HostEvent::PointerDown { x, y, target } => {
                if let (Some(mobile), Some(target)) = (&mut self.mobile, target) {
                    mobile.on_pointer_down(&mut self.doc, now, target);
                }
                if let Some(gestures) = &mut self.gestures {
                    gestures.pointer_down(x, y);
                }
                Handled::No
            }

            HostEvent::PointerUp { x, y, target } => {
                if let (Some(mobile), Some(target)) = (&self.mobile, target) {
                    mobile.on_pointer_up(&self.doc, &mut self.timers, now, target);
                }
                let swipe = self.gestures.as_mut().and_then(|g| g.pointer_up(x, y));
                if let Some(swipe) = swipe {
                    self.dispatch_swipe(swipe);
                }
                Handled::No
            }

            HostEvent::Click { target, x, y } => {
                self.ripple
                    .on_click(&mut self.doc, &mut self.timers, now, target, x, y);
                Handled::No
            }

            HostEvent::KeyDown { target, key } => match &self.accessibility {
                Some(a11y) => a11y.on_key_down(&mut self.doc, target, &key),
                None => Handled::No,
            },

            HostEvent::Focus { target } => {
                if let Some(a11y) = &self.accessibility {
                    a11y.on_focus(&mut self.doc, target);
                }
                if let Some(interactions) = &self.interactions {
                    interactions.on_focus(&mut self.doc, target);
                }
                Handled::No
            }

            HostEvent::Blur { target } => {
                if let Some(a11y) = &self.accessibility {
                    a11y.on_blur(&mut self.doc, target);
                }
                if let Some(interactions) = &self.interactions {
                    interactions.on_blur(&mut self.doc, target);
                }
                Handled::No
            }

            HostEvent::FormSubmit { form } => {
                if let Some(interactions) = &self.interactions {
                    interactions.on_submit(&mut self.doc, form);
                }
                Handled::No
            }

            HostEvent::OrientationChange => {
                if let Some(mobile) = &self.mobile {
                    mobile.on_orientation_change(&mut self.timers, now);
                }
                Handled::No
            }

            HostEvent::ReducedMotionChanged { reduce } => {
                if self.tracks_reduced_motion {
                    environment::apply_reduced_motion(&mut self.doc, reduce);
                }
                Handled::No
            }

            HostEvent::Intersection { target, ratio } => {
                self.watcher.notify(&mut self.doc, target, ratio);
                Handled::No
            }

            HostEvent::AnimationEnd { target } => {
                if let Some(queue) = &mut self.animations {
                    queue.on_animation_end(target, &mut self.timers, now);
                }
                Handled::No
            }

            HostEvent::PerformanceEntry {
                metric,
                start_time,
                processing_start,
            } => {
                if let Some(monitor) = &mut self.performance {
                    monitor.record(metric, start_time, processing_start);
                }
                Handled::No
            }
        }
    }

    fn dispatch_swipe(&mut self, swipe: Swipe) {
        match swipe {
            Swipe::Left => self.stats.swipes_left += 1,
            Swipe::Right => self.stats.swipes_right += 1,
        }
        info!(?swipe, "swipe detected");
        if let Some(handler) = &mut self.swipe_handler {
            handler(swipe);
        }
    }

    // ── Time ──────────────────────────────────────────────────────────────

    /// Move the clock to `now_ms`, firing every timer due on the way in
    /// (due time, scheduling order). The clock never moves backwards.
    pub fn advance_to(&mut self, now_ms: u64) {
        if now_ms < self.now {
            debug!(now_ms, clock = self.now, "ignoring clock rewind");
            return;
        }
        while let Some((due, id, task)) = self.timers.pop_due(now_ms) {
            self.now = due;
            self.doc.sync_clock(due);
            self.stats.timers_fired += 1;
            self.run_task(id, task);
        }
        self.now = now_ms;
        self.doc.sync_clock(now_ms);
    }

    fn run_task(&mut self, id: TimerId, task: Task) {
        let now = self.now;
        match task {
            Task::NavigationScroll => {
                if let Some(nav) = &mut self.navigation {
                    nav.on_timer(id, &mut self.doc);
                }
            }
            Task::ClearAnnouncement { region } => {
                accessibility::clear_announcement(&mut self.doc, region);
            }
            Task::PlayAnimation => {
                if let Some(queue) = &mut self.animations {
                    queue.on_play(&mut self.doc, &mut self.timers, now);
                }
            }
            Task::AnimationStalled { .. } => {
                if let Some(queue) = &mut self.animations {
                    queue.on_stall(id, &mut self.timers, now);
                }
            }
            Task::ReleaseTouch { target } => mobile::release_touch(&mut self.doc, target),
            Task::RemoveRipple { ripple } => self.doc.remove(ripple),
            Task::OrientationNudge => mobile::orientation_nudge(&mut self.doc),
        }
    }

    /// Deliver one display frame. Returns true if anything was recomputed.
    pub fn render_frame(&mut self) -> bool {
        let Some(parallax) = &mut self.parallax else {
            return false;
        };
        let ran = parallax.on_frame(&mut self.doc);
        if ran {
            self.stats.frames_rendered += 1;
        }
        ran
    }

    /// Whether a frame callback is waiting
    pub fn wants_frame(&self) -> bool {
        self.parallax.as_ref().is_some_and(|p| p.wants_frame())
    }

    pub fn next_timer_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // ── Host-facing API ───────────────────────────────────────────────────

    /// Speak `message` through the live region
    pub fn announce(&mut self, message: &str) -> bool {
        accessibility::announce(
            &mut self.doc,
            &mut self.timers,
            self.now,
            message,
            self.config.announcer.clear_delay_ms,
        )
    }

    /// Queue an animation. Returns false when the queue is disabled.
    pub fn enqueue_animation(&mut self, target: ElementId, animation: &str, delay_ms: u64) -> bool {
        let Some(queue) = &mut self.animations else {
            return false;
        };
        let task = AnimationTask {
            target,
            animation: animation.to_string(),
            delay_ms,
        };
        queue.enqueue(task, &mut self.timers, self.now);
        true
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn into_document(self) -> D {
        self.doc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_mobile(&self) -> bool {
        self.report.is_mobile
    }

    pub fn report(&self) -> &StartupReport {
        &self.report
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn navigation_state(&self) -> Option<ScrollState> {
        self.navigation.as_ref().map(|n| n.state())
    }

    pub fn parallax_recomputes(&self) -> u64 {
        self.parallax.as_ref().map_or(0, |p| p.recompute_count())
    }

    pub fn animation_queue(&self) -> Option<&AnimationQueue> {
        self.animations.as_ref()
    }

    pub fn performance(&self) -> Option<&PerformanceSnapshot> {
        self.performance.as_ref().map(|p| p.snapshot())
    }

    pub fn watching(&self) -> usize {
        self.watcher.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Features;
    use crate::host::{Capabilities, MemoryDocument, MutationKind, Rect};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Page {
        doc: MemoryDocument,
        header: ElementId,
        button: ElementId,
        card: ElementId,
        image: ElementId,
    }

    fn page(width: f64) -> Page {
        let mut doc = MemoryDocument::new()
            .with_viewport(width, 800.0)
            .with_capabilities(Capabilities {
                vibration: true,
                ..Capabilities::default()
            });
        let body = doc.body().unwrap();
        let header = doc.add_element(body, "header", &["main-header"]);
        let nav = doc.add_element(header, "nav", &["main-nav"]);
        doc.add_element(nav, "a", &[]);
        let button = doc.add_element(body, "button", &["btn"]);
        doc.seed_text(button, "Go");
        doc.set_layout(button, Rect::new(10.0, 100.0, 100.0, 40.0));
        let card = doc.add_element(body, "div", &["card"]);
        doc.set_layout(card, Rect::new(0.0, 1200.0, 300.0, 200.0));
        let image = doc.add_element(body, "img", &[]);
        doc.seed_attribute(image, "data-src", "/hero.jpg");
        Page {
            doc,
            header,
            button,
            card,
            image,
        }
    }

    fn no_flair() -> Config {
        let mut config = Config::default();
        config.buttons.flair = crate::config::FlairMode::Off;
        config
    }

    #[test]
    fn test_desktop_startup_report() {
        let p = page(1280.0);
        let engine = Orchestrator::new(p.doc, no_flair());
        let report = engine.report();

        assert!(!report.is_mobile);
        for name in [
            "styles",
            "reveal",
            "parallax",
            "navigation",
            "lazy_images",
            "interactions",
            "accessibility",
            "animation_queue",
        ] {
            assert!(report.is_active(name), "{} not active", name);
        }
        assert_eq!(report.module("mobile").unwrap().state, ModuleState::Skipped);
        assert_eq!(report.module("gestures").unwrap().state, ModuleState::Skipped);
        assert_eq!(report.modules.len(), 13);
    }

    #[test]
    fn test_mobile_startup_skips_parallax() {
        let p = page(390.0);
        let engine = Orchestrator::new(p.doc, no_flair());
        assert!(engine.is_mobile());
        assert_eq!(engine.report().module("parallax").unwrap().state, ModuleState::Skipped);
        assert!(engine.report().is_active("mobile"));
        assert!(engine.report().is_active("gestures"));
    }

    #[test]
    fn test_features_off_touches_only_styles() {
        let p = page(1280.0);
        let mut config = no_flair();
        config.features = Features {
            reveal: false,
            parallax: false,
            navigation: false,
            mobile: false,
            lazy_images: false,
            reduced_motion: false,
            preload: false,
            performance: false,
            interactions: false,
            accessibility: false,
            animation_queue: false,
        };
        let mut engine = Orchestrator::new(p.doc, config);

        let report = engine.report();
        assert!(report.is_active("styles"));
        assert_eq!(
            report
                .modules
                .iter()
                .filter(|m| m.state == ModuleState::Disabled)
                .count(),
            12
        );
        assert!(!engine.document().has_class(p.button, "btn-enhanced"));
        assert!(!engine.enqueue_animation(p.button, "pulse 1s", 0));
        assert_eq!(engine.handle_event(HostEvent::KeyDown {
            target: p.button,
            key: "Enter".into(),
        }), Handled::No);
    }

    #[test]
    fn test_scroll_burst_updates_header_once() {
        let p = page(1280.0);
        let header = p.header;
        let mut engine = Orchestrator::new(p.doc, no_flair());

        for (t, y) in [(0, 40.0), (3, 80.0), (6, 120.0), (9, 200.0)] {
            engine.advance_to(t);
            engine.document_mut().set_scroll_y(y);
            engine.handle_event(HostEvent::Scroll);
        }
        assert_eq!(engine.pending_timers(), 1);
        assert_eq!(engine.next_timer_due(), Some(19));

        engine.advance_to(100);
        assert!(engine.document().has_class(header, "scrolled"));
        assert_eq!(engine.navigation_state().unwrap().last_y, 200.0);
        assert_eq!(engine.stats().timers_fired, 1);
    }

    #[test]
    fn test_mobile_header_hides_and_returns() {
        let p = page(390.0);
        let header = p.header;
        let mut engine = Orchestrator::new(p.doc, no_flair());

        engine.document_mut().set_scroll_y(300.0);
        engine.handle_event(HostEvent::Scroll);
        engine.advance_to(50);
        assert_eq!(
            engine.document().style(header, "transform").as_deref(),
            Some("translateY(-100%)")
        );

        engine.document_mut().set_scroll_y(250.0);
        engine.handle_event(HostEvent::Scroll);
        engine.advance_to(100);
        assert_eq!(
            engine.document().style(header, "transform").as_deref(),
            Some("translateY(0)")
        );
    }

    #[test]
    fn test_parallax_coalesces_scrolls_per_frame() {
        let p = page(1280.0);
        let header = p.header;
        let mut engine = Orchestrator::new(p.doc, no_flair());

        engine.document_mut().set_scroll_y(100.0);
        for _ in 0..50 {
            engine.handle_event(HostEvent::Scroll);
        }
        assert!(engine.wants_frame());
        assert!(engine.render_frame());
        assert!(!engine.render_frame());
        assert_eq!(engine.parallax_recomputes(), 1);
        assert_eq!(
            engine.document().style(header, "transform").as_deref(),
            Some("translateY(50px)")
        );
    }

    #[test]
    fn test_reveal_and_lazy_image_on_intersection() {
        let p = page(1280.0);
        let mut engine = Orchestrator::new(p.doc, no_flair());
        // card, button and image
        assert_eq!(engine.watching(), 3);

        engine.handle_event(HostEvent::Intersection {
            target: p.card,
            ratio: 0.5,
        });
        engine.handle_event(HostEvent::Intersection {
            target: p.image,
            ratio: 0.2,
        });

        assert!(engine.document().has_class(p.card, "revealed"));
        assert_eq!(
            engine.document().attribute(p.image, "src").as_deref(),
            Some("/hero.jpg")
        );
        assert_eq!(engine.watching(), 1);
    }

    #[test]
    fn test_no_observer_leaves_content_visible() {
        let mut p = page(1280.0);
        p.doc.set_capabilities(Capabilities {
            intersection_observer: false,
            ..Capabilities::default()
        });
        let engine = Orchestrator::new(p.doc, no_flair());
        assert_eq!(engine.report().module("reveal").unwrap().state, ModuleState::Skipped);
        assert!(engine.document().classes(p.card).iter().all(|c| c == "card"));
    }

    #[test]
    fn test_click_ripple_expires() {
        let p = page(1280.0);
        let mut engine = Orchestrator::new(p.doc, no_flair());

        engine.handle_event(HostEvent::Click {
            target: p.button,
            x: 30.0,
            y: 120.0,
        });
        let ripples = engine.document().query_all(".ripple");
        assert_eq!(ripples.len(), 1);

        engine.advance_to(599);
        assert!(engine.document().is_attached(ripples[0]));
        engine.advance_to(600);
        assert!(!engine.document().is_attached(ripples[0]));
    }

    #[test]
    fn test_keyboard_activation_is_handled() {
        let p = page(1280.0);
        let mut engine = Orchestrator::new(p.doc, no_flair());

        let handled = engine.handle_event(HostEvent::KeyDown {
            target: p.button,
            key: "Enter".into(),
        });
        assert_eq!(handled, Handled::Yes);
        assert_eq!(
            engine
                .document()
                .count_mutations(|m| m.kind == MutationKind::Click && m.element == Some(p.button)),
            1
        );

        let ignored = engine.handle_event(HostEvent::KeyDown {
            target: p.button,
            key: "a".into(),
        });
        assert_eq!(ignored, Handled::No);
        for key in ["Spacebar", "Tab"] {
            let ignored = engine.handle_event(HostEvent::KeyDown {
                target: p.button,
                key: key.into(),
            });
            assert_eq!(ignored, Handled::No, "{} should not activate", key);
        }
    }

    #[test]
    fn test_announce_clears_after_delay() {
        let p = page(1280.0);
        let mut engine = Orchestrator::new(p.doc, no_flair());
        let region = engine.document().element_by_id("live-region").unwrap();

        assert!(engine.announce("Saved"));
        assert_eq!(engine.document().text_content(region), "Saved");
        engine.advance_to(999);
        assert_eq!(engine.document().text_content(region), "Saved");
        engine.advance_to(1000);
        assert_eq!(engine.document().text_content(region), "");
    }

    #[test]
    fn test_animations_play_in_order() {
        let p = page(1280.0);
        let (first, second) = (p.button, p.card);
        let mut engine = Orchestrator::new(p.doc, no_flair());

        engine.enqueue_animation(first, "pulse 0.5s", 100);
        engine.enqueue_animation(second, "shake 0.5s", 0);
        engine.advance_to(100);
        assert_eq!(
            engine.document().style(first, "animation").as_deref(),
            Some("pulse 0.5s")
        );
        assert_eq!(engine.document().style(second, "animation"), None);

        engine.advance_to(600);
        engine.handle_event(HostEvent::AnimationEnd { target: first });
        engine.advance_to(601);
        assert_eq!(
            engine.document().style(second, "animation").as_deref(),
            Some("shake 0.5s")
        );
        assert_eq!(engine.animation_queue().unwrap().completed(), 1);
    }

    #[test]
    fn test_swipe_reaches_handler() {
        let p = page(390.0);
        let mut engine = Orchestrator::new(p.doc, no_flair());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on_swipe(move |swipe| sink.borrow_mut().push(swipe));

        engine.handle_event(HostEvent::PointerDown {
            x: 200.0,
            y: 300.0,
            target: None,
        });
        engine.handle_event(HostEvent::PointerUp {
            x: 120.0,
            y: 310.0,
            target: None,
        });

        assert_eq!(*seen.borrow(), vec![Swipe::Left]);
        assert_eq!(engine.stats().swipes_left, 1);
    }

    #[test]
    fn test_reduced_motion_follows_preference() {
        let mut p = page(1280.0);
        p.doc.set_reduced_motion(true);
        let mut engine = Orchestrator::new(p.doc, no_flair());
        let body = engine.document().body().unwrap();
        assert!(engine.document().has_class(body, "reduce-motion"));

        engine.handle_event(HostEvent::ReducedMotionChanged { reduce: false });
        assert!(!engine.document().has_class(body, "reduce-motion"));
    }

    #[test]
    fn test_clock_never_rewinds() {
        let p = page(1280.0);
        let mut engine = Orchestrator::new(p.doc, no_flair());
        engine.advance_to(500);
        engine.advance_to(200);
        assert_eq!(engine.now(), 500);
        assert_eq!(engine.document().clock_ms(), 500);
    }
}
