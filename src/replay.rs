//! Scenario replay
//!
//! A scenario is a TOML description of a page (viewport, capabilities,
//! element tree with layout) plus a timed trace of host events. The runner
//! builds a [`MemoryDocument`] from it, starts an [`Orchestrator`] and plays
//! the trace on the virtual clock:
//!
//! - a display frame every [`FRAME_MS`]
//! - due timers fired as the clock passes them
//! - intersection notifications computed from layout after every step
//!
//! With `realtime` the runner sleeps between steps so the trace plays at
//! wall-clock speed.

use crate::config::{Config, FileConfig};
use crate::enhance::{PerformanceSnapshot, ScrollState, Swipe};
use crate::events::{HostEvent, PerformanceMetric};
use crate::host::{Capabilities, Document, ElementId, MemoryDocument, Mutation, MutationKind, Rect};
use crate::logging::LogEntry;
use crate::orchestrator::{EngineStats, Orchestrator, StartupReport};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

/// Display frame interval
pub const FRAME_MS: u64 = 16;

/// Time played after the last event when the scenario sets no duration
pub const SETTLE_MS: u64 = 1000;

// ─────────────────────────────────────────────────────────────────────────────
// Scenario file
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,

    /// Total virtual time to play. Defaults to the last event plus
    /// [`SETTLE_MS`].
    pub duration_ms: Option<u64>,

    #[serde(default)]
    pub viewport: ScenarioViewport,

    #[serde(default)]
    pub capabilities: Capabilities,

    #[serde(default)]
    pub environment: ScenarioEnvironment,

    /// Overrides for this run, same sections as config.toml
    pub config: Option<FileConfig>,

    #[serde(default)]
    pub elements: Vec<ElementDef>,

    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

fn default_name() -> String {
    "scenario".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioViewport {
    pub width: f64,
    pub height: f64,
}

impl Default for ScenarioViewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioEnvironment {
    pub reduced_motion: bool,
    /// CSS declarations the host reports as supported
    pub supports_css: Vec<String>,
    /// Scroll offset at load
    pub scroll_y: f64,
}

/// One element. `id` names it for events and `parent`, and is also set as
/// the element's `id` attribute.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementDef {
    pub id: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    /// Layout box in document coordinates
    pub rect: Option<Rect>,
    /// Another element's `id`, or "body" / "head". Defaults to body.
    pub parent: Option<String>,
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

/// Trace entries. Targets are element ids from `[[elements]]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Set the scroll offset, then deliver a scroll event
    Scroll { y: f64 },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<String>,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<String>,
    },
    /// Click at (x, y), or at the target's centre when omitted
    Click {
        target: String,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    KeyDown { target: String, key: String },
    Focus { target: String },
    Blur { target: String },
    Submit { form: String },
    OrientationChange,
    ReducedMotion { reduce: bool },
    AnimationEnd { target: String },
    Performance {
        metric: PerformanceMetric,
        start_time: f64,
        #[serde(default)]
        processing_start: Option<f64>,
    },
    /// Host-initiated announcement
    Announce { message: String },
    /// Host-initiated animation
    Animate {
        target: String,
        animation: String,
        #[serde(default)]
        delay_ms: u64,
    },
}

/// Resolved trace step
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Event(HostEvent),
    Scroll(f64),
    Click {
        target: ElementId,
        at: Option<(f64, f64)>,
    },
    Announce(String),
    Animate {
        target: ElementId,
        animation: String,
        delay_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Cue {
    at_ms: u64,
    step: Step,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(contents)?;
        Ok(scenario)
    }

    /// Build the page. Returns the document and the handle for every named
    /// element (plus "body" and "head").
    pub fn build_document(&self) -> Result<(MemoryDocument, BTreeMap<String, ElementId>)> {
        let mut doc = MemoryDocument::new()
            .with_viewport(self.viewport.width, self.viewport.height)
            .with_capabilities(self.capabilities);
        doc.set_reduced_motion(self.environment.reduced_motion);
        for declaration in &self.environment.supports_css {
            doc.support_css(declaration);
        }
        doc.set_scroll_y(self.environment.scroll_y);

        let body = doc.body().context("document has no body")?;
        let head = doc.head().context("document has no head")?;
        let mut ids = BTreeMap::from([("body".to_string(), body), ("head".to_string(), head)]);

        for def in &self.elements {
            if ids.contains_key(&def.id) {
                bail!("duplicate element id '{}'", def.id);
            }
            let parent = match &def.parent {
                Some(name) => *ids.get(name).with_context(|| {
                    format!(
                        "element '{}' has unknown parent '{}' (parents must be declared first)",
                        def.id, name
                    )
                })?,
                None => body,
            };

            let classes: Vec<&str> = def.classes.iter().map(String::as_str).collect();
            let el = doc.add_element(parent, &def.tag, &classes);
            doc.seed_attribute(el, "id", &def.id);
            for (name, value) in &def.attributes {
                doc.seed_attribute(el, name, value);
            }
            for (property, value) in &def.style {
                doc.seed_style(el, property, value);
            }
            if let Some(text) = &def.text {
                doc.seed_text(el, text);
            }
            if let Some(rect) = def.rect {
                doc.set_layout(el, rect);
            }
            ids.insert(def.id.clone(), el);
        }

        Ok((doc, ids))
    }

    /// Resolve element names and order the trace by time. Events at the
    /// same time keep file order.
    fn compile(&self, ids: &BTreeMap<String, ElementId>) -> Result<Vec<Cue>> {
        let mut cues = Vec::with_capacity(self.events.len());
        for event in &self.events {
            let at_ms = event.at_ms;
            let resolve = |name: &String| lookup(ids, at_ms, name);
            let resolve_opt = |name: &Option<String>| -> Result<Option<ElementId>> {
                name.as_ref().map(|n| lookup(ids, at_ms, n)).transpose()
            };

            let step = match &event.action {
                Action::Scroll { y } => Step::Scroll(*y),
                Action::PointerDown { x, y, target } => Step::Event(HostEvent::PointerDown {
                    x: *x,
                    y: *y,
                    target: resolve_opt(target)?,
                }),
                Action::PointerUp { x, y, target } => Step::Event(HostEvent::PointerUp {
                    x: *x,
                    y: *y,
                    target: resolve_opt(target)?,
                }),
                Action::Click { target, x, y } => Step::Click {
                    target: resolve(target)?,
                    at: x.zip(*y),
                },
                Action::KeyDown { target, key } => Step::Event(HostEvent::KeyDown {
                    target: resolve(target)?,
                    key: key.clone(),
                }),
                Action::Focus { target } => Step::Event(HostEvent::Focus {
                    target: resolve(target)?,
                }),
                Action::Blur { target } => Step::Event(HostEvent::Blur {
                    target: resolve(target)?,
                }),
                Action::Submit { form } => Step::Event(HostEvent::FormSubmit {
                    form: resolve(form)?,
                }),
                Action::OrientationChange => Step::Event(HostEvent::OrientationChange),
                Action::ReducedMotion { reduce } => {
                    Step::Event(HostEvent::ReducedMotionChanged { reduce: *reduce })
                }
                Action::AnimationEnd { target } => Step::Event(HostEvent::AnimationEnd {
                    target: resolve(target)?,
                }),
                Action::Performance {
                    metric,
                    start_time,
                    processing_start,
                } => Step::Event(HostEvent::PerformanceEntry {
                    metric: *metric,
                    start_time: *start_time,
                    processing_start: *processing_start,
                }),
                Action::Announce { message } => Step::Announce(message.clone()),
                Action::Animate {
                    target,
                    animation,
                    delay_ms,
                } => Step::Animate {
                    target: resolve(target)?,
                    animation: animation.clone(),
                    delay_ms: *delay_ms,
                },
            };
            cues.push(Cue { at_ms, step });
        }
        cues.sort_by_key(|c| c.at_ms);
        Ok(cues)
    }
}

fn lookup(ids: &BTreeMap<String, ElementId>, at_ms: u64, name: &str) -> Result<ElementId> {
    ids.get(name)
        .copied()
        .with_context(|| format!("event at {}ms references unknown element '{}'", at_ms, name))
}

// ─────────────────────────────────────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SwipeRecord {
    pub at_ms: u64,
    pub direction: Swipe,
}

/// An event whose default action the engine suppressed
#[derive(Debug, Clone, Serialize)]
pub struct PreventedRecord {
    pub at_ms: u64,
    pub event: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnimationSummary {
    pub completed: u64,
    pub evicted: u64,
    pub queued: usize,
    pub playing: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub scenario: String,
    pub duration_ms: u64,
    pub startup: StartupReport,
    pub stats: EngineStats,
    pub elements: BTreeMap<String, ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<ScrollState>,
    pub parallax_recomputes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animations: Option<AnimationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSnapshot>,
    pub swipes: Vec<SwipeRecord>,
    pub default_prevented: Vec<PreventedRecord>,
    pub mutations: Vec<Mutation>,
    /// Captured log output, filled in by the caller
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntry>,
}

impl ReplayReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize replay report")
    }

    /// Mutation counts keyed by operation name
    pub fn mutation_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for mutation in &self.mutations {
            *counts.entry(op_name(&mutation.kind)).or_insert(0) += 1;
        }
        counts
    }

    /// Elements that ended up with `class`, by scenario id
    pub fn classes_added(&self, class: &str) -> Vec<&str> {
        let names: BTreeMap<ElementId, &str> = self
            .elements
            .iter()
            .map(|(name, id)| (*id, name.as_str()))
            .collect();
        let mut out = Vec::new();
        for mutation in &self.mutations {
            if let (Some(el), MutationKind::AddClass { class: added }) =
                (mutation.element, &mutation.kind)
            {
                if added == class {
                    if let Some(name) = names.get(&el) {
                        if !out.contains(name) {
                            out.push(*name);
                        }
                    }
                }
            }
        }
        out
    }

    pub fn print_summary(&self) {
        println!("  Replayed {} ({}ms)", self.scenario, self.duration_ms);
        println!(
            "    events {}  timers {}  frames {}  mutations {}",
            self.stats.events,
            self.stats.timers_fired,
            self.stats.frames_rendered,
            self.mutations.len()
        );
        for (op, count) in self.mutation_counts() {
            println!("      {:<16} {}", op, count);
        }
        if let Some(nav) = &self.navigation {
            println!(
                "    header: {:?}, scrolled={} at y={}",
                nav.visibility, nav.scrolled, nav.last_y
            );
        }
        if self.parallax_recomputes > 0 {
            println!("    parallax recomputes: {}", self.parallax_recomputes);
        }
        if let Some(anim) = &self.animations {
            println!(
                "    animations: {} completed, {} evicted, {} queued",
                anim.completed, anim.evicted, anim.queued
            );
        }
        for swipe in &self.swipes {
            println!("    swipe {:?} at {}ms", swipe.direction, swipe.at_ms);
        }
        for prevented in &self.default_prevented {
            println!("    prevented {} at {}ms", prevented.event, prevented.at_ms);
        }
        if let Some(perf) = &self.performance {
            if let Some(lcp) = perf.largest_contentful_paint_ms {
                println!("    LCP {}ms", lcp);
            }
            if let Some(fid) = perf.first_input_delay_ms {
                println!("    FID {}ms", fid);
            }
        }
    }
}

fn op_name(kind: &MutationKind) -> &'static str {
    match kind {
        MutationKind::AddClass { .. } => "add_class",
        MutationKind::RemoveClass { .. } => "remove_class",
        MutationKind::SetStyle { .. } => "set_style",
        MutationKind::SetAttribute { .. } => "set_attribute",
        MutationKind::SetText { .. } => "set_text",
        MutationKind::SetInnerHtml { .. } => "set_inner_html",
        MutationKind::Create { .. } => "create",
        MutationKind::Append { .. } => "append",
        MutationKind::Prepend { .. } => "prepend",
        MutationKind::Remove => "remove",
        MutationKind::Click => "click",
        MutationKind::ScrollTo { .. } => "scroll_to",
        MutationKind::Vibrate { .. } => "vibrate",
        MutationKind::Observe => "observe",
        MutationKind::Unobserve => "unobserve",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runner
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Sleep between steps so the trace plays at wall-clock speed
    pub realtime: bool,
}

struct Runner {
    engine: Orchestrator<MemoryDocument>,
    realtime: bool,
    paced_ms: u64,
    next_frame: u64,
    swipe_sink: Rc<RefCell<Vec<Swipe>>>,
    swipes: Vec<SwipeRecord>,
    prevented: Vec<PreventedRecord>,
}

impl Runner {
    async fn pace(&mut self, target_ms: u64) {
        if self.realtime && target_ms > self.paced_ms {
            tokio::time::sleep(Duration::from_millis(target_ms - self.paced_ms)).await;
        }
        self.paced_ms = self.paced_ms.max(target_ms);
    }

    /// Play frames and timers up to `at_ms`
    async fn run_until(&mut self, at_ms: u64) {
        while self.next_frame <= at_ms {
            let frame = self.next_frame;
            self.pace(frame).await;
            self.engine.advance_to(frame);
            if self.engine.wants_frame() {
                self.engine.render_frame();
            }
            self.sync_visibility();
            self.next_frame += FRAME_MS;
        }
        self.pace(at_ms).await;
        self.engine.advance_to(at_ms);
        self.sync_visibility();
    }

    /// Deliver intersection notifications for everything that became
    /// visible since the last step
    fn sync_visibility(&mut self) {
        for (target, ratio) in self.engine.document().intersections() {
            self.engine
                .handle_event(HostEvent::Intersection { target, ratio });
        }
    }

    fn apply(&mut self, cue: Cue) {
        let at_ms = cue.at_ms;
        match cue.step {
            Step::Event(event) => self.deliver(at_ms, event),
            Step::Scroll(y) => {
                self.engine.document_mut().set_scroll_y(y);
                self.deliver(at_ms, HostEvent::Scroll);
            }
            Step::Click { target, at } => {
                let (x, y) = at.unwrap_or_else(|| self.centre(target));
                self.deliver(at_ms, HostEvent::Click { target, x, y });
            }
            Step::Announce(message) => {
                if !self.engine.announce(&message) {
                    debug!(at_ms, "announcement dropped: no live region");
                }
            }
            Step::Animate {
                target,
                animation,
                delay_ms,
            } => {
                if !self.engine.enqueue_animation(target, &animation, delay_ms) {
                    debug!(at_ms, "animation dropped: queue disabled");
                }
            }
        }

        let swipes: Vec<Swipe> = self.swipe_sink.borrow_mut().drain(..).collect();
        self.swipes.extend(
            swipes
                .into_iter()
                .map(|direction| SwipeRecord { at_ms, direction }),
        );
        self.sync_visibility();
    }

    fn centre(&self, target: ElementId) -> (f64, f64) {
        self.engine
            .document()
            .bounding_rect(target)
            .map_or((0.0, 0.0), |r| (r.x + r.width / 2.0, r.y + r.height / 2.0))
    }

    fn deliver(&mut self, at_ms: u64, event: HostEvent) {
        let kind = event.kind();
        let activated = match &event {
            HostEvent::KeyDown { target, .. } => Some(*target),
            _ => None,
        };
        if !self.engine.handle_event(event).was_handled() {
            return;
        }
        self.prevented.push(PreventedRecord { at_ms, event: kind });

        // A handled activation key clicks the control, and a page's click
        // listeners see that click like any other
        if let Some(target) = activated {
            let (x, y) = self.centre(target);
            self.engine.handle_event(HostEvent::Click { target, x, y });
        }
    }
}

/// Play `scenario` to completion. `base` is used unless the scenario has
/// its own `[config]`, which is merged over defaults and the environment.
pub async fn run(scenario: Scenario, base: Config, options: ReplayOptions) -> Result<ReplayReport> {
    let (doc, elements) = scenario.build_document()?;
    let cues = scenario.compile(&elements)?;

    let Scenario {
        name,
        duration_ms,
        config: overrides,
        ..
    } = scenario;
    let config = match overrides {
        Some(file) => Config::merge(file, |key| std::env::var(key).ok()),
        None => base,
    };
    let end_ms = duration_ms.unwrap_or_else(|| cues.last().map_or(0, |c| c.at_ms) + SETTLE_MS);

    info!(scenario = %name, events = cues.len(), end_ms, "replay starting");

    let mut engine = Orchestrator::new(doc, config);
    crate::startup::log_startup(engine.report());
    let swipe_sink = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&swipe_sink);
    engine.on_swipe(move |swipe| sink.borrow_mut().push(swipe));

    let mut runner = Runner {
        engine,
        realtime: options.realtime,
        paced_ms: 0,
        next_frame: FRAME_MS,
        swipe_sink,
        swipes: Vec::new(),
        prevented: Vec::new(),
    };
    runner.sync_visibility();

    for cue in cues {
        if cue.at_ms > end_ms {
            debug!(at_ms = cue.at_ms, end_ms, "event past scenario end; stopping");
            break;
        }
        runner.run_until(cue.at_ms).await;
        runner.apply(cue);
    }
    runner.run_until(end_ms).await;

    let Runner {
        engine,
        swipes,
        prevented,
        ..
    } = runner;

    let report = ReplayReport {
        scenario: name,
        duration_ms: end_ms,
        startup: engine.report().clone(),
        stats: engine.stats().clone(),
        elements,
        navigation: engine.navigation_state(),
        parallax_recomputes: engine.parallax_recomputes(),
        animations: engine.animation_queue().map(|q| AnimationSummary {
            completed: q.completed(),
            evicted: q.evicted(),
            queued: q.queued(),
            playing: q.is_playing(),
        }),
        performance: engine.performance().cloned(),
        swipes,
        default_prevented: prevented,
        mutations: engine.into_document().take_log(),
        logs: Vec::new(),
    };
    info!(
        mutations = report.mutations.len(),
        swipes = report.swipes.len(),
        "replay finished"
    );
    Ok(report)
}
