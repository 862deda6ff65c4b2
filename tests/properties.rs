// End-to-end behaviour of the engine through its public API

use pagelift::config::{Config, FlairMode, NavigationConfig};
use pagelift::enhance::gesture::classify;
use pagelift::enhance::{NavVisibility, ScrollState, Swipe};
use pagelift::host::{MemoryDocument, MutationKind, Rect};
use pagelift::{Document, ElementId, Handled, HostEvent, Orchestrator};

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.buttons.flair = FlairMode::Off;
    config
}

fn page(width: f64) -> (MemoryDocument, ElementId) {
    let mut doc = MemoryDocument::new().with_viewport(width, 800.0);
    let body = doc.body().unwrap();
    doc.add_element(body, "header", &["main-header"]);
    let card = doc.add_element(body, "div", &["card"]);
    doc.set_layout(card, Rect::new(0.0, 100.0, 400.0, 200.0));
    (doc, card)
}

#[test]
fn test_target_revealed_at_most_once() {
    let (doc, card) = page(1280.0);
    let mut engine = Orchestrator::new(doc, quiet_config());

    for _ in 0..5 {
        engine.handle_event(HostEvent::Intersection {
            target: card,
            ratio: 1.0,
        });
    }

    let reveals = engine.document().count_mutations(|m| {
        m.element == Some(card) && m.kind == MutationKind::AddClass {
            class: "revealed".into(),
        }
    });
    assert_eq!(reveals, 1);
    assert!(!engine.document().is_observed(card));
}

#[test]
fn test_playback_order_matches_enqueue_order() {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    let targets: Vec<ElementId> = (0..4).map(|_| doc.add_element(body, "div", &[])).collect();
    let mut engine = Orchestrator::new(doc, quiet_config());

    for (i, target) in targets.iter().enumerate() {
        engine.enqueue_animation(*target, &format!("step{} 0.2s", i), 50);
    }

    // Each animation ends 200ms after it starts
    let mut started = Vec::new();
    let mut now = 0;
    while started.len() < targets.len() {
        now += 10;
        engine.advance_to(now);
        let log = engine.document().log();
        let playing: Vec<(u64, ElementId)> = log
            .iter()
            .filter_map(|m| match &m.kind {
                MutationKind::SetStyle { property, .. } if property == "animation" => {
                    Some((m.at_ms, m.element?))
                }
                _ => None,
            })
            .collect();
        if playing.len() > started.len() {
            let (at, target) = playing[started.len()];
            started.push((at, target));
            engine.advance_to(at + 200);
            now = at + 200;
            engine.handle_event(HostEvent::AnimationEnd { target });
        }
    }

    let order: Vec<ElementId> = started.iter().map(|(_, t)| *t).collect();
    assert_eq!(order, targets);
    // Active intervals [start, start + 200] never overlap
    for pair in started.windows(2) {
        assert!(pair[1].0 >= pair[0].0 + 200);
    }
}

#[test]
fn test_swipe_classification() {
    assert_eq!(classify(60.0, 10.0, 50.0), Some(Swipe::Left));
    assert_eq!(classify(-60.0, 10.0, 50.0), Some(Swipe::Right));
    assert_eq!(classify(40.0, 5.0, 50.0), None);
}

#[test]
fn test_navigation_traces() {
    let config = NavigationConfig::default();
    let trace = [0.0, 120.0, 130.0, 90.0];

    let mut mobile = ScrollState::new(0.0);
    let visibility: Vec<NavVisibility> = trace
        .iter()
        .map(|y| {
            mobile.step(*y, true, &config);
            mobile.visibility
        })
        .collect();
    assert_eq!(
        visibility,
        vec![
            NavVisibility::Visible,
            NavVisibility::Hidden,
            NavVisibility::Hidden,
            NavVisibility::Visible,
        ]
    );

    let mut desktop = ScrollState::new(0.0);
    let scrolled: Vec<bool> = trace
        .iter()
        .map(|y| {
            let transition = desktop.step(*y, false, &config);
            assert_eq!(transition.visibility, None);
            transition.scrolled
        })
        .collect();
    assert_eq!(scrolled, vec![false, true, true, true]);
}

#[test]
fn test_navigation_trace_through_engine() {
    let (doc, _) = page(390.0);
    let mut engine = Orchestrator::new(doc, quiet_config());
    let header = engine.document().query_first(".main-header").unwrap();

    let mut transforms = Vec::new();
    for (i, y) in [0.0, 120.0, 130.0, 90.0].into_iter().enumerate() {
        let t = i as u64 * 100;
        engine.advance_to(t);
        engine.document_mut().set_scroll_y(y);
        engine.handle_event(HostEvent::Scroll);
        engine.advance_to(t + 50);
        transforms.push(engine.document().style(header, "transform"));
    }

    assert_eq!(
        transforms,
        vec![
            None,
            Some("translateY(-100%)".to_string()),
            Some("translateY(-100%)".to_string()),
            Some("translateY(0)".to_string()),
        ]
    );
}

#[test]
fn test_fifty_scrolls_one_recompute() {
    let (doc, _) = page(1280.0);
    let mut engine = Orchestrator::new(doc, quiet_config());

    for i in 0..50 {
        engine.document_mut().set_scroll_y(i as f64);
        engine.handle_event(HostEvent::Scroll);
    }
    engine.render_frame();
    engine.render_frame();

    assert_eq!(engine.parallax_recomputes(), 1);
}

#[test]
fn test_repeated_announcement_sets_and_clears_twice() {
    let (doc, _) = page(1280.0);
    let mut engine = Orchestrator::new(doc, quiet_config());
    let region = engine.document().element_by_id("live-region").unwrap();

    engine.announce("Odds updated");
    engine.advance_to(10);
    engine.announce("Odds updated");
    engine.advance_to(2000);

    let texts: Vec<(u64, String)> = engine
        .document()
        .log()
        .iter()
        .filter(|m| m.element == Some(region))
        .filter_map(|m| match &m.kind {
            MutationKind::SetText { text } => Some((m.at_ms, text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            (0, "Odds updated".to_string()),
            (10, "Odds updated".to_string()),
            (1000, String::new()),
            (1010, String::new()),
        ]
    );
}

#[test]
fn test_unknown_targets_are_ignored() {
    let (doc, _) = page(1280.0);
    let mut engine = Orchestrator::new(doc, quiet_config());
    let ghost = ElementId(9999);
    let before = engine.document().log().len();

    assert_eq!(
        engine.handle_event(HostEvent::KeyDown {
            target: ghost,
            key: "Enter".into(),
        }),
        Handled::No
    );
    engine.handle_event(HostEvent::Click {
        target: ghost,
        x: 1.0,
        y: 1.0,
    });
    engine.handle_event(HostEvent::AnimationEnd { target: ghost });
    engine.handle_event(HostEvent::Intersection {
        target: ghost,
        ratio: 1.0,
    });

    assert_eq!(engine.document().log().len(), before);
}
