// Demo module - built-in scenarios for `pagelift replay` without a file
//
// Two pages ship with the binary: a desktop landing page and a phone layout.
// Between them they exercise every enhancement module.

use crate::replay::Scenario;
use anyhow::{Context, Result};
use clap::ValueEnum;

const DESKTOP: &str = include_str!("../demos/desktop.toml");
const MOBILE: &str = include_str!("../demos/mobile.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DemoLayout {
    #[default]
    Desktop,
    Mobile,
}

impl DemoLayout {
    fn source(self) -> &'static str {
        match self {
            Self::Desktop => DESKTOP,
            Self::Mobile => MOBILE,
        }
    }
}

/// Parse the bundled scenario for `layout`
pub fn scenario(layout: DemoLayout) -> Result<Scenario> {
    Scenario::parse(layout.source()).with_context(|| format!("built-in {:?} demo is invalid", layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::orchestrator::ModuleState;
    use crate::replay::{self, ReplayOptions};

    #[tokio::test]
    async fn test_desktop_demo_exercises_desktop_modules() {
        let scenario = scenario(DemoLayout::Desktop).unwrap();
        let report = replay::run(scenario, Config::default(), ReplayOptions::default())
            .await
            .unwrap();

        assert!(report.startup.is_active("parallax"));
        assert_eq!(
            report.startup.module("mobile").unwrap().state,
            ModuleState::Skipped
        );

        let revealed = report.classes_added("revealed");
        for card in ["card-featured", "card-odds", "card-results"] {
            assert!(revealed.contains(&card), "{} not revealed", card);
        }
        assert_eq!(report.classes_added("fade-in"), vec!["hero"]);
        assert_eq!(report.classes_added("btn-sparkle"), vec!["place-bet"]);
        assert_eq!(report.classes_added("btn-glow"), vec!["submit"]);
        assert_eq!(report.classes_added("loading"), vec!["submit"]);
        assert!(report.parallax_recomputes >= 1);
        assert!(!report.navigation.unwrap().scrolled);
        assert_eq!(report.default_prevented.len(), 1);
        assert_eq!(report.default_prevented[0].event, "key_down");

        let anim = report.animations.as_ref().unwrap();
        assert_eq!(anim.completed, 1);
        // card-odds never reports completion; the stall timeout evicts it
        assert_eq!(anim.evicted, 1);
        assert!(!anim.playing);

        let perf = report.performance.as_ref().unwrap();
        assert_eq!(perf.largest_contentful_paint_ms, Some(812.4));
        assert_eq!(perf.first_input_delay_ms, Some(8.0));
    }

    #[tokio::test]
    async fn test_mobile_demo_exercises_touch_modules() {
        let scenario = scenario(DemoLayout::Mobile).unwrap();
        let report = replay::run(scenario, Config::default(), ReplayOptions::default())
            .await
            .unwrap();

        assert!(report.startup.is_active("mobile"));
        assert!(report.startup.is_active("gestures"));
        assert_eq!(
            report.startup.module("parallax").unwrap().state,
            ModuleState::Skipped
        );

        let directions: Vec<_> = report.swipes.iter().map(|s| s.direction).collect();
        assert_eq!(
            directions,
            vec![crate::enhance::Swipe::Left, crate::enhance::Swipe::Right]
        );
        assert_eq!(report.classes_added("touching"), vec!["quick-bet"]);
        assert_eq!(report.classes_added("mobile-nav-enhanced"), vec!["footer-nav"]);
        assert_eq!(report.mutation_counts().get("vibrate"), Some(&1));
        assert_eq!(report.mutation_counts().get("scroll_to"), Some(&1));
        assert_eq!(report.default_prevented.len(), 1);

        let nav = report.navigation.unwrap();
        assert_eq!(nav.visibility, crate::enhance::NavVisibility::Visible);
        assert_eq!(nav.last_y, 380.0);
    }
}
