//! Configuration tests
//!
//! These tests guard the template: every field must serialize, parse back,
//! and merge to the same runtime value. When you add a field, the
//! exhaustive test below fails until `to_toml()` covers it.

use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn reparse(config: &Config) -> Config {
    let toml_str = config.to_toml();
    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
    Config::merge(parsed.unwrap(), no_env)
}

// ─────────────────────────────────────────────────────────────────────────────
// Template tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_default_template_reproduces_defaults() {
    let config = Config::default();
    assert_eq!(reparse(&config), config);
}

#[test]
fn test_empty_file_yields_defaults() {
    let file = Config::parse_file_config("").unwrap();
    assert_eq!(Config::merge(file, no_env), Config::default());
}

/// EXHAUSTIVE TEST: every field set to a non-default value must survive
/// `to_toml()` -> parse -> merge.
#[test]
fn test_all_fields_survive_template() {
    let mut config = Config::default();

    config.features.reveal = false;
    config.features.parallax = false;
    config.features.navigation = false;
    config.features.mobile = false;
    config.features.lazy_images = false;
    config.features.reduced_motion = false;
    config.features.preload = false;
    config.features.performance = false;
    config.features.interactions = false;
    config.features.accessibility = false;
    config.features.animation_queue = false;

    config.viewport.mobile_breakpoint = 640.0;
    config.reveal.threshold = 0.25;
    config.reveal.bottom_margin_px = 20.0;
    config.reveal.stagger_ms = 50;
    config.navigation.debounce_ms = 25;
    config.navigation.scrolled_threshold = 80.0;
    config.navigation.hide_threshold = 160.0;
    config.gestures.swipe_threshold = 30.0;
    config.parallax.header_speed = 0.3;
    config.parallax.default_speed = 0.2;
    config.touch.release_delay_ms = 200;
    config.touch.haptic_pulse_ms = 15;
    config.touch.haptic_throttle_ms = 250;
    config.touch.orientation_nudge_ms = 300;
    config.announcer.clear_delay_ms = 2000;
    config.animation.stall_timeout_ms = Some(5000);
    config.buttons.flair = FlairMode::Seeded { seed: 99 };
    config.buttons.probability = 0.5;
    config.buttons.variants = vec!["btn-glow".to_string()];
    config.preload.stylesheets = vec!["/app.css".to_string()];
    config.logging.level = "debug".to_string();
    config.logging.capture_capacity = 50;
    config.logging.file_enabled = true;
    config.logging.file_dir = "/tmp/pagelift-logs".into();
    config.logging.file_rotation = LogRotation::Hourly;
    config.logging.file_prefix = "trace".to_string();

    assert_eq!(reparse(&config), config);
}

#[test]
fn test_explicit_flair_survives_template() {
    let mut config = Config::default();
    config.buttons.flair = FlairMode::Explicit(vec!["btn-glow".to_string(), String::new()]);
    assert_eq!(reparse(&config).buttons.flair, config.buttons.flair);

    config.buttons.flair = FlairMode::Off;
    assert_eq!(reparse(&config).buttons.flair, FlairMode::Off);
}

// ─────────────────────────────────────────────────────────────────────────────
// Merge precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file = Config::parse_file_config(
        r#"
[viewport]
mobile_breakpoint = 600.0

[logging]
level = "warn"

[buttons]
flair = "off"
"#,
    )
    .unwrap();

    let env: HashMap<&str, &str> = HashMap::from([
        (ENV_MOBILE_BREAKPOINT, "1024"),
        (ENV_LOG_LEVEL, "trace"),
        (ENV_FLAIR_SEED, "7"),
    ]);
    let config = Config::merge(file, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.viewport.mobile_breakpoint, 1024.0);
    assert_eq!(config.logging.level, "trace");
    assert_eq!(config.buttons.flair, FlairMode::Seeded { seed: 7 });
}

#[test]
fn test_unparseable_env_values_are_ignored() {
    let file = Config::parse_file_config("[viewport]\nmobile_breakpoint = 600.0\n").unwrap();
    let config = Config::merge(file, |key| {
        (key == ENV_MOBILE_BREAKPOINT).then(|| "wide".to_string())
    });
    assert_eq!(config.viewport.mobile_breakpoint, 600.0);
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let file = Config::parse_file_config(
        "[reveal]\nthreshold = 3.0\n[buttons]\nprobability = -1.0\n[animation]\nstall_timeout_ms = 0\n",
    )
    .unwrap();
    let config = Config::merge(file, no_env);
    assert_eq!(config.reveal.threshold, 1.0);
    assert_eq!(config.buttons.probability, 0.0);
    assert_eq!(config.animation.stall_timeout_ms, None);
}

#[test]
fn test_unknown_section_is_rejected() {
    assert!(Config::parse_file_config("[themes]\nname = \"dark\"\n").is_err());
    assert!(Config::parse_file_config("[features]\nreveal = \"yes\"\n").is_err());
}

#[test]
fn test_viewport_is_mobile_at_breakpoint() {
    let viewport = ViewportConfig::default();
    assert!(viewport.is_mobile(768.0));
    assert!(!viewport.is_mobile(769.0));
}

// ─────────────────────────────────────────────────────────────────────────────
// File loading
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let file = Config::load_file_config(&dir.path().join("absent.toml")).unwrap();
    assert!(file.features.is_none());
}

#[test]
fn test_broken_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[features\nreveal = true").unwrap();

    let err = Config::load_file_config(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("config.toml"));
}

#[test]
fn test_log_rotation_parse() {
    assert_eq!(LogRotation::parse("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::parse("never"), LogRotation::Never);
    assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
}
