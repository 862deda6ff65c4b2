//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::{Config, FlairMode};

impl Config {
    /// `[buttons]` flair keys for the active mode
    fn flair_to_toml(&self) -> String {
        let mut out = format!("flair = \"{}\"\n", self.buttons.flair.as_str());
        match &self.buttons.flair {
            FlairMode::Seeded { seed } => out.push_str(&format!("seed = {}\n", seed)),
            FlairMode::Explicit(assignments) => {
                out.push_str(&format!("assignments = {:?}\n", assignments))
            }
            FlairMode::Off | FlairMode::Random => {
                out.push_str("# seed = 42               # used when flair = \"seeded\"\n");
                out.push_str("# assignments = [\"btn-glow\", \"\"]  # used when flair = \"explicit\"\n");
            }
        }
        out
    }

    fn stall_timeout_to_toml(&self) -> String {
        match self.animation.stall_timeout_ms {
            Some(ms) => format!("stall_timeout_ms = {}\n", ms),
            None => "stall_timeout_ms = 0             # 0 = wait forever\n".to_string(),
        }
    }

    /// Render the full config file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# pagelift configuration
#
# Environment overrides: PAGELIFT_MOBILE_BREAKPOINT, PAGELIFT_LOG_LEVEL,
# PAGELIFT_FLAIR_SEED (forces flair = "seeded")

# Enhancement modules (all on by default)
[features]
reveal = {reveal}
parallax = {parallax}
navigation = {navigation}
mobile = {mobile}
lazy_images = {lazy_images}
reduced_motion = {reduced_motion}
preload = {preload}
performance = {performance}
interactions = {interactions}
accessibility = {accessibility}
animation_queue = {animation_queue}

[viewport]
mobile_breakpoint = {breakpoint:?}    # widths at or below are mobile

# Scroll reveal and lazy images
[reveal]
threshold = {threshold:?}
bottom_margin_px = {bottom_margin:?}
stagger_ms = {stagger}

[navigation]
debounce_ms = {nav_debounce}
scrolled_threshold = {scrolled:?}
hide_threshold = {hide:?}

[gestures]
swipe_threshold = {swipe:?}

[parallax]
header_speed = {header_speed:?}
default_speed = {default_speed:?}

# Mobile touch feedback
[touch]
release_delay_ms = {release}
haptic_pulse_ms = {pulse}
haptic_throttle_ms = {haptic_throttle}
orientation_nudge_ms = {nudge}

[announcer]
clear_delay_ms = {clear_delay}

[animation]
{stall}
# Decorative button flair: off, random, seeded, explicit
[buttons]
{flair}probability = {probability:?}
variants = {variants:?}

[preload]
stylesheets = {stylesheets:?}

# Logging (RUST_LOG env var overrides level)
[logging]
level = "{log_level}"
capture_capacity = {capture}
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            reveal = self.features.reveal,
            parallax = self.features.parallax,
            navigation = self.features.navigation,
            mobile = self.features.mobile,
            lazy_images = self.features.lazy_images,
            reduced_motion = self.features.reduced_motion,
            preload = self.features.preload,
            performance = self.features.performance,
            interactions = self.features.interactions,
            accessibility = self.features.accessibility,
            animation_queue = self.features.animation_queue,
            breakpoint = self.viewport.mobile_breakpoint,
            threshold = self.reveal.threshold,
            bottom_margin = self.reveal.bottom_margin_px,
            stagger = self.reveal.stagger_ms,
            nav_debounce = self.navigation.debounce_ms,
            scrolled = self.navigation.scrolled_threshold,
            hide = self.navigation.hide_threshold,
            swipe = self.gestures.swipe_threshold,
            header_speed = self.parallax.header_speed,
            default_speed = self.parallax.default_speed,
            release = self.touch.release_delay_ms,
            pulse = self.touch.haptic_pulse_ms,
            haptic_throttle = self.touch.haptic_throttle_ms,
            nudge = self.touch.orientation_nudge_ms,
            clear_delay = self.announcer.clear_delay_ms,
            stall = self.stall_timeout_to_toml(),
            flair = self.flair_to_toml(),
            probability = self.buttons.probability,
            variants = self.buttons.variants,
            stylesheets = self.preload.stylesheets,
            log_level = self.logging.level,
            capture = self.logging.capture_capacity,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
