//! Enhancement tuning: thresholds, delays and per-module knobs
//!
//! Defaults reproduce the stock site behaviour. Every section follows the
//! same runtime struct + `File*` struct + `from_file()` merge pattern.

use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Viewport
// ─────────────────────────────────────────────────────────────────────────────

/// Viewport classification
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    /// Widths at or below this are treated as mobile
    pub mobile_breakpoint: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileViewport {
    pub mobile_breakpoint: Option<f64>,
}

impl ViewportConfig {
    pub fn from_file(file: Option<FileViewport>, env_breakpoint: Option<f64>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            mobile_breakpoint: env_breakpoint
                .or(file.mobile_breakpoint)
                .unwrap_or(defaults.mobile_breakpoint),
        }
    }

    pub fn is_mobile(&self, viewport_width: f64) -> bool {
        viewport_width <= self.mobile_breakpoint
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reveal
// ─────────────────────────────────────────────────────────────────────────────

/// Scroll reveal and lazy image visibility settings
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Visible fraction that counts as "revealed"
    pub threshold: f64,
    /// Bottom viewport margin trimmed before testing (px)
    pub bottom_margin_px: f64,
    /// Delay added per element within one selector's matches (ms)
    pub stagger_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin_px: 50.0,
            stagger_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileReveal {
    pub threshold: Option<f64>,
    pub bottom_margin_px: Option<f64>,
    pub stagger_ms: Option<u64>,
}

impl RevealConfig {
    pub fn from_file(file: Option<FileReveal>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            threshold: file
                .threshold
                .map(|t| t.clamp(0.0, 1.0))
                .unwrap_or(defaults.threshold),
            bottom_margin_px: file.bottom_margin_px.unwrap_or(defaults.bottom_margin_px),
            stagger_ms: file.stagger_ms.unwrap_or(defaults.stagger_ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation
// ─────────────────────────────────────────────────────────────────────────────

/// Header scroll behaviour
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationConfig {
    /// Scroll quiet period before the handler runs (ms)
    pub debounce_ms: u64,
    /// Scroll offset above which the header is marked `scrolled`
    pub scrolled_threshold: f64,
    /// Scroll offset above which a downward scroll hides the header (mobile)
    pub hide_threshold: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            scrolled_threshold: 50.0,
            hide_threshold: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileNavigation {
    pub debounce_ms: Option<u64>,
    pub scrolled_threshold: Option<f64>,
    pub hide_threshold: Option<f64>,
}

impl NavigationConfig {
    pub fn from_file(file: Option<FileNavigation>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            debounce_ms: file.debounce_ms.unwrap_or(defaults.debounce_ms),
            scrolled_threshold: file
                .scrolled_threshold
                .unwrap_or(defaults.scrolled_threshold),
            hide_threshold: file.hide_threshold.unwrap_or(defaults.hide_threshold),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gestures
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Minimum horizontal travel for a swipe (px, exclusive)
    pub swipe_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 50.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileGestures {
    pub swipe_threshold: Option<f64>,
}

impl GestureConfig {
    pub fn from_file(file: Option<FileGestures>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            swipe_threshold: file
                .swipe_threshold
                .unwrap_or(Self::default().swipe_threshold),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parallax
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxConfig {
    /// Header translation per scrolled pixel
    pub header_speed: f64,
    /// Layer speed when `data-speed` is absent or unparseable
    pub default_speed: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            header_speed: 0.5,
            default_speed: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileParallax {
    pub header_speed: Option<f64>,
    pub default_speed: Option<f64>,
}

impl ParallaxConfig {
    pub fn from_file(file: Option<FileParallax>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            header_speed: file.header_speed.unwrap_or(defaults.header_speed),
            default_speed: file.default_speed.unwrap_or(defaults.default_speed),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Touch
// ─────────────────────────────────────────────────────────────────────────────

/// Mobile touch feedback timings
#[derive(Debug, Clone, PartialEq)]
pub struct TouchConfig {
    /// Delay before `touching` is removed after pointer-up (ms)
    pub release_delay_ms: u64,
    /// Haptic pulse length (ms)
    pub haptic_pulse_ms: u32,
    /// Minimum spacing between haptic pulses (ms)
    pub haptic_throttle_ms: u64,
    /// Delay before the post-rotation scroll nudge (ms)
    pub orientation_nudge_ms: u64,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            release_delay_ms: 150,
            haptic_pulse_ms: 10,
            haptic_throttle_ms: 100,
            orientation_nudge_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTouch {
    pub release_delay_ms: Option<u64>,
    pub haptic_pulse_ms: Option<u32>,
    pub haptic_throttle_ms: Option<u64>,
    pub orientation_nudge_ms: Option<u64>,
}

impl TouchConfig {
    pub fn from_file(file: Option<FileTouch>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            release_delay_ms: file.release_delay_ms.unwrap_or(defaults.release_delay_ms),
            haptic_pulse_ms: file.haptic_pulse_ms.unwrap_or(defaults.haptic_pulse_ms),
            haptic_throttle_ms: file
                .haptic_throttle_ms
                .unwrap_or(defaults.haptic_throttle_ms),
            orientation_nudge_ms: file
                .orientation_nudge_ms
                .unwrap_or(defaults.orientation_nudge_ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Announcer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncerConfig {
    /// How long an announcement stays in the live region (ms)
    pub clear_delay_ms: u64,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            clear_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileAnnouncer {
    pub clear_delay_ms: Option<u64>,
}

impl AnnouncerConfig {
    pub fn from_file(file: Option<FileAnnouncer>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            clear_delay_ms: file
                .clear_delay_ms
                .unwrap_or(Self::default().clear_delay_ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Animation queue
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationConfig {
    /// Evict an animation whose completion never arrives after this long
    /// (ms). `None` keeps waiting forever.
    pub stall_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FileAnimation {
    /// 0 means "no timeout"
    pub stall_timeout_ms: Option<u64>,
}

impl AnimationConfig {
    pub fn from_file(file: Option<FileAnimation>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            stall_timeout_ms: file.stall_timeout_ms.filter(|ms| *ms > 0),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Buttons
// ─────────────────────────────────────────────────────────────────────────────

/// How decorative button flair is chosen
#[derive(Debug, Clone, PartialEq)]
pub enum FlairMode {
    /// No flair classes
    Off,
    /// Fresh entropy on every startup
    Random,
    /// Deterministic generator seeded with `seed`
    Seeded { seed: u64 },
    /// One entry per `.btn` in document order; empty string means none.
    /// Buttons past the end of the list get nothing.
    Explicit(Vec<String>),
}

impl FlairMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Random => "random",
            Self::Seeded { .. } => "seeded",
            Self::Explicit(_) => "explicit",
        }
    }
}

/// Button enhancement settings
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonsConfig {
    pub flair: FlairMode,
    /// Chance that a button receives a flair class (random/seeded modes)
    pub probability: f64,
    /// Candidate flair classes
    pub variants: Vec<String>,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            flair: FlairMode::Random,
            probability: 0.3,
            variants: vec![
                "btn-glow".to_string(),
                "btn-wiggle".to_string(),
                "btn-bounce".to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileButtons {
    /// off, random, seeded, explicit
    pub flair: Option<String>,
    pub seed: Option<u64>,
    pub probability: Option<f64>,
    pub variants: Option<Vec<String>>,
    pub assignments: Option<Vec<String>>,
}

impl ButtonsConfig {
    pub fn from_file(file: Option<FileButtons>, env_seed: Option<u64>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let flair = match (env_seed, file.flair.as_deref().map(str::to_lowercase)) {
            (Some(seed), _) => FlairMode::Seeded { seed },
            (None, Some(mode)) => match mode.as_str() {
                "off" => FlairMode::Off,
                "seeded" => FlairMode::Seeded {
                    seed: file.seed.unwrap_or(0),
                },
                "explicit" => FlairMode::Explicit(file.assignments.unwrap_or_default()),
                _ => FlairMode::Random,
            },
            (None, None) => defaults.flair,
        };

        Self {
            flair,
            probability: file
                .probability
                .map(|p| p.clamp(0.0, 1.0))
                .unwrap_or(defaults.probability),
            variants: file
                .variants
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.variants),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preload
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PreloadConfig {
    /// Stylesheets to preload, in order
    pub stylesheets: Vec<String>,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            stylesheets: vec![
                "/assets/css/style.css".to_string(),
                "/assets/css/optimization.css".to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePreload {
    pub stylesheets: Option<Vec<String>>,
}

impl PreloadConfig {
    pub fn from_file(file: Option<FilePreload>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            stylesheets: file.stylesheets.unwrap_or(Self::default().stylesheets),
        }
    }
}
