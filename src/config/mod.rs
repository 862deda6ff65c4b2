//! Configuration for the enhancement engine
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/pagelift/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod features;
mod observability;
mod serialization;
mod tuning;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use features::{Features, FileFeatures};
pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use tuning::{
    AnimationConfig, AnnouncerConfig, ButtonsConfig, FileAnimation, FileAnnouncer, FileButtons,
    FileGestures, FileNavigation, FileParallax, FilePreload, FileReveal, FileTouch, FileViewport,
    FlairMode, GestureConfig, NavigationConfig, ParallaxConfig, PreloadConfig, RevealConfig,
    TouchConfig, ViewportConfig,
};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable names
pub const ENV_MOBILE_BREAKPOINT: &str = "PAGELIFT_MOBILE_BREAKPOINT";
pub const ENV_LOG_LEVEL: &str = "PAGELIFT_LOG_LEVEL";
pub const ENV_FLAIR_SEED: &str = "PAGELIFT_FLAIR_SEED";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Per-module on/off switches
    pub features: Features,

    /// Mobile breakpoint
    pub viewport: ViewportConfig,

    /// Reveal / lazy image visibility
    pub reveal: RevealConfig,

    /// Header scroll behaviour
    pub navigation: NavigationConfig,

    /// Swipe classification
    pub gestures: GestureConfig,

    /// Parallax speeds
    pub parallax: ParallaxConfig,

    /// Touch feedback timings
    pub touch: TouchConfig,

    /// Live region announcer
    pub announcer: AnnouncerConfig,

    /// Animation queue
    pub animation: AnimationConfig,

    /// Button flair
    pub buttons: ButtonsConfig,

    /// Critical stylesheet preloads
    pub preload: PreloadConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure. Every section is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub features: Option<FileFeatures>,
    pub viewport: Option<FileViewport>,
    pub reveal: Option<FileReveal>,
    pub navigation: Option<FileNavigation>,
    pub gestures: Option<FileGestures>,
    pub parallax: Option<FileParallax>,
    pub touch: Option<FileTouch>,
    pub announcer: Option<FileAnnouncer>,
    pub animation: Option<FileAnimation>,
    pub buttons: Option<FileButtons>,
    pub preload: Option<FilePreload>,
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/pagelift/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("pagelift").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Read and parse a config file. A missing file yields empty sections;
    /// a file that exists but does not parse is an error.
    pub fn load_file_config(path: &Path) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_file_config(&contents).with_context(|| {
                format!(
                    "failed to parse {}\n  \
                     Check for missing quotes, invalid booleans (use true/false), \
                     malformed arrays or misspelled section names.\n  \
                     Run `pagelift config --reset` to start over.",
                    path.display()
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    pub fn parse_file_config(contents: &str) -> Result<FileConfig> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration: env vars > config file > defaults
    pub fn from_env() -> Result<Self> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file_config(&path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file over defaults, then apply environment overrides
    /// looked up through `env`
    pub fn merge(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let env_breakpoint = env(ENV_MOBILE_BREAKPOINT).and_then(|v| v.trim().parse().ok());
        let env_level = env(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty());
        let env_seed = env(ENV_FLAIR_SEED).and_then(|v| v.trim().parse().ok());

        Self {
            features: Features::from_file(file.features),
            viewport: ViewportConfig::from_file(file.viewport, env_breakpoint),
            reveal: RevealConfig::from_file(file.reveal),
            navigation: NavigationConfig::from_file(file.navigation),
            gestures: GestureConfig::from_file(file.gestures),
            parallax: ParallaxConfig::from_file(file.parallax),
            touch: TouchConfig::from_file(file.touch),
            announcer: AnnouncerConfig::from_file(file.announcer),
            animation: AnimationConfig::from_file(file.animation),
            buttons: ButtonsConfig::from_file(file.buttons, env_seed),
            preload: PreloadConfig::from_file(file.preload),
            logging: LoggingConfig::from_file(file.logging, env_level),
        }
    }
}
