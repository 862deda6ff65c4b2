//! Feature flags configuration
//!
//! One switch per enhancement module (opt-out: default enabled). A disabled
//! module is never constructed; the startup report lists it as disabled.

use serde::Deserialize;

/// Feature flags for enhancement modules (opt-out: default enabled)
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    /// Staggered scroll-reveal classes on the reveal selectors
    pub reveal: bool,

    /// Header and `.parallax-bg` translation (desktop only)
    pub parallax: bool,

    /// Header scroll-state classes and mobile hide/show
    pub navigation: bool,

    /// Touch feedback, swipe gestures, mobile nav, input font floor
    pub mobile: bool,

    /// `img[data-src]` loading on first visibility
    pub lazy_images: bool,

    /// `reduce-motion` body class tracking
    pub reduced_motion: bool,

    /// Preload links for critical stylesheets
    pub preload: bool,

    /// LCP / first-input-delay logging
    pub performance: bool,

    /// Buttons, ripple, forms, loading state, tooltips
    pub interactions: bool,

    /// Keyboard activation, fallback labels, live region, skip link
    pub accessibility: bool,

    /// Sequential animation playback
    pub animation_queue: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            reveal: true,
            parallax: true,
            navigation: true,
            mobile: true,
            lazy_images: true,
            reduced_motion: true,
            preload: true,
            performance: true,
            interactions: true,
            accessibility: true,
            animation_queue: true,
        }
    }
}

/// Feature flags as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileFeatures {
    pub reveal: Option<bool>,
    pub parallax: Option<bool>,
    pub navigation: Option<bool>,
    pub mobile: Option<bool>,
    pub lazy_images: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub preload: Option<bool>,
    pub performance: Option<bool>,
    pub interactions: Option<bool>,
    pub accessibility: Option<bool>,
    pub animation_queue: Option<bool>,
}

impl Features {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileFeatures>) -> Self {
        let file = file.unwrap_or_default();

        Self {
            reveal: file.reveal.unwrap_or(true),
            parallax: file.parallax.unwrap_or(true),
            navigation: file.navigation.unwrap_or(true),
            mobile: file.mobile.unwrap_or(true),
            lazy_images: file.lazy_images.unwrap_or(true),
            reduced_motion: file.reduced_motion.unwrap_or(true),
            preload: file.preload.unwrap_or(true),
            performance: file.performance.unwrap_or(true),
            interactions: file.interactions.unwrap_or(true),
            accessibility: file.accessibility.unwrap_or(true),
            animation_queue: file.animation_queue.unwrap_or(true),
        }
    }
}
