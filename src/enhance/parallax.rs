//! Parallax translation for the header and `.parallax-bg` layers
//!
//! Scroll events only request a frame; the actual write happens once per
//! rendered frame no matter how many scrolls arrived in between.

use crate::config::ParallaxConfig;
use crate::host::Document;
use crate::util::FrameGate;

pub const HEADER_SELECTOR: &str = ".main-header";
pub const LAYER_SELECTOR: &str = ".parallax-bg";

#[derive(Debug)]
pub struct ParallaxScroller {
    gate: FrameGate,
    header_speed: f64,
    default_speed: f64,
    recomputes: u64,
}

impl ParallaxScroller {
    pub fn new(config: &ParallaxConfig) -> Self {
        Self {
            gate: FrameGate::new(),
            header_speed: config.header_speed,
            default_speed: config.default_speed,
            recomputes: 0,
        }
    }

    /// Returns true if this scroll scheduled the next frame's recompute
    pub fn on_scroll(&mut self) -> bool {
        self.gate.request()
    }

    pub fn wants_frame(&self) -> bool {
        self.gate.is_scheduled()
    }

    /// Frame callback. Returns true if a recompute ran.
    pub fn on_frame(&mut self, doc: &mut dyn Document) -> bool {
        if !self.gate.take() {
            return false;
        }
        self.recompute(doc);
        true
    }

    /// Recomputes performed so far
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    fn recompute(&mut self, doc: &mut dyn Document) {
        let y = doc.scroll_y();

        if let Some(header) = doc.query_first(HEADER_SELECTOR) {
            doc.set_style(header, "transform", &translate_y(y * self.header_speed));
        }

        for layer in doc.query_all(LAYER_SELECTOR) {
            let speed = doc
                .attribute(layer, "data-speed")
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|s| s.is_finite())
                .unwrap_or(self.default_speed);
            doc.set_style(layer, "transform", &translate_y(y * speed));
        }

        self.recomputes += 1;
    }
}

fn translate_y(px: f64) -> String {
    format!("translateY({}px)", px)
}
