//! Page environment: reduced-motion preference, critical stylesheet
//! preloads and paint / input timing

use crate::events::PerformanceMetric;
use crate::host::Document;
use serde::Serialize;
use tracing::{debug, info};

pub const REDUCE_MOTION_CLASS: &str = "reduce-motion";

/// Mirror the reduced-motion preference onto `body`
pub fn apply_reduced_motion(doc: &mut dyn Document, reduce: bool) {
    let Some(body) = doc.body() else {
        return;
    };
    if reduce {
        doc.add_class(body, REDUCE_MOTION_CLASS);
    } else {
        doc.remove_class(body, REDUCE_MOTION_CLASS);
    }
}

/// Append one `<link rel="preload" as="style">` per stylesheet to `head`
pub fn preload_stylesheets(doc: &mut dyn Document, hrefs: &[String]) -> usize {
    let Some(head) = doc.head() else {
        debug!("no head element; preload skipped");
        return 0;
    };
    for href in hrefs {
        let link = doc.create_element("link");
        doc.set_attribute(link, "rel", "preload");
        doc.set_attribute(link, "as", "style");
        doc.set_attribute(link, "href", href);
        doc.append_child(head, link);
    }
    hrefs.len()
}

/// Latest paint and input timings, in milliseconds since navigation start
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    pub largest_contentful_paint_ms: Option<f64>,
    pub first_input_delay_ms: Option<f64>,
}

#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    snapshot: PerformanceSnapshot,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one entry. First-input entries without a processing start
    /// are ignored.
    pub fn record(&mut self, metric: PerformanceMetric, start_time: f64, processing_start: Option<f64>) {
        match metric {
            PerformanceMetric::LargestContentfulPaint => {
                info!(lcp_ms = start_time, "largest contentful paint");
                self.snapshot.largest_contentful_paint_ms = Some(start_time);
            }
            PerformanceMetric::FirstInput => {
                let Some(processing_start) = processing_start else {
                    debug!("first-input entry without processing start");
                    return;
                };
                let delay = processing_start - start_time;
                info!(fid_ms = delay, "first input delay");
                self.snapshot.first_input_delay_ms = Some(delay);
            }
        }
    }

    pub fn snapshot(&self) -> &PerformanceSnapshot {
        &self.snapshot
    }
}
