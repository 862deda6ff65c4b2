//! pagelift - progressive enhancement engine for server-rendered pages
//!
//! The engine attaches behaviour to an already-rendered page: scroll reveal,
//! parallax, header state, touch and keyboard affordances, lazy images, an
//! accessibility live region and a sequential animation queue. It talks to
//! the page only through the [`host::Document`] trait and runs on a virtual
//! clock, so the same code is driven by a browser binding, by tests, or by
//! the `replay` command through [`host::MemoryDocument`].

pub mod config;
pub mod demo;
pub mod enhance;
pub mod events;
pub mod host;
pub mod logging;
pub mod orchestrator;
pub mod replay;
pub mod startup;
pub mod util;

pub use config::Config;
pub use events::{Handled, HostEvent};
pub use host::{Document, ElementId, MemoryDocument};
pub use orchestrator::Orchestrator;
