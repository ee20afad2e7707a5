#![forbid(unsafe_code)]

//! Core: command grammar, index resolution, geometry, and the translation
//! pipeline of a reel (slider or carousel).
//!
//! Nothing in this crate keeps time or owns events. Every operation is a
//! pure function of the settings, the geometry inputs and the current index,
//! which makes the engine deterministic under test. Scheduling, events and
//! the reel lifecycle live in `reel-runtime`.

pub mod command;
pub mod direction;
pub mod geometry;
pub mod logging;
pub mod movement;
pub mod run;
pub mod settings;
pub mod translate;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};
