#![forbid(unsafe_code)]

//! Animation gate.
//!
//! Decides how long a move animates and whether it animates at all. Silent
//! jumps (the initial build, resizes, carousel wrap jumps) disable the gate
//! so the presentation layer snaps instead of sliding; the next `run`
//! re-enables it.
//!
//! # Invariants
//!
//! 1. While disabled, the delay is zero and the descriptor reads `0ms`.
//! 2. A slider run that crossed a boundary uses `rewindDuration`; everything
//!    else uses `animationDuration`.

use std::fmt;
use std::time::Duration;

use reel_core::settings::{ReelType, Settings};

/// Presentation-facing transition descriptor, e.g.
/// `transform 400ms cubic-bezier(.165, .840, .440, 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionSpec {
    /// Animated property.
    pub property: String,
    /// Animation length.
    pub duration: Duration,
    /// Timing function.
    pub timing: String,
}

impl fmt::Display for TransitionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}ms {}",
            self.property,
            self.duration.as_millis(),
            self.timing
        )
    }
}

/// Enabled/disabled animation state of one reel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    disabled: bool,
}

impl Transition {
    /// Enabled gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether moves are currently instantaneous.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Animate subsequent moves.
    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Make subsequent moves instantaneous.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Configured duration for the current run.
    #[must_use]
    pub fn duration(&self, settings: &Settings, offset: bool) -> Duration {
        if settings.is_type(ReelType::Slider) && offset {
            settings.rewind_duration()
        } else {
            settings.animation_duration()
        }
    }

    /// How long "after the animation" is from now.
    #[must_use]
    pub fn delay(&self, settings: &Settings, offset: bool) -> Duration {
        if self.disabled {
            Duration::ZERO
        } else {
            self.duration(settings, offset)
        }
    }

    /// Descriptor for `property`.
    #[must_use]
    pub fn compose(&self, property: &str, settings: &Settings, offset: bool) -> TransitionSpec {
        TransitionSpec {
            property: property.to_owned(),
            duration: self.delay(settings, offset),
            timing: settings.animation_timing_func.clone(),
        }
    }
}
