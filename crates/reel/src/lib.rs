#![forbid(unsafe_code)]

//! Reel public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the core and runtime crates and offers a
//! lightweight prelude for day-to-day usage.
//!
//! # Example
//!
//! ```rust
//! use reel::prelude::*;
//! use std::time::Duration;
//!
//! let settings = Settings::new().kind(ReelType::Carousel).per_view(2);
//! let mut reel = Reel::new(settings, 6, 800.0)?;
//! reel.mount();
//! reel.go(">")?;
//! reel.tick(Duration::from_millis(400));
//! assert_eq!(reel.index(), 1);
//! # Ok::<(), reel::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use reel_core::command::{Command, CommandError, Motion, Steps, Token};
pub use reel_core::direction::{Direction, DirectionError};
pub use reel_core::geometry::{Geometry, StripGeometry};
pub use reel_core::movement::Movement;
pub use reel_core::run::{Run, RunContext};
pub use reel_core::settings::{
    DEFAULT_TIMING_FUNC, FocusAt, Peek, ReelType, Settings, SettingsError, SettingsPatch,
};
pub use reel_core::translate::{FnStage, Pipeline, Stage, StageContext};

// --- Runtime re-exports ----------------------------------------------------

pub use reel_runtime::{
    Event, EventBus, EventKind, MoveContext, Reel, Scheduler, SubscriptionId, TaskId, Transition,
    TransitionSpec,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for reel APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A movement command could not be interpreted.
    Command(CommandError),
    /// Configuration was rejected.
    Settings(SettingsError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Command(err) => Some(err),
            Self::Settings(err) => Some(err),
        }
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<SettingsError> for Error {
    fn from(err: SettingsError) -> Self {
        Self::Settings(err)
    }
}

impl From<DirectionError> for Error {
    fn from(err: DirectionError) -> Self {
        Self::Settings(err.into())
    }
}

/// Standard result type for reel APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Direction, Error, Event, EventKind, FocusAt, Peek, Reel, ReelType, Result, Settings,
        SettingsPatch,
    };

    pub use crate::{core, runtime};
}

pub use reel_core as core;
pub use reel_runtime as runtime;
