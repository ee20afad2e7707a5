#![forbid(unsafe_code)]

//! Reel Runtime
//!
//! Ties the pure components of `reel-core` into a living slider or carousel.
//!
//! # Key Components
//!
//! - [`Reel`] - The instance: canonical index, command cycle, lifecycle
//! - [`EventBus`] - Typed synchronous publish/subscribe
//! - [`Scheduler`] - Cancellable deferred tasks on an explicit clock
//! - [`Transition`] - Animation gate and transition descriptor
//!
//! # Timing
//!
//! The runtime never reads the wall clock. Hosts drive it with
//! [`Reel::tick`] from their frame loop, or call [`Reel::settle`] to finish
//! every pending animation at once.

pub mod event;
pub mod reel;
pub mod scheduler;
pub mod transition;

pub use event::{Event, EventBus, EventKind, MoveContext, SubscriptionId, UnknownEvent};
pub use reel::Reel;
pub use scheduler::{Scheduler, TaskId};
pub use transition::{Transition, TransitionSpec};
