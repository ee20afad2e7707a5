#![forbid(unsafe_code)]

//! Typed event bus.
//!
//! Every lifecycle milestone of a reel is an [`Event`]. Handlers subscribe to
//! one [`EventKind`] (or to all of them) and receive events synchronously on
//! the publishing thread, in subscription order.
//!
//! # Invariants
//!
//! 1. Delivery is synchronous: `publish` returns after every matching
//!    handler has run.
//! 2. Handlers run in the order they subscribed.
//! 3. [`SubscriptionId`]s are never reused within one bus, so a stale id
//!    cannot remove a newer handler.
//!
//! # Failure Modes
//!
//! - Unsubscribing an unknown or already-removed id returns `false`.

use std::fmt;
use std::str::FromStr;

use reel_core::command::Command;
use reel_core::settings::SettingsPatch;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Movement payload of `move`, `move.after` and `translate.jump`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveContext {
    /// Index-derived value with the drag offset applied, before the pipeline.
    pub movement: f64,
    /// Final translation after every pipeline stage.
    pub translate: f64,
}

/// Discriminant of [`Event`], used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    MountBefore,
    MountAfter,
    BuildBefore,
    BuildAfter,
    RunBefore,
    Run,
    RunStart,
    RunEnd,
    RunOffset,
    RunAfter,
    Move,
    MoveAfter,
    TranslateJump,
    Update,
    Resize,
    Destroy,
}

impl EventKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [EventKind; 16] = [
        Self::MountBefore,
        Self::MountAfter,
        Self::BuildBefore,
        Self::BuildAfter,
        Self::RunBefore,
        Self::Run,
        Self::RunStart,
        Self::RunEnd,
        Self::RunOffset,
        Self::RunAfter,
        Self::Move,
        Self::MoveAfter,
        Self::TranslateJump,
        Self::Update,
        Self::Resize,
        Self::Destroy,
    ];

    /// Dotted event name, e.g. `"run.before"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MountBefore => "mount.before",
            Self::MountAfter => "mount.after",
            Self::BuildBefore => "build.before",
            Self::BuildAfter => "build.after",
            Self::RunBefore => "run.before",
            Self::Run => "run",
            Self::RunStart => "run.start",
            Self::RunEnd => "run.end",
            Self::RunOffset => "run.offset",
            Self::RunAfter => "run.after",
            Self::Move => "move",
            Self::MoveAfter => "move.after",
            Self::TranslateJump => "translate.jump",
            Self::Update => "update",
            Self::Resize => "resize",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEvent(pub String);

impl fmt::Display for UnknownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event {:?}", self.0)
    }
}

impl std::error::Error for UnknownEvent {}

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_owned()))
    }
}

/// A published lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MountBefore,
    MountAfter,
    BuildBefore,
    BuildAfter,
    RunBefore(Command),
    Run(Command),
    RunStart(Command),
    RunEnd(Command),
    RunOffset(Command),
    RunAfter(Command),
    Move(MoveContext),
    MoveAfter(MoveContext),
    TranslateJump(MoveContext),
    /// Settings changed through `update`.
    Update(SettingsPatch),
    /// Viewport changed.
    Resize {
        /// New viewport width.
        viewport_width: f64,
    },
    Destroy,
}

impl Event {
    /// Discriminant for subscription matching.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MountBefore => EventKind::MountBefore,
            Self::MountAfter => EventKind::MountAfter,
            Self::BuildBefore => EventKind::BuildBefore,
            Self::BuildAfter => EventKind::BuildAfter,
            Self::RunBefore(_) => EventKind::RunBefore,
            Self::Run(_) => EventKind::Run,
            Self::RunStart(_) => EventKind::RunStart,
            Self::RunEnd(_) => EventKind::RunEnd,
            Self::RunOffset(_) => EventKind::RunOffset,
            Self::RunAfter(_) => EventKind::RunAfter,
            Self::Move(_) => EventKind::Move,
            Self::MoveAfter(_) => EventKind::MoveAfter,
            Self::TranslateJump(_) => EventKind::TranslateJump,
            Self::Update(_) => EventKind::Update,
            Self::Resize { .. } => EventKind::Resize,
            Self::Destroy => EventKind::Destroy,
        }
    }

    /// Command carried by run events.
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        match self {
            Self::RunBefore(c)
            | Self::Run(c)
            | Self::RunStart(c)
            | Self::RunEnd(c)
            | Self::RunOffset(c)
            | Self::RunAfter(c) => Some(c),
            _ => None,
        }
    }

    /// Movement carried by move events.
    #[must_use]
    pub fn movement(&self) -> Option<MoveContext> {
        match self {
            Self::Move(m) | Self::MoveAfter(m) | Self::TranslateJump(m) => Some(*m),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Event)>;

struct Subscriber {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: Handler,
}

/// Synchronous publish/subscribe channel.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        self.insert(Some(kind), Box::new(handler))
    }

    /// Subscribe `handler` to every event.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.insert(None, Box::new(handler))
    }

    fn insert(&mut self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, kind, handler });
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every matching handler. Returns how many ran.
    pub fn publish(&mut self, event: &Event) -> usize {
        let kind = event.kind();
        tracing::trace!(event = kind.name(), "publish");
        let mut delivered = 0;
        for sub in &mut self.subscribers {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.handler)(event);
                delivered += 1;
            }
        }
        delivered
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether there are no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
