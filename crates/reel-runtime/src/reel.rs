#![forbid(unsafe_code)]

//! The reel instance.
//!
//! [`Reel`] owns the canonical index and wires the core components together:
//! commands go through the index resolver, the resulting movement through
//! the translation pipeline, and every milestone is published on the event
//! bus. Work that happens "after the animation" is queued on a
//! [`Scheduler`] and runs when the host advances time with [`Reel::tick`]
//! or flushes it with [`Reel::settle`].
//!
//! # Command cycle
//!
//! ```text
//! go(">")
//!   run.before -> calculate -> run -> move
//!   ... transition duration ...
//!   [translate.jump] -> move.after -> [run.start] [run.end] [run.offset] -> run.after
//! ```
//!
//! # Invariants
//!
//! 1. The canonical index stays within `[0, length]`, including after
//!    settings updates and resizes.
//! 2. With `waitForTransition`, commands issued before `run.after` are
//!    dropped.
//! 3. Without it, a new command first completes the previous one, so every
//!    `run.before` is paired with exactly one `run.after`.
//! 4. After `destroy` no task fires and no event is published.
//!
//! # Failure Modes
//!
//! - Malformed or invalid command: `Err(CommandError)`, logged at `warn`,
//!   nothing published or mutated.
//! - Command while disabled, unmounted or destroyed: `Ok(false)`.
//! - Invalid settings update: `Err(SettingsError)`, previous settings kept.

use std::borrow::Cow;
use std::time::Duration;

use reel_core::command::{Command, CommandError};
use reel_core::geometry::{Geometry, StripGeometry};
use reel_core::movement::Movement;
use reel_core::run::{Run, RunContext};
use reel_core::settings::{ReelType, Settings, SettingsError, SettingsPatch};
use reel_core::translate::{Pipeline, Stage, StageContext};

use crate::event::{Event, EventBus, EventKind, MoveContext, SubscriptionId};
use crate::scheduler::Scheduler;
use crate::transition::{Transition, TransitionSpec};

/// Work queued until the current animation finishes.
#[derive(Debug, Clone, PartialEq)]
enum Deferred {
    /// Silently re-apply the translation of the normalized index.
    Jump { index: usize },
    /// Publish `move.after`.
    MoveAfter,
    /// Publish the boundary events and `run.after`, then re-enable.
    RunAfter(Command),
}

/// One slider or carousel.
#[derive(Debug)]
pub struct Reel {
    base: Settings,
    settings: Settings,
    geometry: StripGeometry,
    index: usize,
    run: Run,
    movement: Movement,
    pipeline: Pipeline,
    transition: Transition,
    scheduler: Scheduler<Deferred>,
    bus: EventBus,
    translate: f64,
    spec: TransitionSpec,
    disabled: bool,
    mounted: bool,
    destroyed: bool,
}

impl Reel {
    /// Create a reel over `item_count` items in a `viewport_width` viewport.
    ///
    /// The start index is `startAt` clamped into range. Nothing is published
    /// until [`mount`](Self::mount).
    pub fn new(
        settings: Settings,
        item_count: usize,
        viewport_width: f64,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let active = settings.matched(viewport_width);
        let geometry = StripGeometry::new(&active, viewport_width, item_count);
        let length = RunContext::new(&active, item_count).length();
        let index = active.start_at.min(length);
        let transition = Transition::new();
        let spec = transition.compose("transform", &active, false);
        Ok(Self {
            base: settings,
            settings: active,
            geometry,
            index,
            run: Run::new(),
            movement: Movement::new(),
            pipeline: Pipeline::new(),
            transition,
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            translate: 0.0,
            spec,
            disabled: false,
            mounted: false,
            destroyed: false,
        })
    }

    /// Add a custom translation stage (builder pattern). It runs before the
    /// direction mirror.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.pipeline.push(stage);
        self
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Build the strip: `mount.before`, `build.before`, a silent move to the
    /// start index, `build.after`, `mount.after`.
    pub fn mount(&mut self) {
        if self.mounted || self.destroyed {
            return;
        }
        self.mounted = true;
        self.emit(Event::MountBefore);
        self.transition.disable();
        self.emit(Event::BuildBefore);
        self.make_move(0.0);
        self.emit(Event::BuildAfter);
        self.emit(Event::MountAfter);
        tracing::debug!(index = self.index, length = self.length(), "mounted");
    }

    /// Process a movement command.
    ///
    /// Returns `Ok(true)` when the command ran and `Ok(false)` when it was
    /// dropped because the reel is disabled, unmounted or destroyed.
    pub fn go(&mut self, pattern: &str) -> Result<bool, CommandError> {
        let command = Command::parse(pattern).inspect_err(|err| {
            tracing::warn!(pattern, %err, "command rejected");
        })?;
        let Some(motion) = command.motion(self.settings.per_view) else {
            let err = CommandError::InvalidPattern(pattern.to_owned());
            tracing::warn!(pattern, %err, "command rejected");
            return Err(err);
        };
        if !self.accepts_commands() {
            tracing::debug!(pattern, "command dropped");
            return Ok(false);
        }
        if !self.scheduler.is_empty() {
            self.settle();
        }
        if self.settings.wait_for_transition {
            self.disabled = true;
        }

        self.emit(Event::RunBefore(command.clone()));
        let ctx = self.run_context();
        let from = self.index;
        self.index = self.run.calculate(command.clone(), motion, from, &ctx);
        tracing::debug!(
            pattern,
            from,
            to = self.index,
            offset = self.run.is_offset(None),
            "run"
        );
        self.emit(Event::Run(command.clone()));
        self.transition.enable();
        self.make_move(0.0);

        let delay = self.delay();
        self.scheduler.schedule(delay, Deferred::RunAfter(command));
        Ok(true)
    }

    /// Displace the strip by `offset` pixels on top of the current index
    /// (drag). Publishes `move` now and `move.after` after the transition.
    pub fn apply_move(&mut self, offset: f64) {
        if !self.mounted || self.destroyed {
            return;
        }
        self.make_move(offset);
    }

    /// Advance time by `dt`, running every task that became due. Returns how
    /// many ran.
    pub fn tick(&mut self, dt: Duration) -> usize {
        if self.destroyed {
            return 0;
        }
        let due = self.scheduler.tick(dt);
        let ran = due.len();
        for task in due {
            self.execute(task);
        }
        ran
    }

    /// Run every pending task immediately, in due order.
    pub fn settle(&mut self) -> usize {
        let mut ran = 0;
        while !self.destroyed {
            let tasks = self.scheduler.drain();
            if tasks.is_empty() {
                break;
            }
            ran += tasks.len();
            for task in tasks {
                self.execute(task);
            }
        }
        ran
    }

    /// Merge `patch` into the settings, re-match breakpoints and re-apply the
    /// translation. A patch that sets `startAt` also moves the index there.
    pub fn update(&mut self, patch: SettingsPatch) -> Result<(), SettingsError> {
        if self.destroyed {
            return Ok(());
        }
        self.base.merge(&patch).inspect_err(|err| {
            tracing::warn!(%err, "settings update rejected");
        })?;
        if let Some(start) = patch.start_at {
            self.index = start;
        }
        self.refresh(self.geometry.viewport_width());
        self.emit(Event::Update(patch));
        self.make_move(0.0);
        Ok(())
    }

    /// Set one option from its textual form (see [`SettingsPatch::with_option`]).
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let patch = SettingsPatch::new()
            .with_option(key, value)
            .inspect_err(|err| tracing::warn!(key, value, %err, "option rejected"))?;
        self.update(patch)
    }

    /// React to a new viewport width: re-match breakpoints, recompute
    /// geometry and snap to the current index without animating.
    pub fn resize(&mut self, viewport_width: f64) {
        if self.destroyed {
            return;
        }
        let previous = self.settings.per_view;
        self.refresh(viewport_width);
        if previous != self.settings.per_view {
            tracing::debug!(
                viewport_width,
                per_view = self.settings.per_view,
                "breakpoint changed"
            );
        }
        self.transition.disable();
        self.emit(Event::Resize { viewport_width });
        self.make_move(0.0);
    }

    /// Stop accepting commands.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Accept commands again.
    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Tear down: publish `destroy`, cancel every pending task and drop all
    /// subscriptions. Later calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.emit(Event::Destroy);
        let cancelled = self.scheduler.cancel_all();
        self.bus.clear();
        self.destroyed = true;
        tracing::debug!(cancelled, "destroyed");
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe to events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(kind, handler)
    }

    /// Subscribe to every event.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.bus.subscribe_all(handler)
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Canonical index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Highest valid index.
    #[must_use]
    pub fn length(&self) -> usize {
        self.run_context().length()
    }

    /// Whether the index is the first one.
    #[must_use]
    pub fn is_start(&self) -> bool {
        Run::is_start(self.index)
    }

    /// Whether the index is the last one.
    #[must_use]
    pub fn is_end(&self) -> bool {
        Run::is_end(self.index, &self.run_context())
    }

    /// Offset flag of the current run, optionally matched against a pattern.
    #[must_use]
    pub fn is_offset(&self, pattern: Option<&str>) -> bool {
        self.run.is_offset(pattern)
    }

    /// Whether bound mode is in effect.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.run_context().is_bound()
    }

    /// Whether commands are currently dropped.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether [`mount`](Self::mount) has run.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether [`destroy`](Self::destroy) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Last applied translation in pixels.
    #[must_use]
    pub fn translate(&self) -> f64 {
        self.translate
    }

    /// Transition descriptor for the last applied translation.
    #[must_use]
    pub fn transition(&self) -> &TransitionSpec {
        &self.spec
    }

    /// Settings in effect (breakpoint applied).
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current geometry.
    #[must_use]
    pub fn geometry(&self) -> &StripGeometry {
        &self.geometry
    }

    /// Current drag offset.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.movement.offset()
    }

    /// Number of tasks waiting for the transition to finish.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Mirror a physical pattern for the configured direction.
    #[must_use]
    pub fn resolve<'a>(&self, pattern: &'a str) -> Cow<'a, str> {
        self.settings.direction.resolve(pattern)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn accepts_commands(&self) -> bool {
        self.mounted && !self.destroyed && !self.disabled
    }

    fn emit(&mut self, event: Event) {
        self.bus.publish(&event);
    }

    fn run_context(&self) -> RunContext {
        RunContext::new(&self.settings, self.geometry.item_count())
    }

    fn delay(&self) -> Duration {
        self.transition
            .delay(&self.settings, self.run.is_offset(None))
    }

    fn refresh(&mut self, viewport_width: f64) {
        self.settings = self.base.matched(viewport_width);
        self.geometry = StripGeometry::new(&self.settings, viewport_width, self.geometry.item_count());
        self.index = self.index.min(self.run_context().length());
    }

    fn move_context(&self, index: isize) -> MoveContext {
        let movement = self
            .movement
            .value(&self.geometry, index, self.settings.direction);
        let ctx = StageContext {
            geometry: &self.geometry,
            settings: &self.settings,
        };
        MoveContext {
            movement,
            translate: self.pipeline.resolve(movement, &ctx),
        }
    }

    fn set_translate(&mut self, value: f64) {
        self.translate = value;
        self.spec = self
            .transition
            .compose("transform", &self.settings, self.run.is_offset(None));
    }

    fn make_move(&mut self, offset: f64) {
        self.movement.set_offset(offset);
        let wrapping = self.settings.is_type(ReelType::Carousel) && self.run.is_offset(None);
        let target = if wrapping {
            self.run.raw_index()
        } else {
            self.index as isize
        };
        let ctx = self.move_context(target);
        self.set_translate(ctx.translate);
        self.emit(Event::Move(ctx));

        let delay = self.delay();
        if wrapping {
            self.scheduler.schedule(delay, Deferred::Jump { index: self.index });
        }
        self.scheduler.schedule(delay, Deferred::MoveAfter);
    }

    fn execute(&mut self, task: Deferred) {
        match task {
            Deferred::Jump { index } => {
                let ctx = self.move_context(index as isize);
                self.emit(Event::TranslateJump(ctx));
                self.transition.disable();
                self.set_translate(ctx.translate);
            }
            Deferred::MoveAfter => {
                let ctx = self.move_context(self.index as isize);
                self.emit(Event::MoveAfter(ctx));
            }
            Deferred::RunAfter(command) => {
                if self.is_start() {
                    self.emit(Event::RunStart(command.clone()));
                }
                if self.is_end() {
                    self.emit(Event::RunEnd(command.clone()));
                }
                if self.run.take_offset() {
                    self.emit(Event::RunOffset(command.clone()));
                }
                self.emit(Event::RunAfter(command));
                self.disabled = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted(settings: Settings, count: usize, viewport: f64) -> Reel {
        let mut reel = Reel::new(settings, count, viewport).unwrap();
        reel.mount();
        reel.settle();
        reel
    }

    #[test]
    fn start_index_is_clamped() {
        let reel = Reel::new(Settings::new().start_at(9), 3, 300.0).unwrap();
        assert_eq!(reel.index(), 2);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert_eq!(
            Reel::new(Settings::new().per_view(0), 3, 300.0).unwrap_err(),
            SettingsError::ZeroPerView
        );
    }

    #[test]
    fn mount_snaps_to_start_without_animation() {
        let reel = mounted(Settings::new().gap(0).start_at(2), 5, 200.0);
        assert_eq!(reel.translate(), 400.0);
        assert_eq!(reel.transition().duration, Duration::ZERO);
    }

    #[test]
    fn commands_before_mount_are_dropped() {
        let mut reel = Reel::new(Settings::new(), 3, 300.0).unwrap();
        assert_eq!(reel.go(">"), Ok(false));
        assert_eq!(reel.index(), 0);
    }

    #[test]
    fn go_moves_and_animates() {
        let mut reel = mounted(Settings::new().gap(0), 5, 200.0);
        assert_eq!(reel.go(">"), Ok(true));
        assert_eq!(reel.index(), 1);
        assert_eq!(reel.translate(), 200.0);
        assert_eq!(reel.transition().duration, Duration::from_millis(400));
        assert!(reel.is_disabled());
        assert_eq!(reel.go(">"), Ok(false));
        reel.tick(Duration::from_millis(400));
        assert!(!reel.is_disabled());
        assert_eq!(reel.go(">"), Ok(true));
        assert_eq!(reel.index(), 2);
    }

    #[test]
    fn invalid_pattern_mutates_nothing() {
        let mut reel = mounted(Settings::new(), 5, 200.0);
        assert_eq!(
            reel.go("|3"),
            Err(CommandError::InvalidPattern("|3".to_owned()))
        );
        assert!(matches!(reel.go(""), Err(CommandError::Malformed(_))));
        assert_eq!(reel.index(), 0);
        assert!(!reel.is_disabled());
        assert_eq!(reel.pending_tasks(), 0);
    }

    #[test]
    fn update_start_at_moves_index() {
        let mut reel = mounted(Settings::new(), 5, 200.0);
        reel.update(SettingsPatch {
            start_at: Some(3),
            ..SettingsPatch::default()
        })
        .unwrap();
        assert_eq!(reel.index(), 3);
    }

    #[test]
    fn update_clamps_index_into_new_length() {
        let mut reel = mounted(Settings::new().start_at(4), 5, 500.0);
        reel.set_option("bound", "true").unwrap();
        reel.set_option("perView", "3").unwrap();
        assert_eq!(reel.length(), 2);
        assert_eq!(reel.index(), 2);
    }

    #[test]
    fn rejected_update_keeps_settings() {
        let mut reel = mounted(Settings::new(), 5, 200.0);
        assert!(reel.set_option("perView", "0").is_err());
        assert!(reel.set_option("direction", "up").is_err());
        assert_eq!(reel.settings().per_view, 1);
    }

    #[test]
    fn drag_offset_shifts_translation() {
        let mut reel = mounted(Settings::new().gap(0), 5, 200.0);
        reel.apply_move(30.5);
        assert_eq!(reel.offset(), 30);
        assert_eq!(reel.translate(), -30.0);
        reel.settle();
        reel.go(">").unwrap();
        assert_eq!(reel.offset(), 0);
        assert_eq!(reel.translate(), 200.0);
    }

    #[test]
    fn resolve_uses_configured_direction() {
        let reel = mounted(Settings::new().direction(reel_core::direction::Direction::Rtl), 3, 100.0);
        assert_eq!(reel.resolve(">"), "<");
    }
}
