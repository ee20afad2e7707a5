#![forbid(unsafe_code)]

//! Translation pipeline.
//!
//! Converts a raw index-based distance (`item_width * index ∓ drag`) into the
//! pixel translation the presentation layer applies to the strip. The raw
//! value is folded through an ordered list of [`Stage`]s:
//!
//! | # | Stage | Effect |
//! |---|-------|--------|
//! | 1 | [`GapStage`] | `+ gap * floor(v / item_width)` |
//! | 2 | [`CloneStage`] | `+ clones_grow / 2` |
//! | 3 | [`PeekStage`] | `- peek.before` when focus is a slot index |
//! | 4 | [`FocusStage`] | shift the active item into its focus slot |
//! | … | custom stages | see [`Pipeline::push`] |
//! | last | [`MirrorStage`] | negate under `rtl` |
//!
//! # Invariants
//!
//! 1. The mirror stage is always last, so it reflects every prior stage.
//! 2. Stages are pure: they read geometry and settings at call time and
//!    keep no state, so equal inputs give equal outputs.

use std::fmt;

use crate::geometry::Geometry;
use crate::settings::{FocusAt, Settings};

/// Inputs every stage may read.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    /// Current geometry.
    pub geometry: &'a dyn Geometry,
    /// Current (breakpoint-resolved) settings.
    pub settings: &'a Settings,
}

impl fmt::Debug for StageContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("item_width", &self.geometry.item_width())
            .field("viewport_width", &self.geometry.viewport_width())
            .field("settings", self.settings)
            .finish()
    }
}

/// One value transformer.
pub trait Stage {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Transform `value`.
    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64;
}

// ---------------------------------------------------------------------------
// Built-in stages
// ---------------------------------------------------------------------------

/// Adds the gap pixels accumulated per item crossed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapStage;

impl Stage for GapStage {
    fn name(&self) -> &str {
        "gap"
    }

    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64 {
        let width = ctx.geometry.item_width();
        if width <= 0.0 {
            return value;
        }
        value + ctx.geometry.gap() * (value / width).floor()
    }
}

/// Skips past the synthetic clones prepended in carousel mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneStage;

impl Stage for CloneStage {
    fn name(&self) -> &str {
        "clones"
    }

    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64 {
        value + ctx.geometry.clones_grow() / 2.0
    }
}

/// Reveals the leading peek when the focus is a slot index.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeekStage;

impl Stage for PeekStage {
    fn name(&self) -> &str {
        "peek"
    }

    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64 {
        match ctx.settings.focus_at {
            FocusAt::Index(_) => value - f64::from(ctx.geometry.peek().before()),
            FocusAt::Center => value,
        }
    }
}

/// Moves the active item from the leading edge to its focus slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusStage;

impl Stage for FocusStage {
    fn name(&self) -> &str {
        "focus"
    }

    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64 {
        let width = ctx.geometry.item_width();
        match ctx.settings.focus_at {
            FocusAt::Center => value - (ctx.geometry.viewport_width() / 2.0 - width / 2.0),
            FocusAt::Index(slot) => {
                let slot = slot as f64;
                value - width * slot - ctx.geometry.gap() * slot
            }
        }
    }
}

/// Negates the value for right-to-left strips.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorStage;

impl Stage for MirrorStage {
    fn name(&self) -> &str {
        "direction"
    }

    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64 {
        if ctx.settings.direction.is_rtl() {
            -value
        } else {
            value
        }
    }
}

/// Adapter turning a closure into a [`Stage`].
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(f64, &StageContext<'_>) -> f64,
{
    /// Wrap `f` under `name`.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(f64, &StageContext<'_>) -> f64,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn modify(&self, value: f64, ctx: &StageContext<'_>) -> f64 {
        (self.f)(value, ctx)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Ordered stage list, built once per reel.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    mirror: MirrorStage,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Built-in stages: gap, clones, peek, focus, direction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: vec![
                Box::new(GapStage),
                Box::new(CloneStage),
                Box::new(PeekStage),
                Box::new(FocusStage),
            ],
            mirror: MirrorStage,
        }
    }

    /// Append a custom stage. It runs after every earlier stage and before
    /// the direction mirror.
    pub fn push(&mut self, stage: impl Stage + 'static) {
        crate::trace!(stage = stage.name(), "pipeline stage added");
        self.stages.push(Box::new(stage));
    }

    /// Append a custom stage (builder pattern).
    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.push(stage);
        self
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(self.mirror.name()))
            .collect()
    }

    /// Fold `raw` through every stage.
    #[must_use]
    pub fn resolve(&self, raw: f64, ctx: &StageContext<'_>) -> f64 {
        let value = self
            .stages
            .iter()
            .fold(raw, |value, stage| stage.modify(value, ctx));
        self.mirror.modify(value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::geometry::StripGeometry;
    use crate::settings::{Peek, ReelType};

    fn resolve_with(stage: &dyn Stage, value: f64, settings: &Settings, viewport: f64) -> f64 {
        let geometry = StripGeometry::new(settings, viewport, 5);
        stage.modify(value, &StageContext { geometry: &geometry, settings })
    }

    #[test]
    fn gap_stage_adds_gap_per_item_crossed() {
        let s = Settings::new().gap(20);
        // item width 500: two items crossed -> +40
        assert_eq!(resolve_with(&GapStage, 1000.0, &s, 500.0), 1040.0);
        assert_eq!(resolve_with(&GapStage, -500.0, &s, 500.0), -520.0);
    }

    #[test]
    fn gap_stage_ignores_zero_width() {
        let s = Settings::new().gap(20).peek(Peek::Uniform(300));
        assert_eq!(resolve_with(&GapStage, 100.0, &s, 500.0), 100.0);
    }

    #[test]
    fn clone_stage_shifts_half_of_clones() {
        let s = Settings::new().kind(ReelType::Carousel).gap(0);
        // 4 clones of 100px
        assert_eq!(resolve_with(&CloneStage, 0.0, &s, 100.0), 200.0);
        let slider = Settings::new().gap(0);
        assert_eq!(resolve_with(&CloneStage, 0.0, &slider, 100.0), 0.0);
    }

    #[test]
    fn peek_stage_only_applies_to_indexed_focus() {
        let s = Settings::new().peek(Peek::Split { before: 40, after: 10 });
        assert_eq!(resolve_with(&PeekStage, 100.0, &s, 600.0), 60.0);
        let centered = s.clone().focus_at(FocusAt::Center);
        assert_eq!(resolve_with(&PeekStage, 100.0, &centered, 600.0), 100.0);
        let uniform = Settings::new().peek(Peek::Uniform(25));
        assert_eq!(resolve_with(&PeekStage, 100.0, &uniform, 600.0), 75.0);
    }

    #[test]
    fn focus_center_subtracts_half_viewport_minus_half_item() {
        let s = Settings::new().per_view(3).gap(0).focus_at(FocusAt::Center);
        // item 100, viewport 300
        assert_eq!(resolve_with(&FocusStage, 500.0, &s, 300.0), 400.0);
    }

    #[test]
    fn focus_slot_subtracts_items_and_gaps() {
        let s = Settings::new().per_view(2).gap(10).focus_at(FocusAt::Index(1));
        // item = 410 / 2 - 10 / 2 = 200
        assert_eq!(resolve_with(&FocusStage, 600.0, &s, 410.0), 390.0);
    }

    #[test]
    fn mirror_stage_negates_rtl() {
        let rtl = Settings::new().direction(Direction::Rtl);
        assert_eq!(resolve_with(&MirrorStage, 120.0, &rtl, 100.0), -120.0);
        assert_eq!(resolve_with(&MirrorStage, 120.0, &Settings::new(), 100.0), 120.0);
    }

    #[test]
    fn default_order() {
        assert_eq!(
            Pipeline::new().stage_names(),
            ["gap", "clones", "peek", "focus", "direction"]
        );
    }

    #[test]
    fn custom_stages_run_before_mirror() {
        let pipeline = Pipeline::new().with_stage(FnStage::new("nudge", |v, _| v + 5.0));
        assert_eq!(
            pipeline.stage_names(),
            ["gap", "clones", "peek", "focus", "nudge", "direction"]
        );
        let s = Settings::new().gap(0).direction(Direction::Rtl);
        let g = StripGeometry::new(&s, 100.0, 3);
        let ctx = StageContext { geometry: &g, settings: &s };
        // 200 + 5, then mirrored
        assert_eq!(pipeline.resolve(200.0, &ctx), -205.0);
    }

    #[test]
    fn full_pipeline_with_gap_and_peek() {
        let s = Settings::new().gap(10).peek(Peek::Uniform(50));
        let g = StripGeometry::new(&s, 700.0, 4);
        // item = 700 - 100 = 600; raw 1200 -> +20 gap -> -50 peek
        let ctx = StageContext { geometry: &g, settings: &s };
        assert_eq!(Pipeline::new().resolve(1200.0, &ctx), 1170.0);
    }
}
