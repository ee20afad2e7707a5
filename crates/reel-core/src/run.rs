#![forbid(unsafe_code)]

//! Index resolver.
//!
//! [`Run`] turns a [`Motion`] and the current canonical index into the next
//! canonical index under the configured movement mode, and remembers whether
//! that step crossed a logical boundary (the *offset* flag).
//!
//! # Paging arithmetic
//!
//! In `slider` mode forward and backward moves snap to page boundaries of
//! the view size, so paging from any index lands on multiples of the view:
//!
//! ```text
//! forward  raw = index + (view - index % view)
//! backward raw = (ceil(index / view) - 1) * view
//! ```
//!
//! In `carousel` mode moves are plain deltas and out-of-range results wrap
//! by `length + 1`.
//!
//! # Invariants
//!
//! 1. The returned index is always in `[0, length]`.
//! 2. The offset flag is set only by forward overflow or backward underflow,
//!    and stays set until [`Run::take_offset`] or [`Run::reset_offset`].
//! 3. Jumps (`=`, `>>`, `<<`) never set the offset flag.
//!
//! # Failure Modes
//!
//! - Empty strip: `length` is 0, every move resolves to 0.

use crate::command::{Command, Motion};
use crate::settings::{FocusAt, ReelType, Settings};

/// Everything `calculate` reads besides the index itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Movement mode.
    pub kind: ReelType,
    /// Number of real items.
    pub item_count: usize,
    /// Items per view.
    pub per_view: usize,
    /// Focus slot.
    pub focus_at: FocusAt,
    /// `bound` option.
    pub bound: bool,
    /// `rewind` option.
    pub rewind: bool,
}

impl RunContext {
    /// Context for `item_count` items under `settings`.
    #[must_use]
    pub fn new(settings: &Settings, item_count: usize) -> Self {
        Self {
            kind: settings.kind,
            item_count,
            per_view: settings.per_view.max(1),
            focus_at: settings.focus_at,
            bound: settings.bound,
            rewind: settings.rewind,
        }
    }

    /// Slider, not centered, and `bound` set.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.kind == ReelType::Slider && self.focus_at != FocusAt::Center && self.bound
    }

    /// Highest valid canonical index.
    ///
    /// `item_count - 1`, reduced by `(perView - 1) - focusAt` in bound mode so
    /// the last page is full.
    #[must_use]
    pub fn length(&self) -> usize {
        let last = self.item_count.saturating_sub(1);
        if !self.is_bound() {
            return last;
        }
        let focus = self.focus_at.index().unwrap_or(0);
        (last + focus).saturating_sub(self.per_view - 1)
    }

    fn is_carousel(&self) -> bool {
        self.kind == ReelType::Carousel
    }
}

/// Index resolver state.
#[derive(Debug, Clone, Default)]
pub struct Run {
    command: Option<Command>,
    offset: bool,
    raw: isize,
}

impl Run {
    /// Fresh resolver with no command processed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last processed command.
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Unnormalized index produced by the last forward/backward move.
    ///
    /// Equals the resolved index unless the move crossed a boundary; in
    /// carousel mode it addresses the synthetic clone the strip animates to
    /// before jumping back.
    #[must_use]
    pub fn raw_index(&self) -> isize {
        self.raw
    }

    /// Offset flag.
    ///
    /// With `None` returns the flag; with a pattern (`">"`, `"<"`, `"|>"`,
    /// `"|<"`) returns whether the flag is set *and* the last command matches.
    #[must_use]
    pub fn is_offset(&self, pattern: Option<&str>) -> bool {
        match pattern {
            None => self.offset,
            Some(p) => self.offset && self.command.as_ref().is_some_and(|c| c.matches(p)),
        }
    }

    /// Consume the offset flag.
    pub fn take_offset(&mut self) -> bool {
        std::mem::take(&mut self.offset)
    }

    /// Clear the offset flag without reading it.
    pub fn reset_offset(&mut self) {
        self.offset = false;
    }

    /// `index <= 0`.
    #[must_use]
    pub fn is_start(index: usize) -> bool {
        index == 0
    }

    /// `index >= length`.
    #[must_use]
    pub fn is_end(index: usize, ctx: &RunContext) -> bool {
        index >= ctx.length()
    }

    /// Resolve `command` from `index`, returning the next canonical index.
    ///
    /// `motion` is `command` interpreted for `ctx.per_view`; the command
    /// itself is kept for later [`is_offset`](Self::is_offset) queries.
    pub fn calculate(
        &mut self,
        command: Command,
        motion: Motion,
        index: usize,
        ctx: &RunContext,
    ) -> usize {
        self.command = Some(command);
        let length = ctx.length();
        let next = match motion {
            Motion::Jump(target) => clamp_index(target, length),
            Motion::ToEnd => length,
            Motion::ToStart => 0,
            Motion::Forward(view) => {
                let raw = forward_raw(index, view, ctx);
                self.raw = raw;
                if raw > length as isize {
                    self.offset = true;
                }
                normalize_forward(raw, view, index, ctx)
            }
            Motion::Backward(view) => {
                let raw = backward_raw(index, view, ctx);
                self.raw = raw;
                if raw < 0 {
                    self.offset = true;
                }
                normalize_backward(raw, view, index, ctx)
            }
        };
        if matches!(motion, Motion::Jump(_) | Motion::ToEnd | Motion::ToStart) {
            self.raw = next as isize;
        }
        crate::debug!(
            from = index,
            to = next,
            raw = self.raw,
            offset = self.offset,
            "index resolved"
        );
        next
    }
}

fn clamp_index(target: i64, length: usize) -> usize {
    usize::try_from(target.max(0)).map_or(length, |t| t.min(length))
}

fn forward_raw(index: usize, view: usize, ctx: &RunContext) -> isize {
    let (index, view) = (index as isize, view as isize);
    if ctx.is_carousel() {
        return index + view;
    }
    index + (view - index % view)
}

fn backward_raw(index: usize, view: usize, ctx: &RunContext) -> isize {
    let (index, view) = (index as isize, view as isize);
    if ctx.is_carousel() {
        return index - view;
    }
    let page = (index + view - 1) / view;
    (page - 1) * view
}

fn last_full_page(length: usize, view: usize) -> usize {
    (length / view) * view
}

fn normalize_forward(raw: isize, view: usize, index: usize, ctx: &RunContext) -> usize {
    let length = ctx.length();
    if raw <= length as isize {
        return raw.max(0) as usize;
    }
    if ctx.is_carousel() {
        return wrap(raw - (length as isize + 1), length);
    }
    if ctx.rewind {
        if ctx.is_bound() && !Run::is_end(index, ctx) {
            return length;
        }
        return 0;
    }
    if ctx.is_bound() {
        return length;
    }
    last_full_page(length, view)
}

fn normalize_backward(raw: isize, view: usize, index: usize, ctx: &RunContext) -> usize {
    let length = ctx.length();
    if raw >= 0 {
        return (raw as usize).min(length);
    }
    if ctx.is_carousel() {
        return wrap(raw + (length as isize + 1), length);
    }
    if ctx.rewind {
        if ctx.is_bound() && Run::is_start(index) {
            return length;
        }
        return last_full_page(length, view);
    }
    0
}

/// Keep multi-lap carousel steps (view larger than the strip) in range.
fn wrap(value: isize, length: usize) -> usize {
    value.rem_euclid(length as isize + 1) as usize
}
