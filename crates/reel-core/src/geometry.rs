#![forbid(unsafe_code)]

//! Strip geometry: item widths, gaps, peeking and synthetic clones.
//!
//! The index resolver and the translation pipeline never measure anything
//! themselves; they read numbers through the [`Geometry`] trait. Hosts that
//! measure real layout can implement it directly. [`StripGeometry`] derives
//! every value from settings, the viewport width and the item count.
//!
//! # Formulas
//!
//! ```text
//! gaps_grow     = gap * (count - 1)
//! gaps_reductor = gap * (perView - 1) / perView
//! item_width    = viewport / perView - peek.reductor - gaps_reductor
//! clones_grow   = (item_width + gap) * clone_count      (carousel only)
//! wrapper_size  = item_width * count + gaps_grow + clones_grow
//! ```
//!
//! # Failure Modes
//!
//! - Zero items: `gaps_grow` and `clone_count` are 0.
//! - Peek and gaps wider than the viewport: `item_width` clamps to 0.

use crate::settings::{Peek, ReelType, Settings};

/// Read-only numeric inputs consumed by the engine.
pub trait Geometry {
    /// Number of real (non-clone) items.
    fn item_count(&self) -> usize;

    /// Width of the visible viewport.
    fn viewport_width(&self) -> f64;

    /// Width of a single item.
    fn item_width(&self) -> f64;

    /// Gap between neighbouring items.
    fn gap(&self) -> f64;

    /// Configured peek.
    fn peek(&self) -> Peek;

    /// Number of synthetic clones on both sides together.
    fn clone_count(&self) -> usize;

    /// Total width occupied by the synthetic clones.
    fn clones_grow(&self) -> f64 {
        (self.item_width() + self.gap()) * self.clone_count() as f64
    }
}

/// Geometry computed from settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripGeometry {
    viewport_width: f64,
    item_count: usize,
    per_view: usize,
    gap: f64,
    peek: Peek,
    kind: ReelType,
}

impl StripGeometry {
    /// Derive geometry for `item_count` items in a `viewport_width` viewport.
    #[must_use]
    pub fn new(settings: &Settings, viewport_width: f64, item_count: usize) -> Self {
        Self {
            viewport_width: viewport_width.max(0.0),
            item_count,
            per_view: settings.per_view.max(1),
            gap: f64::from(settings.gap),
            peek: settings.peek,
            kind: settings.kind,
        }
    }

    /// Same strip with new settings (after an update or breakpoint change).
    #[must_use]
    pub fn with_settings(self, settings: &Settings) -> Self {
        Self::new(settings, self.viewport_width, self.item_count)
    }

    /// Same strip in a resized viewport.
    #[must_use]
    pub fn with_viewport(self, viewport_width: f64) -> Self {
        Self {
            viewport_width: viewport_width.max(0.0),
            ..self
        }
    }

    /// Extra width added by the gaps between all items.
    #[must_use]
    pub fn gaps_grow(&self) -> f64 {
        self.gap * self.item_count.saturating_sub(1) as f64
    }

    /// Per-item share of the gaps inside one view.
    #[must_use]
    pub fn gaps_reductor(&self) -> f64 {
        let per_view = self.per_view as f64;
        self.gap * (per_view - 1.0) / per_view
    }

    /// Full width of the moving strip, clones included.
    #[must_use]
    pub fn wrapper_size(&self) -> f64 {
        self.item_width() * self.item_count as f64 + self.gaps_grow() + self.clones_grow()
    }

    /// Clones prepended (and, equally, appended) per side.
    #[must_use]
    pub fn clones_per_side(&self) -> usize {
        if self.kind != ReelType::Carousel || self.item_count == 0 {
            return 0;
        }
        let peek = usize::from(self.peek.is_set());
        let part = self.per_view + peek + self.per_view.div_ceil(2);
        let repeat = (part / self.item_count).max(1);
        part.min(self.item_count) * repeat
    }
}

impl Geometry for StripGeometry {
    fn item_count(&self) -> usize {
        self.item_count
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn item_width(&self) -> f64 {
        let width = self.viewport_width / self.per_view as f64
            - f64::from(self.peek.reductor())
            - self.gaps_reductor();
        width.max(0.0)
    }

    fn gap(&self) -> f64 {
        self.gap
    }

    fn peek(&self) -> Peek {
        self.peek
    }

    fn clone_count(&self) -> usize {
        self.clones_per_side() * 2
    }
}
