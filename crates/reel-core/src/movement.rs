#![forbid(unsafe_code)]

//! Movement accumulator.
//!
//! Holds the transient pixel offset of an in-progress drag and layers it on
//! the index-derived translation. Discrete moves reset the offset to zero.

use crate::direction::Direction;
use crate::geometry::Geometry;

/// Drag displacement on top of the canonical translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    offset: i32,
}

impl Movement {
    /// Accumulator with no displacement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pixel offset.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Set the pixel offset, truncating toward zero. Non-finite input is 0.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = if offset.is_finite() {
            offset.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
        } else {
            0
        };
    }

    /// Drop any displacement.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Index-derived translation before the offset: `item_width * index`.
    #[must_use]
    pub fn base(geometry: &dyn Geometry, index: isize) -> f64 {
        geometry.item_width() * index as f64
    }

    /// Translation for `index` with the offset applied.
    ///
    /// Dragging toward the trailing edge reduces the translation in `ltr`
    /// and increases it in `rtl`.
    #[must_use]
    pub fn value(&self, geometry: &dyn Geometry, index: isize, direction: Direction) -> f64 {
        let base = Self::base(geometry, index);
        let offset = f64::from(self.offset);
        if direction.is_rtl() {
            base + offset
        } else {
            base - offset
        }
    }
}
