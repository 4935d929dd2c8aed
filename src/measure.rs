//! The `Measurable` protocol consumed by the engine, see spec §6.1, and the
//! measurement cache described in spec §9 ("Measurement caching").

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Error;
use crate::frame::Frame;
use crate::geom::{Abs, Size};

/// External protocol for inquiring a cell body's natural size and producing
/// a realized frame from it. Implementations must be deterministic: equal
/// inputs must produce equal outputs (spec §6.1), since the engine may call
/// `measure_height` many times for the same cell at the same width.
pub trait Measurable {
    /// The cell's natural width, measured at unbounded height.
    fn measure_width(&self) -> Abs;

    /// The cell's natural height at the given width.
    fn measure_height(&self, width: Abs) -> Abs;

    /// Produces a positioned frame of exactly `size`.
    fn realize(&self, size: Size) -> Frame;
}

/// Validates a dimension returned by a [`Measurable`], turning a negative or
/// non-finite value into [`Error::MeasurableFailure`] (spec §7).
pub(crate) fn check_dimension(value: Abs, x: usize, y: usize) -> Result<Abs, Error> {
    if !value.is_finite() || value.is_nan() || value.to_pt() < 0.0 {
        Err(Error::MeasurableFailure { x, y })
    } else {
        Ok(value)
    }
}

/// A content-addressed cache over `measure_height`, keyed by `(cell id,
/// width)`. This is purely an implementation detail (spec §9): repeated
/// measurement of the same cell at the same width short-circuits the call
/// into the (possibly expensive) `Measurable` implementation.
#[derive(Default)]
pub(crate) struct MeasureCache {
    heights: RefCell<HashMap<(usize, u64), Abs>>,
}

impl MeasureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measures `cell`'s height at `width`, reusing a previous measurement
    /// for the same `(cell_id, width)` pair if one exists.
    pub fn height(&self, cell_id: usize, body: &dyn Measurable, width: Abs) -> Abs {
        let key = (cell_id, width.to_bits());
        if let Some(&cached) = self.heights.borrow().get(&key) {
            return cached;
        }
        let height = body.measure_height(width);
        self.heights.borrow_mut().insert(key, height);
        height
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell as StdCell;

    /// A trivial fixed-size test double for [`Measurable`].
    pub struct FixedCell {
        pub width: Abs,
        pub height: Abs,
        pub calls: StdCell<u32>,
    }

    impl FixedCell {
        pub fn new(width: f64, height: f64) -> Self {
            Self { width: Abs::pt(width), height: Abs::pt(height), calls: StdCell::new(0) }
        }
    }

    impl Measurable for FixedCell {
        fn measure_width(&self) -> Abs {
            self.width
        }

        fn measure_height(&self, _width: Abs) -> Abs {
            self.calls.set(self.calls.get() + 1);
            self.height
        }

        fn realize(&self, size: Size) -> Frame {
            Frame::new(size)
        }
    }

    #[test]
    fn cache_reuses_measurement_for_same_width() {
        let cache = MeasureCache::new();
        let cell = FixedCell::new(10.0, 20.0);
        assert_eq!(cache.height(0, &cell, Abs::pt(10.0)).to_pt(), 20.0);
        assert_eq!(cache.height(0, &cell, Abs::pt(10.0)).to_pt(), 20.0);
        assert_eq!(cell.calls.get(), 1);
    }

    #[test]
    fn cache_remeasures_for_different_width() {
        let cache = MeasureCache::new();
        let cell = FixedCell::new(10.0, 20.0);
        cache.height(0, &cell, Abs::pt(10.0));
        cache.height(0, &cell, Abs::pt(20.0));
        assert_eq!(cell.calls.get(), 2);
    }

    #[test]
    fn check_dimension_rejects_negative() {
        assert!(check_dimension(Abs::pt(-1.0), 0, 0).is_err());
    }

    #[test]
    fn check_dimension_rejects_infinite() {
        assert!(check_dimension(Abs::inf(), 0, 0).is_err());
    }
}
