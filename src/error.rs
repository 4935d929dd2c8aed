//! Error kinds, see spec §7.

use thiserror::Error;

use crate::frame::Frame;

/// The three error kinds the engine can surface, see spec §7.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Detected at grid construction: out-of-bounds span, overlapping
    /// cells, or a negative track size.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A [`crate::measure::Measurable`] returned a negative or non-finite
    /// dimension for the cell at `(x, y)`.
    #[error("measurable returned a negative or non-finite dimension for cell at ({x}, {y})")]
    MeasurableFailure { x: usize, y: usize },

    /// An unbreakable row, or an unbreakable rowspanning cell, did not fit
    /// even in a fresh, empty region.
    #[error("unbreakable content did not fit in a fresh region")]
    OverflowUnbreakable,
}

/// The result of a layout pass that failed partway through: the regions
/// produced before the failure are preserved rather than discarded (spec §7:
/// "the engine emits the region as-is... and returns this kind").
#[derive(Debug)]
pub struct LayoutError {
    pub frames: Vec<Frame>,
    pub kind: Error,
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} region(s) produced before failure)", self.kind, self.frames.len())
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
