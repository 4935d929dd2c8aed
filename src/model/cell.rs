//! The `Cell` type, see spec §3.

use crate::geom::{Align, Axes, Sides};
use crate::measure::Measurable;
use crate::stroke::StrokeOverride;

/// A single origin cell in the grid, owning its content and span.
pub struct Cell {
    /// Stable identity used as the key into the measurement cache, and
    /// assigned by [`super::grid::GridBuilder`] in cell-insertion order.
    pub(crate) id: usize,
    /// Column origin.
    pub x: usize,
    /// Row origin.
    pub y: usize,
    /// Number of columns spanned, at least 1.
    pub colspan: usize,
    /// Number of rows spanned, at least 1.
    pub rowspan: usize,
    /// The opaque cell body.
    pub body: Box<dyn Measurable>,
    /// The cell's fill, if any.
    pub fill: Option<crate::stroke::Paint>,
    /// Per-side stroke overrides; `Inherit` means "use the grid default".
    pub stroke: Sides<StrokeOverride>,
    /// Whether the rows spanned by this cell may be split across regions.
    pub breakable: bool,
    /// Content alignment within the cell's resolved box.
    pub align: Axes<Align>,
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("colspan", &self.colspan)
            .field("rowspan", &self.rowspan)
            .field("fill", &self.fill)
            .field("stroke", &self.stroke)
            .field("breakable", &self.breakable)
            .field("align", &self.align)
            .finish()
    }
}

impl Cell {
    /// Creates a cell with default styling: breakable, start-aligned, no
    /// fill, no stroke overrides.
    pub fn new(x: usize, y: usize, body: impl Measurable + 'static) -> Self {
        Self {
            id: 0,
            x,
            y,
            colspan: 1,
            rowspan: 1,
            body: Box::new(body),
            fill: None,
            stroke: Sides::splat(StrokeOverride::Inherit),
            breakable: true,
            align: Axes::splat(Align::Start),
        }
    }

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan.max(1);
        self
    }

    pub fn with_rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan.max(1);
        self
    }

    pub fn with_fill(mut self, fill: crate::stroke::Paint) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: Sides<StrokeOverride>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_breakable(mut self, breakable: bool) -> Self {
        self.breakable = breakable;
        self
    }

    pub fn with_align(mut self, align: Axes<Align>) -> Self {
        self.align = align;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }
}
