//! The resolved grid model, see spec §3 and §4.6.

use std::sync::Arc;

use super::cell::Cell;
use super::entry::Entry;
use super::header_footer::{Footer, Header};
use crate::error::Error;
use crate::geom::{Abs, Sizing};
use crate::stroke::Stroke;

/// An explicit line request from `hline`/`vline`, resolved against the track
/// it sits before/after. Consumed by [`crate::lines`] to generate segments.
#[derive(Clone, Debug)]
pub struct ExplicitLine {
    /// Index of the row (for an hline) or column (for a vline) the line is
    /// attached to.
    pub track: usize,
    /// Inclusive start track of the span the line covers, along the other axis.
    pub start: usize,
    /// Exclusive end track of the span the line covers, along the other axis.
    pub end: usize,
    pub stroke: Option<Arc<Stroke>>,
    pub position: LinePosition,
}

/// Whether an explicit line sits before or after its attached track, for
/// lines declared at a boundary shared by two tracks (spec §4.5).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinePosition {
    Before,
    After,
}

/// The fully resolved grid: tracks, the cell arena, the entry array, and the
/// header/footer/line metadata the layouter and line generator consume.
#[derive(Debug)]
pub struct Grid {
    pub col_count: usize,
    pub row_count: usize,
    pub cols: Vec<Sizing>,
    pub rows: Vec<Sizing>,
    pub col_gutter: Abs,
    pub row_gutter: Abs,
    /// Arena of cells, indexed by [`Entry::Cell`]/[`Entry::Merged`].
    pub cells: Vec<Cell>,
    /// Row-major, length `col_count * row_count`.
    pub entries: Vec<Entry>,
    pub headers: Vec<Header>,
    pub footer: Option<Footer>,
    pub hlines: Vec<ExplicitLine>,
    pub vlines: Vec<ExplicitLine>,
    /// The grid-wide default stroke (`StrokePriority::Grid`), if any.
    pub stroke: Option<Arc<Stroke>>,
    pub rtl: bool,
}

impl Grid {
    /// Resolves `cells` into the entry array, per spec §4.6: writes
    /// `Entry::Cell` at each origin and `Entry::Merged` at every other slot
    /// in its span, validating the invariants of spec §3.
    pub fn new(
        col_count: usize,
        row_count: usize,
        cols: Vec<Sizing>,
        rows: Vec<Sizing>,
        mut cells: Vec<Cell>,
    ) -> Result<Self, Error> {
        if cols.len() != col_count {
            return Err(Error::InvalidGrid(format!(
                "expected {col_count} column tracks, got {}",
                cols.len()
            )));
        }
        if rows.len() != row_count {
            return Err(Error::InvalidGrid(format!(
                "expected {row_count} row tracks, got {}",
                rows.len()
            )));
        }

        let mut entries = vec![Entry::Empty; col_count * row_count];
        for (idx, cell) in cells.iter_mut().enumerate() {
            cell.id = idx;
            let x_end = cell.x + cell.colspan;
            let y_end = cell.y + cell.rowspan;
            if x_end > col_count || y_end > row_count {
                return Err(Error::InvalidGrid(format!(
                    "cell at ({}, {}) with span ({}, {}) exceeds grid bounds ({col_count}, {row_count})",
                    cell.x, cell.y, cell.colspan, cell.rowspan
                )));
            }
            for yi in cell.y..y_end {
                for xi in cell.x..x_end {
                    let slot = &mut entries[yi * col_count + xi];
                    if !slot.is_empty() {
                        return Err(Error::InvalidGrid(format!(
                            "slot ({xi}, {yi}) is covered by more than one cell"
                        )));
                    }
                    *slot = if (xi, yi) == (cell.x, cell.y) {
                        Entry::Cell(idx)
                    } else {
                        Entry::Merged(idx)
                    };
                }
            }
        }

        Ok(Self {
            col_count,
            row_count,
            cols,
            rows,
            col_gutter: Abs::zero(),
            row_gutter: Abs::zero(),
            cells,
            entries,
            headers: Vec::new(),
            footer: None,
            hlines: Vec::new(),
            vlines: Vec::new(),
            stroke: None,
            rtl: false,
        })
    }

    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.col_count && y < self.row_count
    }

    /// Bounds-checked slot lookup; `None` when `(x, y)` is out of range.
    pub fn entry_at(&self, x: usize, y: usize) -> Option<&Entry> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.entries.get(y * self.col_count + x)
    }

    /// The origin cell at `(x, y)`, or `None` if the slot is empty, merged,
    /// or out of range.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        match self.entry_at(x, y)? {
            Entry::Cell(idx) => self.cells.get(*idx),
            Entry::Merged(_) | Entry::Empty => None,
        }
    }

    /// The originating cell for any covered slot, whether it is the origin
    /// itself or a merged slot within its span.
    pub fn parent_cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        let idx = self.entry_at(x, y)?.owner()?;
        self.cells.get(idx)
    }
}

/// Declarative grid construction mirroring the teacher's `CellGrid`
/// assembly: tracks, gutters, cells, headers/footer, and lines are supplied
/// independently and validated together on [`GridBuilder::build`].
#[derive(Default)]
pub struct GridBuilder {
    cols: Vec<Sizing>,
    rows: Vec<Sizing>,
    col_gutter: Abs,
    row_gutter: Abs,
    cells: Vec<Cell>,
    headers: Vec<Header>,
    footer: Option<Footer>,
    hlines: Vec<ExplicitLine>,
    vlines: Vec<ExplicitLine>,
    stroke: Option<Arc<Stroke>>,
    rtl: bool,
}

impl GridBuilder {
    pub fn new(cols: Vec<Sizing>, rows: Vec<Sizing>) -> Self {
        Self { cols, rows, ..Self::default() }
    }

    pub fn col_gutter(mut self, gutter: Abs) -> Self {
        self.col_gutter = gutter;
        self
    }

    pub fn row_gutter(mut self, gutter: Abs) -> Self {
        self.row_gutter = gutter;
        self
    }

    pub fn cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn footer(mut self, footer: Footer) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn hline(mut self, line: ExplicitLine) -> Self {
        self.hlines.push(line);
        self
    }

    pub fn vline(mut self, line: ExplicitLine) -> Self {
        self.vlines.push(line);
        self
    }

    pub fn stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(Arc::new(stroke));
        self
    }

    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    pub fn build(self) -> Result<Grid, Error> {
        let col_count = self.cols.len();
        let row_count = self.rows.len();
        let mut grid = Grid::new(col_count, row_count, self.cols, self.rows, self.cells)?;
        grid.col_gutter = self.col_gutter;
        grid.row_gutter = self.row_gutter;
        grid.headers = self.headers;
        grid.footer = self.footer;
        grid.hlines = self.hlines;
        grid.vlines = self.vlines;
        grid.stroke = self.stroke;
        grid.rtl = self.rtl;
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::tests::FixedCell;

    fn sizing_cols(n: usize) -> Vec<Sizing> {
        vec![Sizing::fixed(Abs::pt(50.0)); n]
    }

    #[test]
    fn coverage_rejects_overlap() {
        let cells = vec![
            Cell::new(0, 0, FixedCell::new(10.0, 10.0)).with_colspan(2),
            Cell::new(1, 0, FixedCell::new(10.0, 10.0)),
        ];
        let err = Grid::new(2, 1, sizing_cols(2), vec![Sizing::fixed(Abs::pt(10.0))], cells)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGrid(_)));
    }

    #[test]
    fn coverage_rejects_out_of_bounds_span() {
        let cells = vec![Cell::new(0, 0, FixedCell::new(10.0, 10.0)).with_colspan(3)];
        let err = Grid::new(2, 1, sizing_cols(2), vec![Sizing::fixed(Abs::pt(10.0))], cells)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGrid(_)));
    }

    #[test]
    fn merged_slots_point_back_at_origin() {
        let cells = vec![Cell::new(0, 0, FixedCell::new(10.0, 10.0)).with_colspan(2)];
        let grid = Grid::new(2, 1, sizing_cols(2), vec![Sizing::fixed(Abs::pt(10.0))], cells)
            .unwrap();
        assert!(matches!(grid.entry_at(0, 0), Some(Entry::Cell(0))));
        assert!(matches!(grid.entry_at(1, 0), Some(Entry::Merged(0))));
        assert_eq!(grid.parent_cell_at(1, 0).unwrap().id(), 0);
        assert!(grid.cell_at(1, 0).is_none());
    }

    #[test]
    fn entry_at_is_bounds_checked() {
        let grid = Grid::new(1, 1, sizing_cols(1), vec![Sizing::fixed(Abs::pt(10.0))], vec![])
            .unwrap();
        assert!(grid.entry_at(1, 0).is_none());
        assert!(grid.entry_at(0, 1).is_none());
    }

    #[test]
    fn builder_assembles_a_grid() {
        let grid = GridBuilder::new(sizing_cols(2), vec![Sizing::fixed(Abs::pt(10.0))])
            .col_gutter(Abs::pt(5.0))
            .cell(Cell::new(0, 0, FixedCell::new(10.0, 10.0)))
            .build()
            .unwrap();
        assert_eq!(grid.col_gutter.to_pt(), 5.0);
        assert!(grid.cell_at(0, 0).is_some());
    }
}
