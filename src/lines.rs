//! Grid line segment generation, see spec §4.5.

use std::sync::Arc;

use crate::geom::Abs;
use crate::model::grid::ExplicitLine;
use crate::model::Grid;
use crate::stroke::{Fold, Stroke, StrokePriority};

/// A contiguous run of one stroke along a horizontal or vertical gridline.
/// `offset` is the line's fixed-axis coordinate (`y_k` for an hline, `x_k`
/// for a vline); `start`/`length` locate the run along the line itself.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub offset: Abs,
    pub start: Abs,
    pub length: Abs,
    pub stroke: Arc<Stroke>,
    pub priority: StrokePriority,
}

/// Walks `tracks` (already in ascending index order) emitting one
/// [`LineSegment`] per contiguous run of equal `(stroke, priority)`,
/// interrupted wherever `stroke_at_track` returns `None` — i.e. a merged
/// cell crosses this position. Ported from the teacher's
/// `generate_line_segments`, dropping its gutter-track doubling (this
/// crate's gutters are not real tracks, see `SPEC_FULL.md` §C.3).
pub(crate) fn generate_line_segments(
    offset: Abs,
    tracks: impl IntoIterator<Item = (usize, Abs)>,
    stroke_at_track: impl Fn(usize) -> Option<(Arc<Stroke>, StrokePriority)>,
) -> Vec<LineSegment> {
    let mut segments = Vec::new();
    let mut current: Option<(Arc<Stroke>, StrokePriority, Abs, Abs)> = None;
    let mut cursor = Abs::zero();

    for (track, size) in tracks {
        match (stroke_at_track(track), &mut current) {
            (Some((stroke, priority)), Some((cur_stroke, cur_priority, _, length)))
                if *cur_stroke == stroke && *cur_priority == priority =>
            {
                *length += size;
            }
            (Some((stroke, priority)), _) => {
                if let Some((stroke, priority, start, length)) = current.take() {
                    segments.push(LineSegment { offset, start, length, stroke, priority });
                }
                current = Some((stroke, priority, cursor, size));
            }
            (None, _) => {
                if let Some((stroke, priority, start, length)) = current.take() {
                    segments.push(LineSegment { offset, start, length, stroke, priority });
                }
            }
        }
        cursor += size;
    }
    if let Some((stroke, priority, start, length)) = current.take() {
        segments.push(LineSegment { offset, start, length, stroke, priority });
    }
    segments
}

/// Folds the grid default, per-cell overrides, and explicit line strokes in
/// priority order (`Grid < Cell < Explicit`, spec §4.5), returning the
/// winning stroke together with the priority tier it came from.
fn resolve_priority(
    grid_default: Option<Arc<Stroke>>,
    cell: Option<Arc<Stroke>>,
    explicit: Option<Arc<Stroke>>,
) -> Option<(Arc<Stroke>, StrokePriority)> {
    if let Some(stroke) = explicit {
        Some((stroke, StrokePriority::Explicit))
    } else if let Some(stroke) = cell {
        Some((stroke, StrokePriority::Cell))
    } else {
        grid_default.map(|stroke| (stroke, StrokePriority::Grid))
    }
}

fn explicit_stroke_at(lines: &[ExplicitLine], index: usize, track: usize) -> Option<Arc<Stroke>> {
    lines
        .iter()
        .filter(|line| line.track == index && (line.start..line.end).contains(&track))
        .fold(None, |acc, line| line.stroke.clone().fold(acc))
}

/// The stroke to draw for the vline before column `x`, going through row
/// `y`, or `None` if a colspan crosses this position (spec §4.5: "blocked
/// by colspanning cells").
pub(crate) fn vline_stroke_at_row(
    grid: &Grid,
    grid_default: Option<Arc<Stroke>>,
    x: usize,
    y: usize,
    index: usize,
) -> Option<(Arc<Stroke>, StrokePriority)> {
    if x != 0 && x != grid.col_count {
        if let Some(parent) = grid.parent_cell_at(x, y) {
            if parent.x < x {
                return None;
            }
        }
    }

    let left = x
        .checked_sub(1)
        .and_then(|lx| grid.parent_cell_at(lx, y))
        .and_then(|c| c.stroke.right.resolved().cloned());
    let right = if x < grid.col_count {
        grid.parent_cell_at(x, y).and_then(|c| c.stroke.left.resolved().cloned())
    } else {
        None
    };
    let cell = right.fold(left);
    let explicit = explicit_stroke_at(&grid.vlines, index, y);
    resolve_priority(grid_default, cell, explicit)
}

/// The stroke to draw for the hline above row `y`, going through column `x`,
/// or `None` if a rowspan crosses this position.
pub(crate) fn hline_stroke_at_column(
    grid: &Grid,
    grid_default: Option<Arc<Stroke>>,
    y: usize,
    x: usize,
    index: usize,
) -> Option<(Arc<Stroke>, StrokePriority)> {
    if y != 0 && y != grid.row_count {
        if let Some(parent) = grid.parent_cell_at(x, y) {
            if parent.y < y {
                return None;
            }
        }
    }

    let top = y
        .checked_sub(1)
        .and_then(|ty| grid.parent_cell_at(x, ty))
        .and_then(|c| c.stroke.bottom.resolved().cloned());
    let bottom = if y < grid.row_count {
        grid.parent_cell_at(x, y).and_then(|c| c.stroke.top.resolved().cloned())
    } else {
        None
    };
    let cell = bottom.fold(top);
    let explicit = explicit_stroke_at(&grid.hlines, index, x);
    resolve_priority(grid_default, cell, explicit)
}

/// Generates every horizontal gridline segment for a finished region, given
/// the row pieces actually placed there (content rows only; gutter rows
/// contribute to `row_heights_before` but never carry a line of their own).
pub fn horizontal_segments(
    grid: &Grid,
    grid_default: Option<Arc<Stroke>>,
    col_widths: &[Abs],
    row_offsets: &[(usize, Abs)],
) -> Vec<Vec<LineSegment>> {
    (0..=grid.row_count)
        .map(|k| {
            let offset = row_offsets
                .iter()
                .take_while(|(y, _)| *y < k)
                .map(|(_, h)| *h)
                .sum();
            let tracks = (0..grid.col_count).map(|x| (x, col_widths[x]));
            generate_line_segments(offset, tracks, |x| {
                hline_stroke_at_column(grid, grid_default.clone(), k, x, k)
            })
        })
        .collect()
}

/// Generates every vertical gridline segment for a finished region.
pub fn vertical_segments(
    grid: &Grid,
    grid_default: Option<Arc<Stroke>>,
    col_widths: &[Abs],
    row_offsets: &[(usize, Abs)],
) -> Vec<Vec<LineSegment>> {
    (0..=grid.col_count)
        .map(|k| {
            let offset = col_widths[..k.min(grid.col_count)].iter().copied().sum();
            let tracks = row_offsets.iter().map(|&(y, h)| (y, h));
            generate_line_segments(offset, tracks, |y| {
                vline_stroke_at_row(grid, grid_default.clone(), k, y, k)
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Sizing;
    use crate::measure::tests::FixedCell;
    use crate::model::{Cell, GridBuilder};
    use crate::stroke::Paint;

    fn sample_grid() -> Grid {
        // 2x3 grid, cell at (0,0) with rowspan 2 (spec S6).
        GridBuilder::new(
            vec![Sizing::fixed(Abs::pt(50.0)); 2],
            vec![Sizing::fixed(Abs::pt(30.0)); 3],
        )
        .stroke(Stroke { thickness: Abs::pt(1.0), paint: Paint::BLACK })
        .cell(Cell::new(0, 0, FixedCell::new(50.0, 30.0)).with_rowspan(2))
        .cell(Cell::new(1, 0, FixedCell::new(50.0, 30.0)))
        .cell(Cell::new(1, 1, FixedCell::new(50.0, 30.0)))
        .cell(Cell::new(0, 2, FixedCell::new(50.0, 30.0)))
        .cell(Cell::new(1, 2, FixedCell::new(50.0, 30.0)))
        .build()
        .unwrap()
    }

    #[test]
    fn hline_blocked_at_rowspan_interior() {
        let grid = sample_grid();
        let col_widths = [Abs::pt(50.0), Abs::pt(50.0)];
        let row_offsets = [(0, Abs::pt(30.0)), (1, Abs::pt(30.0)), (2, Abs::pt(30.0))];
        let all = horizontal_segments(&grid, grid.stroke.clone(), &col_widths, &row_offsets);
        // k = 1 is the gridline at y = 30, interior to the rowspan.
        let blocked = &all[1];
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].start.to_pt(), 50.0);
        assert_eq!(blocked[0].length.to_pt(), 50.0);
    }

    #[test]
    fn hline_full_width_at_top_and_bottom_borders() {
        let grid = sample_grid();
        let col_widths = [Abs::pt(50.0), Abs::pt(50.0)];
        let row_offsets = [(0, Abs::pt(30.0)), (1, Abs::pt(30.0)), (2, Abs::pt(30.0))];
        let all = horizontal_segments(&grid, grid.stroke.clone(), &col_widths, &row_offsets);
        for k in [0usize, 2, 3] {
            assert_eq!(all[k].len(), 1);
            assert_eq!(all[k][0].length.to_pt(), 100.0);
        }
    }
}
