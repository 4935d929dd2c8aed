//! Per-row height resolution, see spec §4.1 ("Row height resolution is
//! per-row during pagination") and §4.3 step 2.

use crate::error::Error;
use crate::geom::{Abs, Sizing};
use crate::measure::{check_dimension, MeasureCache};
use crate::model::{Cell, Entry, Grid};

/// The natural height of row `y`, given the already-resolved column widths,
/// before any rowspan extra-height obligation is folded in. `Fractional`
/// rows defer their height to region close and resolve to zero here.
///
/// Cells with `rowspan > 1` never contribute here even at their origin row:
/// their height is accounted for separately by
/// [`crate::rowspan::RowspanTracker::extra_height_obligation`], added only
/// once their span's final row is reached (spec §4.2). Folding a rowspanning
/// cell's full natural height into its origin row too would double-count it
/// and can overflow a region long before the span actually needs to.
pub fn resolve_row_height(
    grid: &Grid,
    row: usize,
    col_widths: &[Abs],
    region_full_height: Abs,
    cache: &MeasureCache,
) -> Result<Abs, Error> {
    match grid.rows[row] {
        Sizing::Rel(rel) => Ok(rel.resolve(region_full_height)),
        Sizing::Fr(_) => Ok(Abs::zero()),
        Sizing::Auto => {
            let mut max_height = Abs::zero();
            for x in 0..grid.col_count {
                if let Some(Entry::Cell(idx)) = grid.entry_at(x, row) {
                    let cell = &grid.cells[*idx];
                    if cell.y != row || cell.rowspan > 1 {
                        continue;
                    }
                    let width = cell_spanned_width(grid, col_widths, cell);
                    let height =
                        check_dimension(cache.height(cell.id, cell.body.as_ref(), width), cell.x, cell.y)?;
                    max_height.set_max(height);
                }
            }
            Ok(max_height)
        }
    }
}

/// The width available to a cell: the sum of its spanned columns plus the
/// interior column-gutters between them.
pub fn cell_spanned_width(grid: &Grid, col_widths: &[Abs], cell: &Cell) -> Abs {
    let cols: Abs = col_widths[cell.x..cell.x + cell.colspan].iter().copied().sum();
    let gutters = grid.col_gutter * (cell.colspan.saturating_sub(1)) as f64;
    cols + gutters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::tests::FixedCell;
    use crate::model::GridBuilder;

    #[test]
    fn auto_row_takes_the_tallest_cell() {
        let grid = GridBuilder::new(vec![Sizing::Auto, Sizing::Auto], vec![Sizing::Auto])
            .cell(Cell::new(0, 0, FixedCell::new(10.0, 5.0)))
            .cell(Cell::new(1, 0, FixedCell::new(10.0, 25.0)))
            .build()
            .unwrap();
        let cache = MeasureCache::new();
        let height =
            resolve_row_height(&grid, 0, &[Abs::pt(10.0), Abs::pt(10.0)], Abs::pt(500.0), &cache).unwrap();
        assert_eq!(height.to_pt(), 25.0);
    }

    #[test]
    fn fractional_row_defers_to_zero() {
        let grid = GridBuilder::new(vec![Sizing::Auto], vec![Sizing::Fr(crate::geom::Fr(1.0))])
            .build()
            .unwrap();
        let cache = MeasureCache::new();
        let height = resolve_row_height(&grid, 0, &[Abs::pt(10.0)], Abs::pt(500.0), &cache).unwrap();
        assert_eq!(height.to_pt(), 0.0);
    }

    #[test]
    fn relative_row_resolves_against_region_full_height() {
        let grid = GridBuilder::new(
            vec![Sizing::Auto],
            vec![Sizing::Rel(crate::geom::Rel::new(Abs::zero(), 0.5))],
        )
        .build()
        .unwrap();
        let cache = MeasureCache::new();
        let height = resolve_row_height(&grid, 0, &[Abs::pt(10.0)], Abs::pt(400.0), &cache).unwrap();
        assert_eq!(height.to_pt(), 200.0);
    }

    #[test]
    fn auto_row_ignores_a_rowspanning_cell_even_at_its_origin_row() {
        // A rowspan's own natural height must never be folded into its
        // origin row directly — that's the tracker's job at the span's
        // ending row (spec §4.2). No sibling cell occupies row 0 here, so
        // if the rowspan leaked in, row 0's height would jump to 200pt.
        let grid = GridBuilder::new(vec![Sizing::Auto], vec![Sizing::Auto, Sizing::Auto])
            .cell(Cell::new(0, 0, FixedCell::new(10.0, 200.0)).with_rowspan(2))
            .build()
            .unwrap();
        let cache = MeasureCache::new();
        let height = resolve_row_height(&grid, 0, &[Abs::pt(10.0)], Abs::pt(500.0), &cache).unwrap();
        assert_eq!(height.to_pt(), 0.0);
    }
}
