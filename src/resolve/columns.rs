//! Column width resolution, see spec §4.1.

use crate::error::Error;
use crate::geom::{Abs, Sizing};
use crate::measure::MeasureCache;
use crate::model::Grid;

/// Resolves every column's absolute width against the available container
/// width, following spec §4.1 steps 1-6 in order. Grounded on the teacher's
/// `measure_columns`/colspan-redistribution pass in `layouter.rs`.
pub fn resolve_columns(grid: &Grid, container_width: Abs, cache: &MeasureCache) -> Result<Vec<Abs>, Error> {
    let n = grid.col_count;
    if n == 0 {
        return Ok(Vec::new());
    }

    // Step 1: available width after gutters (zero gutter is a no-op).
    let gutter_total = grid.col_gutter * (n.saturating_sub(1)) as f64;
    let available = container_width - gutter_total;

    // Step 2: classify tracks, resolving Relative columns immediately.
    let mut widths = vec![Abs::zero(); n];
    let mut auto_idx = Vec::new();
    let mut fr_idx: Vec<(usize, f64)> = Vec::new();
    let mut fixed_sum = Abs::zero();
    for (i, sizing) in grid.cols.iter().enumerate() {
        match sizing {
            Sizing::Rel(rel) => {
                widths[i] = rel.resolve(available);
                fixed_sum += widths[i];
            }
            Sizing::Auto => auto_idx.push(i),
            Sizing::Fr(fr) => fr_idx.push((i, fr.get())),
        }
    }

    // Step 3: measure auto columns from their colspan == 1 origin cells.
    for &i in &auto_idx {
        let mut max_width = Abs::zero();
        for cell in &grid.cells {
            if cell.x == i && cell.colspan == 1 {
                max_width.set_max(measure_width(cache, cell)?);
            }
        }
        widths[i] = max_width;
    }

    // Step 4: redistribute colspan requirements across auto columns in span.
    for cell in &grid.cells {
        if cell.colspan <= 1 {
            continue;
        }
        let span = cell.x..(cell.x + cell.colspan);
        let current: Abs = span.clone().map(|i| widths[i]).sum();
        let natural = measure_width(cache, cell)?;
        if !natural.fits(current) {
            let excess = natural - current;
            let auto_in_span: Vec<usize> =
                span.clone().filter(|i| auto_idx.contains(i)).collect();
            if !auto_in_span.is_empty() {
                let share = excess / auto_in_span.len() as f64;
                for (k, &i) in auto_in_span.iter().enumerate() {
                    // First such column absorbs the one-unit rounding remainder.
                    widths[i] += if k == 0 {
                        excess - share * (auto_in_span.len() - 1) as f64
                    } else {
                        share
                    };
                }
            }
            // No auto columns in span: overflow is absorbed silently.
        }
    }

    // Step 5: fractional distribution.
    let assigned: Abs = widths.iter().copied().sum();
    let remaining = available - assigned;
    let total_fr: f64 = fr_idx.iter().map(|&(_, fr)| fr).sum();
    if remaining.to_pt() > 0.0 && total_fr > 0.0 {
        for &(i, fr) in &fr_idx {
            widths[i] = remaining * (fr / total_fr);
        }
    }

    // Step 6: fair-share shrinkage of auto columns only (Open Question 3).
    let total: Abs = widths.iter().copied().sum();
    if total.to_pt() > available.to_pt() {
        shrink_auto_columns(&mut widths, &auto_idx, total - available);
    }

    let _ = fixed_sum;
    Ok(widths)
}

fn measure_width(_cache: &MeasureCache, cell: &crate::model::Cell) -> Result<Abs, Error> {
    // Natural width does not vary with a candidate container width, so it is
    // not run through `MeasureCache` (which keys on width) — each cell's
    // width is asked for at most once per column resolution.
    crate::measure::check_dimension(cell.body.measure_width(), cell.x, cell.y)
}

/// Repeatedly subtracts the fair share from columns exceeding it, zeroing
/// and dropping smaller columns from the pool first, until `excess` is
/// absorbed or the pool is empty (spec §4.1 step 6, Open Question 3:
/// fractional columns are untouched, auto columns shrink to zero first).
fn shrink_auto_columns(widths: &mut [Abs], auto_idx: &[usize], mut excess: Abs) {
    let mut pool: Vec<usize> = auto_idx.to_vec();
    while !excess.approx_empty() && !pool.is_empty() {
        let fair_share = excess / pool.len() as f64;
        let mut next_pool = Vec::new();
        let mut absorbed = Abs::zero();
        for &i in &pool {
            if widths[i].fits(fair_share) && widths[i].to_pt() > fair_share.to_pt() {
                widths[i] -= fair_share;
                absorbed += fair_share;
                next_pool.push(i);
            } else {
                absorbed += widths[i];
                widths[i] = Abs::zero();
            }
        }
        if absorbed.approx_empty() {
            break;
        }
        excess -= absorbed;
        pool = next_pool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Fr;
    use crate::measure::tests::FixedCell;
    use crate::model::Cell;

    fn cache() -> MeasureCache {
        MeasureCache::new()
    }

    #[test]
    fn relative_columns_resolve_against_available_width() {
        let grid = crate::model::GridBuilder::new(
            vec![Sizing::fixed(Abs::pt(40.0)), Sizing::fixed(Abs::pt(60.0))],
            vec![Sizing::Auto],
        )
        .build()
        .unwrap();
        let widths = resolve_columns(&grid, Abs::pt(200.0), &cache()).unwrap();
        assert_eq!(widths, vec![Abs::pt(40.0), Abs::pt(60.0)]);
    }

    #[test]
    fn auto_column_takes_the_max_natural_width() {
        let grid = crate::model::GridBuilder::new(vec![Sizing::Auto], vec![Sizing::Auto, Sizing::Auto])
            .cell(Cell::new(0, 0, FixedCell::new(30.0, 10.0)))
            .cell(Cell::new(0, 1, FixedCell::new(50.0, 10.0)))
            .build()
            .unwrap();
        let widths = resolve_columns(&grid, Abs::pt(200.0), &cache()).unwrap();
        assert_eq!(widths[0].to_pt(), 50.0);
    }

    #[test]
    fn fractional_columns_split_remaining_width_proportionally() {
        let grid = crate::model::GridBuilder::new(
            vec![Sizing::fixed(Abs::pt(40.0)), Sizing::Fr(Fr(1.0)), Sizing::Fr(Fr(3.0))],
            vec![Sizing::Auto],
        )
        .build()
        .unwrap();
        let widths = resolve_columns(&grid, Abs::pt(200.0), &cache()).unwrap();
        assert_eq!(widths[1].to_pt(), 40.0);
        assert_eq!(widths[2].to_pt(), 120.0);
    }

    #[test]
    fn colspan_overflow_is_redistributed_across_auto_columns_in_span() {
        let grid = crate::model::GridBuilder::new(vec![Sizing::Auto, Sizing::Auto], vec![Sizing::Auto, Sizing::Auto])
            .cell(Cell::new(0, 0, FixedCell::new(10.0, 10.0)))
            .cell(Cell::new(1, 0, FixedCell::new(10.0, 10.0)))
            .cell(Cell::new(0, 1, FixedCell::new(100.0, 10.0)).with_colspan(2))
            .build()
            .unwrap();
        let widths = resolve_columns(&grid, Abs::pt(500.0), &cache()).unwrap();
        assert_eq!(widths[0].to_pt() + widths[1].to_pt(), 100.0);
    }

    #[test]
    fn shrinkage_absorbs_excess_from_auto_columns_leaving_fr_untouched() {
        let grid = crate::model::GridBuilder::new(vec![Sizing::Auto, Sizing::Fr(Fr(1.0))], vec![Sizing::Auto])
            .cell(Cell::new(0, 0, FixedCell::new(300.0, 10.0)))
            .build()
            .unwrap();
        let widths = resolve_columns(&grid, Abs::pt(100.0), &cache()).unwrap();
        // The fr column never claimed any space (remaining was negative at
        // step 5), so all 100pt of available width must come from the auto
        // column shrinking down to fit exactly.
        assert_eq!(widths[0].to_pt(), 100.0);
        assert_eq!(widths[1].to_pt(), 0.0);
    }

    #[test]
    fn shrinkage_zeroes_out_auto_columns_smaller_than_their_fair_share() {
        let grid = crate::model::GridBuilder::new(vec![Sizing::Auto, Sizing::Auto], vec![Sizing::Auto])
            .cell(Cell::new(0, 0, FixedCell::new(10.0, 10.0)))
            .cell(Cell::new(1, 0, FixedCell::new(300.0, 10.0)))
            .build()
            .unwrap();
        let widths = resolve_columns(&grid, Abs::pt(100.0), &cache()).unwrap();
        assert_eq!(widths[0].to_pt(), 0.0);
        assert_eq!(widths[1].to_pt(), 100.0);
    }
}
