//! Tracks cells spanning more than one row across region boundaries, see
//! spec §4.2.

use smallvec::{smallvec, SmallVec};

use crate::error::Error;
use crate::geom::Abs;

/// Per-region running sum of actual row heights a rowspan has seen so far.
/// Almost always one or two entries (origin region, maybe one
/// continuation); only a rowspan crossing many regions spills to the heap.
type RegionHeights = SmallVec<[Abs; 2]>;

/// A rowspanning cell registered when its origin row is laid out. Tracks
/// enough state to measure later rows' extra-height obligations and, once
/// the span closes, to realize and place the cell's frame.
///
/// Grounded on the teacher's `Rowspan` struct (`dx`/`dy`/`heights`), dropping
/// the gutter-removal simulation the teacher performs when a rowspan crosses
/// a region boundary (see `SPEC_FULL.md` §C.4).
pub struct RowspanEntry {
    pub cell_id: usize,
    pub x: usize,
    pub y: usize,
    pub colspan: usize,
    pub rowspan: usize,
    /// Left edge offset of the spanned columns within the region frame.
    pub dx: Abs,
    /// Top offset within the *first* region the span appears in. Later
    /// regions place their piece of the span at the region frame's top.
    pub origin_offset: Abs,
    /// `H_current - dy` as measured at registration: the origin region's
    /// remaining height below the cell's top edge. Used as the first
    /// region's piece height only if the span is still open when that
    /// region closes (spec §4.2: `H_first = H_region - dy_first`) — if the
    /// span completes within the origin region instead, the actual row
    /// heights below are used, never this padded value.
    remaining_at_registration: Abs,
    /// Actual row heights closed so far, one running sum per region the
    /// span has touched; a fresh zero entry is pushed whenever the span
    /// survives into a new region.
    region_actual: RegionHeights,
    /// Sum of the heights of rows already closed within the span, excluding
    /// the row currently being measured. Drives the extra-height obligation
    /// of spec §4.2.
    accumulated: Abs,
    breakable: bool,
}

impl RowspanEntry {
    fn ends_at(&self) -> usize {
        self.y + self.rowspan - 1
    }

    /// Total height the span has occupied across every region it touched.
    pub fn total_height(&self) -> Abs {
        if self.in_origin_region() {
            self.region_actual[0]
        } else {
            self.remaining_at_registration
                + self.region_actual[1..].iter().copied().sum::<Abs>()
        }
    }

    /// The piece height to use when the span's final row closes in the
    /// region currently being laid out: the actual rows placed there, per
    /// spec §4.2 ("the cell is realized at... height = Σ row heights").
    pub fn completed_piece_height(&self) -> Abs {
        *self.region_actual.last().expect("region_actual always has a current entry")
    }

    /// The piece height to use when the region currently being laid out
    /// closes with this span still open (not reaching its final row here):
    /// the origin region pads to the region's full remaining height, later
    /// regions use their actual rows so far (spec §4.2).
    pub fn in_progress_piece_height(&self) -> Abs {
        if self.in_origin_region() {
            self.remaining_at_registration
        } else {
            *self.region_actual.last().expect("region_actual always has a current entry")
        }
    }

    /// Whether this is still the span's first region (so its piece belongs
    /// at `origin_offset` rather than the region frame's top).
    pub fn in_origin_region(&self) -> bool {
        self.region_actual.len() == 1
    }
}

/// Registers and resolves rowspans as rows are laid out, per spec §4.2.
#[derive(Default)]
pub struct RowspanTracker {
    active: Vec<RowspanEntry>,
}

impl RowspanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Every rowspan still open, for placing in-progress pieces at region
    /// close even though their span hasn't reached its final row yet.
    pub fn active_entries(&self) -> impl Iterator<Item = &RowspanEntry> {
        self.active.iter()
    }

    /// Registers a rowspanning cell when its origin row is laid out.
    /// `region_height_remaining` is `H_current - dy`: the amount of the
    /// current region still below the cell's top edge.
    pub fn register(
        &mut self,
        cell_id: usize,
        x: usize,
        y: usize,
        colspan: usize,
        rowspan: usize,
        dx: Abs,
        origin_offset: Abs,
        region_height_remaining: Abs,
        breakable: bool,
    ) {
        self.active.push(RowspanEntry {
            cell_id,
            x,
            y,
            colspan,
            rowspan,
            dx,
            origin_offset,
            remaining_at_registration: region_height_remaining,
            region_actual: smallvec![Abs::zero()],
            accumulated: Abs::zero(),
            breakable,
        });
    }

    /// Whether any active rowspan is unbreakable and still open (used by
    /// `can_break_before` of spec §4.3 to forbid a region break mid-group).
    pub fn has_active_unbreakable(&self) -> bool {
        self.active.iter().any(|r| !r.breakable)
    }

    /// Whether an active, unbreakable rowspan ends at `y` — such a span's
    /// whole remaining height must land in a single region, so the
    /// incremental crediting `credit_progress` performs for breakable spans
    /// does not apply to it.
    pub fn has_unbreakable_ending_at(&self, y: usize) -> bool {
        self.active.iter().any(|r| r.ends_at() == y && !r.breakable)
    }

    /// The extra-height obligation a row `y` must absorb: the max, over
    /// every active rowspan ending at `y`, of `measured_height - accumulated`.
    /// `measure` supplies each ending rowspan's full measured height at its
    /// spanned width.
    pub fn extra_height_obligation(
        &self,
        y: usize,
        mut measure: impl FnMut(&RowspanEntry) -> Result<Abs, Error>,
    ) -> Result<Abs, Error> {
        let mut max_obligation = Abs::zero();
        for r in self.active.iter().filter(|r| r.ends_at() == y) {
            let measured = measure(r)?;
            let obligation = measured - r.accumulated;
            if obligation.to_pt() > 0.0 {
                max_obligation.set_max(obligation);
            }
        }
        Ok(max_obligation)
    }

    /// Credits `credited` height toward every active rowspan ending at `y`
    /// without actually closing the row, for the case where even a fresh
    /// region can't absorb the ending row's full remaining obligation in one
    /// go. The span stays active and absorbs the rest over further region
    /// breaks, extending spec §4.2's split mechanism (normally reserved for
    /// rows strictly between a span's origin and its end) to the end row
    /// itself.
    pub fn credit_progress(&mut self, y: usize, credited: Abs) {
        for entry in &mut self.active {
            if entry.ends_at() == y {
                entry.accumulated += credited;
                *entry
                    .region_actual
                    .last_mut()
                    .expect("region_actual always has a current entry") += credited;
            }
        }
    }

    /// Records that row `y`, of height `row_height`, has just closed, adding
    /// its height to every active rowspan that covers it (including the
    /// ending row itself, so `completed_piece_height` sees the full sum).
    pub fn note_row_closed(&mut self, y: usize, row_height: Abs) {
        for entry in &mut self.active {
            if entry.y <= y && y <= entry.ends_at() {
                *entry
                    .region_actual
                    .last_mut()
                    .expect("region_actual always has a current entry") += row_height;
                if y != entry.ends_at() {
                    entry.accumulated += row_height;
                }
            }
        }
    }

    /// Removes and returns every rowspan whose final row is `y`, so the
    /// caller can realize and place them.
    pub fn complete(&mut self, y: usize) -> Vec<RowspanEntry> {
        let (done, rest): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|r| r.ends_at() == y);
        self.active = rest;
        done
    }

    /// Opens a fresh per-region actual-height entry for every still-active
    /// rowspan, per spec §4.3 step 4 ("Advance region").
    pub fn advance_region(&mut self) {
        for entry in &mut self.active {
            entry.region_actual.push(Abs::zero());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obligation_is_zero_when_no_rows_closed_yet() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 2, Abs::zero(), Abs::zero(), Abs::pt(100.0), true);
        let obligation = tracker.extra_height_obligation(1, |_| Ok(Abs::pt(30.0))).unwrap();
        assert_eq!(obligation.to_pt(), 30.0);
    }

    #[test]
    fn obligation_subtracts_accumulated_height() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 3, Abs::zero(), Abs::zero(), Abs::pt(100.0), true);
        tracker.note_row_closed(0, Abs::pt(10.0));
        tracker.note_row_closed(1, Abs::pt(10.0));
        let obligation = tracker.extra_height_obligation(2, |_| Ok(Abs::pt(25.0))).unwrap();
        assert_eq!(obligation.to_pt(), 5.0);
    }

    #[test]
    fn obligation_never_goes_negative() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 2, Abs::zero(), Abs::zero(), Abs::pt(100.0), true);
        tracker.note_row_closed(0, Abs::pt(50.0));
        let obligation = tracker.extra_height_obligation(1, |_| Ok(Abs::pt(10.0))).unwrap();
        assert_eq!(obligation.to_pt(), 0.0);
    }

    #[test]
    fn credit_progress_advances_accumulated_without_closing_the_span() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 1, Abs::zero(), Abs::zero(), Abs::pt(80.0), true);
        tracker.credit_progress(0, Abs::pt(80.0));
        let obligation = tracker.extra_height_obligation(0, |_| Ok(Abs::pt(200.0))).unwrap();
        assert_eq!(obligation.to_pt(), 120.0);
        assert_eq!(tracker.active[0].region_actual.last().unwrap().to_pt(), 80.0);
    }

    #[test]
    fn complete_removes_finished_spans_only() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 2, Abs::zero(), Abs::zero(), Abs::pt(100.0), true);
        tracker.register(1, 1, 0, 1, 3, Abs::zero(), Abs::zero(), Abs::pt(100.0), true);
        tracker.note_row_closed(0, Abs::pt(10.0));
        tracker.note_row_closed(1, Abs::pt(10.0));
        let done = tracker.complete(1);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].cell_id, 0);
        assert!(!tracker.is_empty());
    }

    #[test]
    fn advance_region_opens_a_new_running_sum() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 3, Abs::zero(), Abs::zero(), Abs::pt(40.0), true);
        tracker.note_row_closed(0, Abs::pt(10.0));
        tracker.advance_region();
        assert!(!tracker.active[0].in_origin_region());
        tracker.note_row_closed(1, Abs::pt(15.0));
        // Origin region contributes its padded remaining height (40pt, never
        // the actual row closed there), the second region contributes the
        // rows actually closed in it so far (15pt).
        assert_eq!(tracker.active[0].total_height().to_pt(), 55.0);
    }

    #[test]
    fn span_completing_in_its_origin_region_uses_actual_row_heights() {
        let mut tracker = RowspanTracker::new();
        tracker.register(0, 0, 0, 1, 2, Abs::zero(), Abs::zero(), Abs::pt(100.0), true);
        tracker.note_row_closed(0, Abs::pt(16.0));
        tracker.note_row_closed(1, Abs::pt(16.0));
        let done = tracker.complete(1);
        // Never crossed a region boundary, so the piece is the real 32pt
        // sum of its two rows, not the 100pt padded remaining-space value.
        assert_eq!(done[0].completed_piece_height().to_pt(), 32.0);
    }

    #[test]
    fn has_active_unbreakable_reflects_registered_breakability() {
        let mut tracker = RowspanTracker::new();
        assert!(!tracker.has_active_unbreakable());
        tracker.register(0, 0, 0, 1, 2, Abs::zero(), Abs::zero(), Abs::pt(100.0), false);
        assert!(tracker.has_active_unbreakable());
    }
}
