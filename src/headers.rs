//! Header/footer state machine, see spec §4.4.

use crate::frame::Frame;
use crate::geom::Abs;
use crate::model::Footer;

/// A header realized in the current or an earlier region, tracked with
/// enough state to place it again at the top of a later region.
pub struct RepeatingHeader {
    pub level: u32,
    pub rows: std::ops::Range<usize>,
    pub frames: Vec<Frame>,
    pub heights: Vec<Abs>,
}

/// A header placed in the current region but not yet confirmed to repeat.
pub struct PendingHeader {
    pub level: u32,
    pub repeat: bool,
    pub rows: std::ops::Range<usize>,
    pub frames: Vec<Frame>,
    pub heights: Vec<Abs>,
}

impl PendingHeader {
    fn total_height(&self) -> Abs {
        self.heights.iter().copied().sum()
    }
}

/// Manages `repeating[]`, `pending[]`, and the single optional footer, per
/// spec §4.4's operation list. Grounded on the teacher's
/// `repeating_headers`/`pending_headers` fields, generalized into an
/// explicit state machine per spec §9's design note.
#[derive(Default)]
pub struct HeaderFooterManager {
    repeating: Vec<RepeatingHeader>,
    pending: Vec<PendingHeader>,
    footer: Option<Footer>,
    footer_frame: Option<Frame>,
}

impl HeaderFooterManager {
    pub fn new(footer: Option<Footer>) -> Self {
        Self { repeating: Vec::new(), pending: Vec::new(), footer, footer_frame: None }
    }

    pub fn pending_header_height(&self) -> Abs {
        self.pending.iter().map(PendingHeader::total_height).sum()
    }

    pub fn repeating_header_height(&self) -> Abs {
        self.repeating.iter().map(|h| h.heights.iter().copied().sum::<Abs>()).sum()
    }

    /// Reserved space for the footer at region open, per spec §4.3 step 1:
    /// only reserved "when the footer is repeating or this is the final
    /// region" (Open Question 2, resolved "no" for non-repeating footers in
    /// intermediate regions).
    pub fn footer_reserve(&self, is_final: bool) -> Abs {
        match &self.footer {
            Some(footer) if footer.repeat || is_final => {
                self.footer_frame.as_ref().map(Frame::height).unwrap_or(Abs::zero())
            }
            _ => Abs::zero(),
        }
    }

    pub fn set_footer_frame(&mut self, frame: Frame) {
        self.footer_frame = Some(frame);
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    pub fn footer_frame(&self) -> Option<&Frame> {
        self.footer_frame.as_ref()
    }

    /// Appends a header placed in the current region, awaiting a following
    /// content row.
    pub fn add_pending(
        &mut self,
        level: u32,
        repeat: bool,
        rows: std::ops::Range<usize>,
        frames: Vec<Frame>,
        heights: Vec<Abs>,
    ) {
        self.pending.push(PendingHeader { level, repeat, rows, frames, heights });
    }

    /// Removes every repeating header whose level is greater than or equal
    /// to `new_level`: same-or-deeper-level headers are superseded.
    pub fn handle_conflicts(&mut self, new_level: u32) {
        self.repeating.retain(|h| h.level < new_level);
    }

    /// Moves every pending header with `repeat == true` into `repeating`;
    /// the rest stay placed in this region but are not carried forward.
    pub fn promote_all_pending(&mut self) {
        for header in self.pending.drain(..) {
            if header.repeat {
                self.repeating.push(RepeatingHeader {
                    level: header.level,
                    rows: header.rows,
                    frames: header.frames,
                    heights: header.heights,
                });
            }
        }
    }

    /// Drops all pending headers without promoting any of them — used for
    /// orphan rollback when a region contained only pending headers and no
    /// content row.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// True iff pending headers exist and no content row was placed this
    /// region: the orphan condition of spec §4.4/§4.3 step 3.
    pub fn check_orphan(&self, has_content_rows: bool) -> bool {
        !self.pending.is_empty() && !has_content_rows
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// True iff the footer should be placed at region close.
    pub fn should_show_footer(&self, is_final_region: bool) -> bool {
        match &self.footer {
            Some(footer) => footer.repeat || is_final_region,
            None => false,
        }
    }

    /// The ordered list of repeating-header frames/heights to place at the
    /// top of a new region; pending headers are region-local and are not
    /// included.
    pub fn prepare_for_new_region(&self) -> impl Iterator<Item = (&Frame, Abs)> {
        self.repeating
            .iter()
            .flat_map(|h| h.frames.iter().zip(h.heights.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(crate::geom::Size::new(Abs::pt(100.0), Abs::pt(10.0)))
    }

    #[test]
    fn promote_only_carries_repeat_headers_forward() {
        let mut mgr = HeaderFooterManager::new(None);
        mgr.add_pending(0, true, 0..1, vec![frame()], vec![Abs::pt(10.0)]);
        mgr.add_pending(0, false, 1..2, vec![frame()], vec![Abs::pt(10.0)]);
        mgr.promote_all_pending();
        assert_eq!(mgr.repeating.len(), 1);
        assert!(!mgr.has_pending());
    }

    #[test]
    fn handle_conflicts_supersedes_same_or_deeper_level() {
        let mut mgr = HeaderFooterManager::new(None);
        mgr.add_pending(2, true, 0..1, vec![frame()], vec![Abs::pt(10.0)]);
        mgr.promote_all_pending();
        mgr.handle_conflicts(2);
        assert!(mgr.repeating.is_empty());
    }

    #[test]
    fn handle_conflicts_keeps_shallower_headers() {
        let mut mgr = HeaderFooterManager::new(None);
        mgr.add_pending(1, true, 0..1, vec![frame()], vec![Abs::pt(10.0)]);
        mgr.promote_all_pending();
        mgr.handle_conflicts(2);
        assert_eq!(mgr.repeating.len(), 1);
    }

    #[test]
    fn check_orphan_true_only_without_content() {
        let mut mgr = HeaderFooterManager::new(None);
        assert!(!mgr.check_orphan(false));
        mgr.add_pending(0, true, 0..1, vec![frame()], vec![Abs::pt(10.0)]);
        assert!(mgr.check_orphan(false));
        assert!(!mgr.check_orphan(true));
    }

    #[test]
    fn footer_shows_when_repeating_or_final() {
        let mgr = HeaderFooterManager::new(Some(Footer { start: 3, end: 4, repeat: false }));
        assert!(!mgr.should_show_footer(false));
        assert!(mgr.should_show_footer(true));

        let mgr = HeaderFooterManager::new(Some(Footer { start: 3, end: 4, repeat: true }));
        assert!(mgr.should_show_footer(false));
    }

    #[test]
    fn non_repeating_footer_reserves_nothing_mid_document() {
        let mut mgr = HeaderFooterManager::new(Some(Footer { start: 3, end: 4, repeat: false }));
        mgr.set_footer_frame(frame());
        assert_eq!(mgr.footer_reserve(false).to_pt(), 0.0);
        assert_eq!(mgr.footer_reserve(true).to_pt(), 10.0);
    }
}
