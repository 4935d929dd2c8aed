//! The region source consumed by the layouter, see spec §6.2.

use crate::geom::{Abs, Size};

/// A possibly-infinite stream of available region sizes. Width is held fixed
/// across regions — only heights vary — matching spec §3's definition of a
/// region as `(W, H_i)`.
#[derive(Clone, Debug)]
pub struct Regions<'a> {
    /// The available size of the current region.
    pub size: Size,
    /// The full (unreduced) height of the current region, used when
    /// resolving `Relative` row heights against "the region's full height"
    /// (spec §4.3).
    pub full: Abs,
    /// Follow-on heights after the current region.
    pub backlog: &'a [Abs],
    /// The terminal region's height, used once `backlog` is exhausted.
    pub last: Option<Abs>,
}

impl<'a> Regions<'a> {
    /// A region source with one follow-on region of the same size as the
    /// first, then termination — useful for tests that want "at least one
    /// more region is available" without hand-building a backlog.
    pub fn repeating(size: Size) -> Self {
        Self { size, full: size.y, backlog: &[], last: Some(size.y) }
    }

    /// A fixed sequence of region heights, non-repeating once exhausted.
    pub fn sequence(width: Abs, heights: &'a [Abs]) -> Self {
        let (&first, rest) = heights.split_first().expect("at least one region height");
        Self { size: Size::new(width, first), full: first, backlog: rest, last: None }
    }

    /// Whether another region can be produced after this one.
    pub fn may_progress(&self) -> bool {
        !self.backlog.is_empty() || self.last.is_some()
    }

    /// Whether this is the last region the source will ever produce.
    pub fn in_last(&self) -> bool {
        !self.may_progress()
    }

    /// Pops the next available size. Returns `false` if no more regions are
    /// available (caller must treat the current region as final).
    pub fn advance(&mut self) -> bool {
        if let Some((&next, rest)) = self.backlog.split_first() {
            self.backlog = rest;
            self.size = Size::new(self.size.x, next);
            self.full = next;
            true
        } else if let Some(last) = self.last.take() {
            // Spec §6.2: "it becomes the new current and `last` is cleared."
            // After this, `may_progress` is false: no further regions exist.
            self.size = Size::new(self.size.x, last);
            self.full = last;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_exhausts_backlog_then_stops() {
        let heights = [Abs::pt(80.0), Abs::pt(80.0), Abs::pt(40.0)];
        let mut regions = Regions::sequence(Abs::pt(100.0), &heights);
        assert_eq!(regions.size.y.to_pt(), 80.0);
        assert!(regions.advance());
        assert_eq!(regions.size.y.to_pt(), 80.0);
        assert!(regions.advance());
        assert_eq!(regions.size.y.to_pt(), 40.0);
        assert!(regions.in_last());
        assert!(!regions.advance());
    }

    #[test]
    fn last_sentinel_is_consumed_once() {
        let mut regions = Regions::repeating(Size::new(Abs::pt(100.0), Abs::pt(50.0)));
        assert!(regions.may_progress());
        assert!(regions.advance());
        assert!(!regions.may_progress());
        assert!(!regions.advance());
    }
}
