//! The `Frame` primitive consumed/produced by the engine, see spec §6.3.
//!
//! A `Frame` is opaque to callers beyond its size and baseline; the engine
//! only ever pushes child frames and shape/line primitives onto it.

use std::sync::Arc;

use crate::geom::{Abs, Point, Size};
use crate::stroke::{Paint, Stroke};

/// A positioned item inside a [`Frame`].
#[derive(Clone, Debug)]
pub enum FrameItem {
    /// A realized child frame (cell content, or a rowspan's split piece).
    Frame(Frame),
    /// A filled or stroked shape (cell fill, or a grid line segment).
    Shape(Shape),
}

/// A fill and/or stroke applied to some geometry.
#[derive(Clone, Debug)]
pub struct Shape {
    pub geometry: Geometry,
    pub fill: Option<Paint>,
    pub stroke: Option<Arc<Stroke>>,
}

/// The geometry of a [`Shape`]. Grid lines are `Line`, cell fills are `Rect`.
#[derive(Clone, Debug)]
pub enum Geometry {
    /// A filled rectangle spanning `size`, anchored at the shape's push point.
    Rect(Size),
    /// A straight line from the shape's push point to `push_point + end`.
    Line(Point),
}

/// An opaque, positioned container of sub-items with a size and baseline.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    size: Size,
    baseline: Option<Abs>,
    items: Vec<(Point, FrameItem)>,
}

impl Frame {
    pub fn new(size: Size) -> Self {
        Self { size, baseline: None, items: Vec::new() }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> Abs {
        self.size.x
    }

    pub fn height(&self) -> Abs {
        self.size.y
    }

    pub fn baseline(&self) -> Abs {
        self.baseline.unwrap_or(self.size.y)
    }

    pub fn set_baseline(&mut self, baseline: Abs) {
        self.baseline = Some(baseline);
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn items(&self) -> &[(Point, FrameItem)] {
        &self.items
    }

    /// Pushes a single primitive at `pos`.
    pub fn push(&mut self, pos: Point, item: FrameItem) {
        self.items.push((pos, item));
    }

    /// Pushes a child frame at `pos`. The child's own items keep their
    /// relative positions; `pos` only translates the child as a whole, as
    /// required by spec §6.3 ("child positions are translated").
    pub fn push_frame(&mut self, pos: Point, frame: Frame) {
        self.items.push((pos, FrameItem::Frame(frame)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_frame_keeps_child_intact() {
        let mut parent = Frame::new(Size::new(Abs::pt(100.0), Abs::pt(100.0)));
        let child = Frame::new(Size::new(Abs::pt(10.0), Abs::pt(10.0)));
        parent.push_frame(Point::new(Abs::pt(5.0), Abs::pt(5.0)), child);
        assert_eq!(parent.items().len(), 1);
    }
}
