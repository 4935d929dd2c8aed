//! Stroke/paint primitives and the `Fold` trait used to resolve overlapping
//! strokes per spec §4.5 ("Stroke selection per edge").

use std::sync::Arc;

/// A paint: for now, a flat color. Opaque beyond equality for this engine's
/// purposes — actual color spaces are a host concern.

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paint(pub [u8; 4]);

impl Paint {
    pub const BLACK: Paint = Paint([0, 0, 0, 255]);
}

/// A line stroke: thickness and paint.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub thickness: crate::geom::Abs,
    pub paint: Paint,
}

impl Default for Stroke {
    fn default() -> Self {
        Self { thickness: crate::geom::Abs::pt(1.0), paint: Paint::BLACK }
    }
}

/// Total order over the three stroke-selection priorities of spec §4.5:
/// `Grid < Cell < Explicit`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrokePriority {
    Grid,
    Cell,
    Explicit,
}

/// Combines two optional values where one may override the other.
///
/// For stroke resolution, `self` is the higher-priority (or later-declared)
/// value and `outer` is the value to fall back to. A `Some(None)`-shaped
/// "explicit no line" must be modeled by the caller as a distinct enum
/// variant rather than folded away — see [`crate::lines::LineStroke`].
pub trait Fold {
    fn fold(self, outer: Self) -> Self;
}

impl<T> Fold for Option<T> {
    fn fold(self, outer: Self) -> Self {
        self.or(outer)
    }
}

/// A per-side or per-line stroke override with three states, so that an
/// explicit "no line" can be distinguished from "not specified" (spec §4.5:
/// "A `null` override acts as 'no line', blocking the default, distinct from
/// 'absent'").
#[derive(Clone, Debug, PartialEq, Default)]
pub enum StrokeOverride {
    /// Not specified by this cell/line; fall through to a lower priority.
    #[default]
    Inherit,
    /// Explicitly no line, blocking whatever a lower priority would draw.
    None,
    /// An explicit stroke.
    Some(Arc<Stroke>),
}

impl StrokeOverride {
    pub fn some(stroke: Stroke) -> Self {
        Self::Some(Arc::new(stroke))
    }

    /// The stroke to actually draw, if any.
    pub fn resolved(&self) -> Option<&Arc<Stroke>> {
        match self {
            StrokeOverride::Some(stroke) => Some(stroke),
            StrokeOverride::Inherit | StrokeOverride::None => None,
        }
    }
}

impl Fold for StrokeOverride {
    /// `self` takes priority; only an `Inherit` self falls through to `outer`.
    fn fold(self, outer: Self) -> Self {
        match self {
            StrokeOverride::Inherit => outer,
            resolved => resolved,
        }
    }
}
