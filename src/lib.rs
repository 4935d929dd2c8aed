//! A paginating layout engine for grids and tables: resolves track sizes and
//! lays rows out into bounded regions, handling rowspans, repeating
//! headers/footers, and grid lines.
//!
//! The two entry points, [`layout_grid`] and [`layout_table`], consume a
//! resolved [`Grid`] and a [`Regions`] source and produce one [`Frame`] per
//! region, in order. See each module's docs for the algorithm it implements.

pub mod error;
pub mod frame;
pub mod geom;
mod headers;
mod layouter;
mod lines;
pub mod measure;
pub mod model;
pub mod regions;
mod resolve;
mod rowspan;
pub mod stroke;

use std::sync::Arc;

pub use error::{Error, LayoutError};
pub use frame::{Frame, FrameItem, Geometry, Shape};
pub use geom::{Abs, Align, Axes, Fr, Point, Rel, Sides, Size, Sizing};
pub use measure::Measurable;
pub use model::{Cell, Entry, ExplicitLine, Footer, Grid, GridBuilder, Header, LinePosition};
pub use regions::Regions;
pub use stroke::{Fold, Paint, Stroke, StrokeOverride, StrokePriority};

use layouter::GridLayouter;

/// Lays `grid` out into a sequence of regions, following spec §4.3.
///
/// Returns one frame per produced region. On [`Error::OverflowUnbreakable`]
/// the frames produced before the failing region are still returned, wrapped
/// in [`LayoutError::frames`] (spec §7).
pub fn layout_grid<'a>(grid: &'a Grid, regions: Regions<'a>) -> Result<Vec<Frame>, LayoutError> {
    let layouter = GridLayouter::new(grid, regions)
        .map_err(|kind| LayoutError { frames: Vec::new(), kind })?;
    layouter.layout()
}

/// Like [`layout_grid`], but forces a visible default stroke when the grid
/// itself declares none, matching how a table (as opposed to a bare grid) is
/// conventionally drawn (spec §6.4).
pub fn layout_table<'a>(grid: &'a Grid, regions: Regions<'a>) -> Result<Vec<Frame>, LayoutError> {
    let layouter = GridLayouter::new(grid, regions)
        .map_err(|kind| LayoutError { frames: Vec::new(), kind })?;
    layouter.with_default_stroke(Arc::new(Stroke::default())).layout()
}
