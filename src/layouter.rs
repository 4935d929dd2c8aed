//! The region paginator, see spec §4.3.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{Error, LayoutError};
use crate::frame::{Frame, FrameItem, Geometry, Shape};
use crate::geom::{Abs, Align, Point, Size, Sizing};
use crate::headers::HeaderFooterManager;
use crate::lines::{self, LineSegment};
use crate::measure::MeasureCache;
use crate::model::{Entry, Grid};
use crate::regions::Regions;
use crate::resolve::{self, cell_spanned_width};
use crate::rowspan::RowspanTracker;
use crate::stroke::Stroke;

/// What a row contains, decided once per row per spec §4.3 step 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowKind {
    Header(u32),
    Footer,
    Content,
}

/// A row placed in the region currently being assembled. Fractional rows
/// carry `fr` and a placeholder `frame` until region close resizes them
/// (spec §9, "Fractional row deferral").
struct PlacedRow {
    y: usize,
    offset: Abs,
    height: Abs,
    frame: Option<Frame>,
    fr: Option<f64>,
}

/// A rowspanning cell's piece realized for the region being closed, pushed
/// onto the region frame alongside ordinary rows.
struct RowspanPiece {
    dx: Abs,
    dy: Abs,
    frame: Frame,
}

/// Lays a [`Grid`] out into a sequence of region frames. Grounded on the
/// teacher's `GridLayouter` and its `layout`/`layout_row`/`finish_region`
/// phase split, simplified to the algorithm spec §4.3 states: an
/// unbreakable-row-group pre-simulation runs before an unbreakable rowspan's
/// origin row (§4.2, `SPEC_FULL.md` §C.4), and a breakable rowspan whose
/// ending-row obligation alone exceeds a single region is credited
/// incrementally across further breaks rather than forced into one region.
/// No cross-region gutter-compensation simulation, though (`SPEC_FULL.md` §C).
pub struct GridLayouter<'a> {
    grid: &'a Grid,
    regions: Regions<'a>,
    cache: MeasureCache,
    col_widths: Vec<Abs>,
    rowspans: RowspanTracker,
    headers: HeaderFooterManager,
    /// The grid's own default stroke, or a host-supplied fallback for
    /// `layout_table` (spec §6.4: "table... with default stroke applied").
    default_stroke: Option<Arc<Stroke>>,
    finished: Vec<Frame>,
    next_row: usize,
}

impl<'a> GridLayouter<'a> {
    pub fn new(grid: &'a Grid, regions: Regions<'a>) -> Result<Self, Error> {
        let cache = MeasureCache::new();
        let col_widths = resolve::resolve_columns(grid, regions.size.x, &cache)?;
        let mut headers = HeaderFooterManager::new(grid.footer);

        // A repeating footer must reserve space in every region, including
        // ones laid out long before its rows are reached in row order, so
        // it is measured and realized once, up front.
        if let Some(footer) = grid.footer {
            let mut combined = Frame::new(Size::new(regions.size.x, Abs::zero()));
            let mut cursor = Abs::zero();
            for y in footer.range() {
                let height =
                    resolve::resolve_row_height(grid, y, &col_widths, regions.full, &cache)?;
                let row_frame = realize_row(grid, &col_widths, regions.size.x, y, height, &cache);
                combined.push_frame(Point::new(Abs::zero(), cursor), row_frame);
                cursor += height;
            }
            combined.set_size(Size::new(regions.size.x, cursor));
            headers.set_footer_frame(combined);
        }

        Ok(Self {
            grid,
            regions,
            cache,
            col_widths,
            rowspans: RowspanTracker::new(),
            headers,
            default_stroke: grid.stroke.clone(),
            finished: Vec::new(),
            next_row: 0,
        })
    }

    /// Overrides the stroke drawn where the grid itself has none, used by
    /// [`crate::layout_table`] to force a visible default (spec §6.4).
    pub(crate) fn with_default_stroke(mut self, stroke: Arc<Stroke>) -> Self {
        if self.default_stroke.is_none() {
            self.default_stroke = Some(stroke);
        }
        self
    }

    /// Runs the full paginator, producing one frame per region.
    #[instrument(skip(self), fields(rows = self.grid.row_count))]
    pub fn layout(mut self) -> Result<Vec<Frame>, LayoutError> {
        while self.next_row < self.grid.row_count {
            if let Err(kind) = self.layout_region() {
                warn!(row = self.next_row, "layout failed partway through region");
                return Err(LayoutError { frames: self.finished, kind });
            }
        }
        Ok(self.finished)
    }

    fn row_kind(&self, y: usize) -> RowKind {
        if let Some(header) = self.grid.headers.iter().find(|h| h.range().contains(&y)) {
            return RowKind::Header(header.level);
        }
        if let Some(footer) = &self.grid.footer {
            if footer.range().contains(&y) {
                return RowKind::Footer;
            }
        }
        RowKind::Content
    }

    /// Lays out rows until the current region is full or the grid is done,
    /// then closes it and appends its frame to `self.finished`.
    fn layout_region(&mut self) -> Result<(), Error> {
        // Whether this region is the document's last is decided from the
        // region source rather than from how many rows actually fit, so the
        // footer's reserve and its placement never disagree with each other.
        let is_probably_final = self.regions.in_last();
        let footer_reserve = self.headers.footer_reserve(is_probably_final);
        let header_reserve = self.headers.repeating_header_height();
        let available = self.regions.size.y - header_reserve - footer_reserve;

        let mut used = Abs::zero();
        let mut placed_any_content = false;
        let mut placed_any_row = false;
        let mut rows: Vec<PlacedRow> = Vec::new();
        let mut pieces: Vec<RowspanPiece> = Vec::new();
        let mut fr_total = 0.0;

        let mut y = self.next_row;
        while y < self.grid.row_count {
            let kind = self.row_kind(y);

            if kind == RowKind::Footer {
                // Already measured and reserved up front; just skip past it.
                y += 1;
                continue;
            }

            if let RowKind::Header(level) = kind {
                self.headers.handle_conflicts(level);
            }
            if kind == RowKind::Content && self.headers.has_pending() {
                self.headers.promote_all_pending();
            }

            let sizing = self.grid.rows[y];
            let fr = match sizing {
                Sizing::Fr(fr) => Some(fr.get()),
                _ => None,
            };

            let gutter_add = if placed_any_row { self.grid.row_gutter } else { Abs::zero() };
            let row_top = used + gutter_add;

            // Unbreakable-row-group pre-simulation (spec §4.2): a rowspanning
            // cell that cannot split across regions forces a break before its
            // origin row if its full natural height would not fit in what's
            // left of this region, rather than discovering mid-group that it
            // doesn't fit.
            if kind == RowKind::Content {
                let mut unbreakable_group_height = Abs::zero();
                for x in 0..self.grid.col_count {
                    if let Some(Entry::Cell(idx)) = self.grid.entry_at(x, y) {
                        let cell = &self.grid.cells[*idx];
                        if cell.y == y && cell.rowspan > 1 && !cell.breakable {
                            let measured = self.measure_rowspan_entry(cell.id)?;
                            unbreakable_group_height.set_max(measured);
                        }
                    }
                }
                if !unbreakable_group_height.approx_empty()
                    && !available.fits(row_top + unbreakable_group_height)
                    && placed_any_row
                    && !self.headers.has_pending()
                    && self.regions.may_progress()
                {
                    debug!(row = y, "closing region before unbreakable rowspan group that would not fit");
                    break;
                }
            }

            let mut height = resolve::resolve_row_height(
                self.grid,
                y,
                &self.col_widths,
                self.regions.full,
                &self.cache,
            )?;
            let extra = self
                .rowspans
                .extra_height_obligation(y, |entry| self.measure_rowspan_entry(entry.cell_id))?;
            height += extra;

            let fits = available.fits(row_top + height);
            let can_break_before = !self.rowspans.has_active_unbreakable()
                && placed_any_content
                && !self.headers.has_pending()
                && self.regions.may_progress();

            // A breakable rowspan's ending-row obligation can exceed even a
            // fresh region's capacity on its own (no sibling cell in its rows
            // to spread the height across beforehand). Rather than forcing
            // `OverflowUnbreakable` on content that is, in fact, splittable,
            // credit this region's remaining space toward the span and retry
            // the same row once more regions are available, converging once
            // the residual obligation finally fits in one region.
            let fits_fresh = available.fits(height);
            if !fits
                && !fits_fresh
                && extra.to_pt() > 0.0
                && self.regions.may_progress()
                && !self.rowspans.has_unbreakable_ending_at(y)
            {
                let credited = (available - row_top).max(Abs::zero());
                self.rowspans.credit_progress(y, credited);
                debug!(row = y, credited = credited.to_pt(), "crediting partial rowspan progress before region break");
                break;
            }

            if !fits && can_break_before {
                debug!(row = y, "closing region before row that does not fit");
                break;
            }
            if !fits && !placed_any_row && fr.is_none() {
                warn!(row = y, "row does not fit even a fresh region, placing clipped");
            }

            used = row_top;
            let row_frame = if fr.is_some() { None } else { Some(self.realize_row(y, height)) };
            rows.push(PlacedRow { y, offset: row_top, height, frame: row_frame, fr });
            if fr.is_none() {
                used += height;
            }
            fr_total += fr.unwrap_or(0.0);

            self.rowspans.note_row_closed(y, height);
            for entry in self.rowspans.complete(y) {
                let piece_height = entry.completed_piece_height();
                let dy = if entry.in_origin_region() { entry.origin_offset } else { Abs::zero() };
                let cell = &self.grid.cells[entry.cell_id];
                let width = cell_spanned_width(self.grid, &self.col_widths, cell);
                let frame = cell.body.realize(Size::new(width, piece_height));
                pieces.push(RowspanPiece { dx: entry.dx, dy, frame });
            }

            if let RowKind::Header(level) = kind {
                let frame = rows.last().and_then(|r| r.frame.clone());
                self.headers.add_pending(
                    level,
                    true,
                    y..y + 1,
                    frame.into_iter().collect(),
                    vec![height],
                );
            } else {
                placed_any_content = true;
            }
            placed_any_row = true;

            for x in 0..self.grid.col_count {
                if let Some(Entry::Cell(idx)) = self.grid.entry_at(x, y) {
                    let cell = &self.grid.cells[*idx];
                    if cell.y == y && cell.rowspan > 1 {
                        let dx: Abs = self.col_widths[..cell.x].iter().copied().sum::<Abs>()
                            + self.grid.col_gutter * cell.x as f64;
                        self.rowspans.register(
                            cell.id,
                            cell.x,
                            cell.y,
                            cell.colspan,
                            cell.rowspan,
                            dx,
                            row_top,
                            available - row_top,
                            cell.breakable,
                        );
                    }
                }
            }

            y += 1;
        }

        self.next_row = y;
        let is_final = self.next_row >= self.grid.row_count;

        // Orphan prevention (spec §4.3 step 3 / §4.4): a region with only
        // pending headers and no content row is discarded wholesale.
        if self.headers.check_orphan(placed_any_content) {
            self.headers.clear_pending();
            rows.clear();
            pieces.clear();
            used = Abs::zero();
        }

        // Still-active rowspans contribute their in-progress piece for this
        // region too, even though they haven't reached their final row yet.
        for entry in self.rowspans.active_entries() {
            let piece_height = entry.in_progress_piece_height();
            if piece_height.approx_empty() {
                continue;
            }
            let dy = if entry.in_origin_region() { entry.origin_offset } else { Abs::zero() };
            let cell = &self.grid.cells[entry.cell_id];
            let width = cell_spanned_width(self.grid, &self.col_widths, cell);
            let frame = cell.body.realize(Size::new(width, piece_height));
            pieces.push(RowspanPiece { dx: entry.dx, dy, frame });
        }

        // Fractional row sizing, spec §4.3 step 3.
        let remaining = (available - used).max(Abs::zero());
        if fr_total > 0.0 {
            for row in &mut rows {
                if let Some(fr) = row.fr {
                    row.height = remaining * (fr / fr_total);
                    row.frame = Some(self.realize_row(row.y, row.height));
                }
            }
        }

        let mut frame = Frame::new(Size::new(self.regions.size.x, self.regions.size.y));

        let mut cursor = Abs::zero();
        for (h_frame, h_height) in self.headers.prepare_for_new_region() {
            frame.push_frame(Point::new(Abs::zero(), cursor), h_frame.clone());
            cursor += h_height;
        }

        for row in &rows {
            if let Some(row_frame) = &row.frame {
                frame.push_frame(Point::new(Abs::zero(), cursor + row.offset), row_frame.clone());
            }
        }
        for piece in &pieces {
            frame.push_frame(Point::new(piece.dx, cursor + piece.dy), piece.frame.clone());
        }

        if self.headers.should_show_footer(is_probably_final) {
            if let Some(footer_frame) = self.headers.footer_frame() {
                let footer_top = self.regions.size.y - footer_reserve;
                frame.push_frame(Point::new(Abs::zero(), footer_top), footer_frame.clone());
            }
        }

        self.append_lines(&mut frame, &rows);
        self.finished.push(frame);

        if !is_final {
            if !self.regions.advance() {
                return Err(Error::OverflowUnbreakable);
            }
            self.rowspans.advance_region();
        }

        Ok(())
    }

    fn measure_rowspan_entry(&self, cell_id: usize) -> Result<Abs, Error> {
        let cell = &self.grid.cells[cell_id];
        let width = cell_spanned_width(self.grid, &self.col_widths, cell);
        crate::measure::check_dimension(
            self.cache.height(cell.id, cell.body.as_ref(), width),
            cell.x,
            cell.y,
        )
    }

    fn realize_row(&self, y: usize, height: Abs) -> Frame {
        realize_row(self.grid, &self.col_widths, self.regions.size.x, y, height, &self.cache)
    }

    fn append_lines(&self, frame: &mut Frame, rows: &[PlacedRow]) {
        let row_offsets: Vec<(usize, Abs)> = rows.iter().map(|r| (r.y, r.height)).collect();
        let h_segments = lines::horizontal_segments(
            self.grid,
            self.default_stroke.clone(),
            &self.col_widths,
            &row_offsets,
        );
        let v_segments = lines::vertical_segments(
            self.grid,
            self.default_stroke.clone(),
            &self.col_widths,
            &row_offsets,
        );
        let total_width = frame.width();
        for segment in h_segments.into_iter().flatten() {
            push_segment(frame, segment, false, self.grid.rtl, total_width);
        }
        for segment in v_segments.into_iter().flatten() {
            push_segment(frame, segment, true, self.grid.rtl, total_width);
        }
    }
}

/// Realizes a single non-spanning row into its own frame: cell fills, then
/// cell content aligned within its box per [`crate::model::Cell::align`]
/// (spec §3), left-to-right (or mirrored in RTL, spec §4.5).
fn realize_row(
    grid: &Grid,
    col_widths: &[Abs],
    region_width: Abs,
    y: usize,
    height: Abs,
    cache: &MeasureCache,
) -> Frame {
    let mut frame = Frame::new(Size::new(region_width, height));
    for x in 0..grid.col_count {
        if let Some(Entry::Cell(idx)) = grid.entry_at(x, y) {
            let cell = &grid.cells[*idx];
            if cell.y != y || cell.rowspan > 1 {
                continue;
            }
            let cell_width = cell_spanned_width(grid, col_widths, cell);
            let dx: Abs = if grid.rtl {
                region_width - col_widths[..cell.x + cell.colspan].iter().copied().sum::<Abs>()
            } else {
                col_widths[..cell.x].iter().copied().sum::<Abs>()
                    + grid.col_gutter * cell.x as f64
            };
            if let Some(fill) = cell.fill {
                frame.push(
                    Point::new(dx, Abs::zero()),
                    FrameItem::Shape(Shape {
                        geometry: Geometry::Rect(Size::new(cell_width, height)),
                        fill: Some(fill),
                        stroke: None,
                    }),
                );
            }

            // Reuses the exact cache key `resolve_row_height` queried for an
            // Auto row, so this is a cache hit rather than a second measure.
            let natural_width = cell.body.measure_width().min(cell_width);
            let natural_height = cache.height(cell.id, cell.body.as_ref(), cell_width).min(height);
            let content = cell.body.realize(Size::new(natural_width, natural_height));
            let align_dx = match cell.align.x {
                Align::Start => Abs::zero(),
                Align::Center => (cell_width - natural_width) / 2.0,
                Align::End => cell_width - natural_width,
            };
            let align_dy = match cell.align.y {
                Align::Start => Abs::zero(),
                Align::Center => (height - natural_height) / 2.0,
                Align::End => height - natural_height,
            };
            frame.push_frame(Point::new(dx + align_dx, align_dy), content);
        }
    }
    frame
}

fn push_segment(frame: &mut Frame, segment: LineSegment, vertical: bool, rtl: bool, total_width: Abs) {
    let (point, end) = if vertical {
        let x = if rtl { total_width - segment.offset } else { segment.offset };
        (Point::new(x, segment.start), Point::new(Abs::zero(), segment.length))
    } else {
        let x = if rtl { total_width - segment.start - segment.length } else { segment.start };
        (Point::new(x, segment.offset), Point::new(segment.length, Abs::zero()))
    };
    frame.push(
        point,
        FrameItem::Shape(Shape { geometry: Geometry::Line(end), fill: None, stroke: Some(segment.stroke) }),
    );
}
