//! Builds a small grid with a repeating header, a rowspan, and a footer,
//! then lays it out across a couple of short regions and prints what came
//! out of each one.

use pagegrid::{
    layout_grid, Abs, Cell, Footer, Frame, Grid, GridBuilder, Header, Measurable, Regions, Size,
    Sizing,
};

/// A cell body that just reports a fixed footprint for some text, standing
/// in for whatever a real host would measure and paint.
struct Text {
    label: &'static str,
    height: Abs,
}

impl Text {
    fn new(label: &'static str, height: f64) -> Self {
        Self { label, height: Abs::pt(height) }
    }
}

impl Measurable for Text {
    fn measure_width(&self) -> Abs {
        Abs::pt(6.0 * self.label.len() as f64)
    }

    fn measure_height(&self, _width: Abs) -> Abs {
        self.height
    }

    fn realize(&self, size: Size) -> Frame {
        Frame::new(size)
    }
}

fn build_grid() -> Grid {
    GridBuilder::new(vec![Sizing::Auto, Sizing::Auto], vec![Sizing::Auto; 5])
        .header(Header { start: 0, end: 1, level: 0, repeat: true })
        .footer(Footer { start: 4, end: 5, repeat: true })
        .cell(Cell::new(0, 0, Text::new("Name", 16.0)))
        .cell(Cell::new(1, 0, Text::new("Value", 16.0)))
        .cell(Cell::new(0, 1, Text::new("Group A", 16.0)).with_rowspan(2))
        .cell(Cell::new(1, 1, Text::new("Item 1", 16.0)))
        .cell(Cell::new(1, 2, Text::new("Item 2", 16.0)))
        .cell(Cell::new(0, 3, Text::new("Group B", 16.0)))
        .cell(Cell::new(1, 3, Text::new("Item 3", 16.0)))
        .cell(Cell::new(0, 4, Text::new("Total", 16.0)))
        .cell(Cell::new(1, 4, Text::new("3 items", 16.0)))
        .build()
        .expect("grid is well-formed")
}

fn main() {
    tracing_subscriber::fmt::init();

    let grid = build_grid();
    let heights = [Abs::pt(50.0), Abs::pt(50.0)];
    let regions = Regions::sequence(Abs::pt(160.0), &heights);

    match layout_grid(&grid, regions) {
        Ok(frames) => {
            println!("laid out {} region(s)", frames.len());
            for (i, frame) in frames.iter().enumerate() {
                println!("  region {i}: {:.1}pt x {:.1}pt", frame.width().to_pt(), frame.height().to_pt());
            }
        }
        Err(err) => {
            eprintln!("layout failed after {} region(s): {err}", err.frames.len());
        }
    }
}
