//! Track size resolution, see spec §4.1.

pub mod columns;
pub mod rows;

pub use columns::resolve_columns;
pub use rows::{cell_spanned_width, resolve_row_height};
