//! Spreadsheet document state and logic (UI-agnostic).

mod cell;
mod io;
mod ops;
mod state;

pub use cell::{Cell, CellContents, CellValue};
pub use state::{DEFAULT_VERSION, Normalizer, Spreadsheet, Validator};
