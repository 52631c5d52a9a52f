//! sheetcalc-core - UI-agnostic spreadsheet document, storage and configuration.

pub mod config;
pub mod document;
pub mod error;
pub mod storage;

pub use config::{NameCase, SheetConfig};
pub use document::{Cell, CellContents, CellValue, Normalizer, Spreadsheet, Validator};
pub use error::{Result, SheetError};

pub use sheetcalc_engine::engine::{FormatError, Formula, FormulaError};
