//! Cell data structures.
//!
//! - [`CellContents`] - What the user entered (text, number, or formula)
//! - [`CellValue`] - What the cell evaluates to (text, number, or formula error)
//! - [`Cell`] - Contents plus cached value

use sheetcalc_engine::engine::{Formula, FormulaError};
use std::fmt;

/// The contents of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContents {
    Text(String),
    Number(f64),
    Formula(Formula),
}

impl CellContents {
    /// Empty text is the contents of every cell that was never set.
    pub fn empty() -> CellContents {
        CellContents::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Text(s) if s.is_empty())
    }

    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContents::Formula(f) => Some(f),
            _ => None,
        }
    }
}

/// Canonical string form, the same text that `set_contents_of_cell` accepts:
/// `"5"`, `"Hello"`, `"=A1+2"`.
impl fmt::Display for CellContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellContents::Text(s) => f.write_str(s),
            CellContents::Number(n) => write!(f, "{}", n),
            CellContents::Formula(formula) => write!(f, "={}", formula),
        }
    }
}

/// The evaluated value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Error(FormulaError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<Result<f64, FormulaError>> for CellValue {
    fn from(result: Result<f64, FormulaError>) -> Self {
        match result {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e.reason()),
        }
    }
}

/// A cell in the spreadsheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub contents: CellContents,
    pub value: CellValue,
}

impl Cell {
    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: CellContents::Text(text.to_string()),
            value: CellValue::Text(text.to_string()),
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            contents: CellContents::Number(n),
            value: CellValue::Number(n),
        }
    }

    /// A formula cell with an already computed value.
    pub fn new_formula(formula: Formula, value: CellValue) -> Cell {
        Cell {
            contents: CellContents::Formula(formula),
            value,
        }
    }

    /// Canonical string form of the contents, used for persistence.
    pub fn to_input_string(&self) -> String {
        self.contents.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_strings() {
        assert_eq!(Cell::new_number(5.0).to_input_string(), "5");
        assert_eq!(Cell::new_number(2.5).to_input_string(), "2.5");
        assert_eq!(Cell::new_text("Hello").to_input_string(), "Hello");
        let f: Formula = "A1 + 2".parse().unwrap();
        assert_eq!(
            Cell::new_formula(f, CellValue::Number(0.0)).to_input_string(),
            "=A1+2"
        );
    }

    #[test]
    fn test_empty_contents() {
        assert!(CellContents::empty().is_empty());
        assert!(!CellContents::Text(" ".to_string()).is_empty());
        assert!(!CellContents::Number(0.0).is_empty());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(CellValue::Number(4.5).to_string(), "4.5");
        assert_eq!(
            CellValue::Error(FormulaError::DivisionByZero).to_string(),
            "#ERROR: Division by 0."
        );
    }
}
