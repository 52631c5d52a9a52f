//! Spreadsheet engine API.
//!
//! This module provides the computation core of the spreadsheet:
//!
//! - [`tokenize`], [`Token`], [`TokenKind`] - Splitting formula text into tokens
//! - [`Formula`], [`FormatError`] - Grammar validation and canonical formulas
//! - [`FormulaError`] - Evaluation-time error values (division by zero, undefined variable)
//! - [`DependencyGraph`] - Bidirectional "must be evaluated before" relation
//! - [`recalculation_order`] - Topological recalculation order with cycle detection
//! - [`is_legal_name`] - Variable/cell name grammar

mod cycle;
mod deps;
mod eval;
mod formula;
mod name;
mod token;

pub use cycle::{CycleError, recalculation_order};
pub use deps::DependencyGraph;
pub use eval::FormulaError;
pub use formula::{FormatError, Formula};
pub use name::is_legal_name;
pub use token::{Operator, Token, TokenKind, Tokens, tokenize};
