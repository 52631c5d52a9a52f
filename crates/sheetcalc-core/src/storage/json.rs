//! JSON spreadsheet format.
//!
//! ```json
//! {
//!   "Cells": {
//!     "A1": { "StringForm": "5" },
//!     "B3": { "StringForm": "=A1+2" }
//!   },
//!   "Version": "default"
//! }
//! ```
//!
//! Each `StringForm` is the text that reproduces the cell when passed back to
//! `set_contents_of_cell`. Cell order in the file is preserved on read.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// The durable form of a spreadsheet: version tag plus cell inputs in
/// stored order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetFile {
    pub version: String,
    pub cells: Vec<(String, String)>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SavedSheet {
    #[serde(rename = "Cells")]
    cells: Map<String, Value>,
    #[serde(rename = "Version")]
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SavedCell {
    #[serde(rename = "StringForm")]
    string_form: String,
}

/// Read a JSON spreadsheet file
pub fn parse_json(path: &Path) -> Result<SheetFile> {
    let content = fs::read_to_string(path)?;
    parse_json_content(&content)
}

/// Parse JSON spreadsheet content from a string
pub fn parse_json_content(content: &str) -> Result<SheetFile> {
    let saved: SavedSheet = serde_json::from_str(content)?;
    let cells = saved
        .cells
        .into_iter()
        .map(|(name, value)| -> Result<(String, String)> {
            Ok((name, SavedCell::deserialize(value)?.string_form))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SheetFile {
        version: saved.version,
        cells,
    })
}

/// Write a spreadsheet to a JSON file
pub fn write_json(path: &Path, file: &SheetFile) -> Result<()> {
    let content = write_json_content(file)?;
    fs::write(path, content)?;
    Ok(())
}

/// Render a spreadsheet as indented JSON
pub fn write_json_content(file: &SheetFile) -> Result<String> {
    let mut cells = Map::new();
    for (name, string_form) in &file.cells {
        let cell = SavedCell {
            string_form: string_form.clone(),
        };
        cells.insert(name.clone(), serde_json::to_value(cell)?);
    }
    let saved = SavedSheet {
        cells,
        version: file.version.clone(),
    };
    Ok(serde_json::to_string_pretty(&saved)? + "\n")
}
