//! Storage formats.

mod json;

pub use json::{SheetFile, parse_json, parse_json_content, write_json, write_json_content};
