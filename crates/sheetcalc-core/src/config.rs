//! Spreadsheet configuration.
//!
//! ```toml
//! version = "cs3500"
//! name_case = "upper"              # preserve | upper | lower
//! name_pattern = "[A-Z]+[0-9]+"    # optional, must match the whole name
//! ```

use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::document::{DEFAULT_VERSION, Normalizer, Spreadsheet, Validator};
use crate::error::{Result, SheetError};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;

/// How cell and variable names are normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    #[default]
    Preserve,
    Upper,
    Lower,
}

impl NameCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            NameCase::Preserve => name.to_string(),
            NameCase::Upper => name.to_ascii_uppercase(),
            NameCase::Lower => name.to_ascii_lowercase(),
        }
    }
}

/// Settings that fix a spreadsheet's normalizer, validator and version tag.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub version: String,
    pub name_case: NameCase,
    pub name_pattern: Option<String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            version: DEFAULT_VERSION.to_string(),
            name_case: NameCase::default(),
            name_pattern: None,
        }
    }
}

impl SheetConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(SheetError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Refusing to read {}: config file too large ({} bytes, max {})",
                    path.display(),
                    meta.len(),
                    MAX_CONFIG_FILE_BYTES
                ),
            )));
        }
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn normalizer(&self) -> Normalizer {
        let case = self.name_case;
        Arc::new(move |name: &str| case.apply(name))
    }

    /// Validator for normalized names. Fails if `name_pattern` is not a
    /// valid regex.
    pub fn validator(&self) -> Result<Validator> {
        let Some(pattern) = &self.name_pattern else {
            return Ok(Arc::new(|_: &str| true));
        };
        let re = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Arc::new(move |name: &str| re.is_match(name)))
    }

    /// An empty sheet with these settings.
    pub fn build(&self) -> Result<Spreadsheet> {
        Ok(Spreadsheet::from_parts(
            self.normalizer(),
            self.validator()?,
            self.version.clone(),
        ))
    }

    /// Load a saved sheet with these settings.
    pub fn open(&self, path: &Path) -> Result<Spreadsheet> {
        Spreadsheet::load_with(path, self.normalizer(), self.validator()?, &self.version)
    }
}
