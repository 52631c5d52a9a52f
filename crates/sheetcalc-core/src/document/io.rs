use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Normalizer, Spreadsheet, Validator};
use crate::error::{Result, SheetError};
use crate::storage::{SheetFile, parse_json, parse_json_content, write_json, write_json_content};

impl Spreadsheet {
    /// Durable form of the sheet: every non-empty cell's input string,
    /// sorted by name, plus the version tag.
    pub fn to_sheet_file(&self) -> SheetFile {
        let cells = self
            .get_names_of_all_nonempty_cells()
            .into_iter()
            .filter_map(|name| {
                let input = self.cells.get(&name)?.to_input_string();
                Some((name, input))
            })
            .collect();
        SheetFile {
            version: self.version.clone(),
            cells,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        write_json_content(&self.to_sheet_file())
    }

    /// Write the sheet to `path` and remember it as the current file.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        write_json(path, &self.to_sheet_file())?;
        self.file_path = Some(path.to_path_buf());
        self.changed = false;
        info!("saved {}", path.display());
        Ok(())
    }

    /// Save to the current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SheetError::NoFilePath);
        };
        self.save(&path)?;
        Ok(path)
    }

    /// Rebuild a sheet from its durable form by replaying every cell, in
    /// stored order, through [`set_contents_of_cell`](Self::set_contents_of_cell).
    ///
    /// Fails if the stored version differs from `version` or if any cell is
    /// rejected. The rebuilt sheet starts out unchanged.
    pub fn from_sheet_file(
        file: &SheetFile,
        normalize: Normalizer,
        is_valid: Validator,
        version: &str,
    ) -> Result<Self> {
        if file.version != version {
            return Err(SheetError::VersionMismatch {
                expected: version.to_string(),
                found: file.version.clone(),
            });
        }

        let mut sheet = Spreadsheet::from_parts(normalize, is_valid, version.to_string());
        for (name, input) in &file.cells {
            if let Err(e) = sheet.set_contents_of_cell(name, input) {
                warn!("failed to load cell {}: {}", name, e);
                return Err(SheetError::Load {
                    cell: name.clone(),
                    source: Box::new(e),
                });
            }
        }
        sheet.changed = false;
        Ok(sheet)
    }

    /// Parse a sheet from JSON text; see [`from_sheet_file`](Self::from_sheet_file).
    pub fn from_json<N, V>(content: &str, normalize: N, is_valid: V, version: &str) -> Result<Self>
    where
        N: Fn(&str) -> String + Send + Sync + 'static,
        V: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let file = parse_json_content(content)?;
        Self::from_sheet_file(&file, Arc::new(normalize), Arc::new(is_valid), version)
    }

    /// Load a sheet from a JSON file and remember it as the current file.
    pub fn load<N, V>(path: &Path, normalize: N, is_valid: V, version: &str) -> Result<Self>
    where
        N: Fn(&str) -> String + Send + Sync + 'static,
        V: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::load_with(path, Arc::new(normalize), Arc::new(is_valid), version)
    }

    pub(crate) fn load_with(
        path: &Path,
        normalize: Normalizer,
        is_valid: Validator,
        version: &str,
    ) -> Result<Self> {
        let file = parse_json(path)?;
        let mut sheet = Self::from_sheet_file(&file, normalize, is_valid, version)?;
        sheet.file_path = Some(path.to_path_buf());
        info!("loaded {} ({} cells)", path.display(), file.cells.len());
        Ok(sheet)
    }
}
