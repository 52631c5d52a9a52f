use sheetcalc_engine::engine::{DependencyGraph, is_legal_name};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use super::{Cell, CellContents, CellValue};
use crate::error::{Result, SheetError};

/// Version tag used when none is configured.
pub const DEFAULT_VERSION: &str = "default";

/// Maps a raw cell or variable name to its canonical identity.
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Restricts which normalized names are acceptable.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// UI-agnostic spreadsheet: named cells plus the dependency graph between
/// them.
///
/// Not internally synchronized. Hosts that share a sheet across threads must
/// hold an exclusive lock around every operation.
pub struct Spreadsheet {
    /// Normalized name -> cell
    pub(crate) cells: HashMap<String, Cell>,
    /// Edge (v, c) whenever the formula in c references v
    pub(crate) graph: DependencyGraph,
    pub(crate) normalize: Normalizer,
    pub(crate) is_valid: Validator,
    pub(crate) version: String,
    /// Whether the sheet has been modified since it was created, loaded or saved
    pub(crate) changed: bool,
    /// Where `save_file` writes to
    pub(crate) file_path: Option<PathBuf>,
}

impl Spreadsheet {
    /// An empty sheet that accepts every legal name as-is, with version
    /// `"default"`.
    pub fn new() -> Self {
        Self::with_rules(|s| s.to_string(), |_| true, DEFAULT_VERSION)
    }

    /// An empty sheet with the given normalizer, validator and version tag.
    pub fn with_rules<N, V>(normalize: N, is_valid: V, version: impl Into<String>) -> Self
    where
        N: Fn(&str) -> String + Send + Sync + 'static,
        V: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(normalize), Arc::new(is_valid), version.into())
    }

    pub(crate) fn from_parts(normalize: Normalizer, is_valid: Validator, version: String) -> Self {
        Spreadsheet {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            normalize,
            is_valid,
            version,
            changed: false,
            file_path: None,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True if any cell contents changed since creation, load or save.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Validate and normalize a cell name.
    pub(crate) fn checked_name(&self, name: &str) -> Result<String> {
        if !is_legal_name(name) {
            return Err(SheetError::InvalidName(name.to_string()));
        }
        let normalized = (self.normalize)(name);
        if !is_legal_name(&normalized) || !(self.is_valid)(&normalized) {
            return Err(SheetError::InvalidName(name.to_string()));
        }
        Ok(normalized)
    }

    /// Contents of the named cell; empty text if it was never set.
    pub fn get_cell_contents(&self, name: &str) -> Result<CellContents> {
        let name = self.checked_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or_else(CellContents::empty, |cell| cell.contents.clone()))
    }

    /// Value of the named cell; empty text if it was never set.
    pub fn get_cell_value(&self, name: &str) -> Result<CellValue> {
        let name = self.checked_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or_else(|| CellValue::Text(String::new()), |cell| cell.value.clone()))
    }

    /// Names of all cells whose contents are not the empty string.
    pub fn get_names_of_all_nonempty_cells(&self) -> BTreeSet<String> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.contents.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Cells whose formulas reference `name` directly.
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<String>> {
        let name = self.checked_name(name)?;
        Ok(self.graph.dependents(&name).map(str::to_string).collect())
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("dependencies", &self.graph.len())
            .field("version", &self.version)
            .field("changed", &self.changed)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}
