use log::{debug, warn};
use sheetcalc_engine::engine::{Formula, recalculation_order};

use super::{Cell, CellContents, CellValue, Spreadsheet};
use crate::error::{Result, SheetError};

/// How a piece of user input is interpreted.
enum Input<'a> {
    Number(f64),
    Formula(&'a str),
    Text(&'a str),
}

impl<'a> Input<'a> {
    /// - Parses as a finite number -> Number
    /// - Starts with '=' -> Formula (without the '=')
    /// - Otherwise -> Text, stored verbatim
    fn classify(content: &'a str) -> Input<'a> {
        if let Ok(n) = content.trim().parse::<f64>()
            && n.is_finite()
        {
            return Input::Number(n);
        }
        if let Some(formula) = content.strip_prefix('=') {
            return Input::Formula(formula);
        }
        Input::Text(content)
    }
}

impl Spreadsheet {
    /// Set the contents of the named cell from user input.
    ///
    /// Returns the normalized name followed by every cell that depends on it
    /// directly or indirectly, in an order that is safe to recalculate from
    /// left to right. Those cells have already been re-evaluated when this
    /// returns.
    ///
    /// An invalid name, a malformed formula, or a formula that would make
    /// the cell depend on itself fails without changing the sheet.
    pub fn set_contents_of_cell(&mut self, name: &str, content: &str) -> Result<Vec<String>> {
        let name = self.checked_name(name)?;

        let order = match Input::classify(content) {
            Input::Number(n) => self.set_plain(&name, Cell::new_number(n))?,
            Input::Text(text) => self.set_plain(&name, Cell::new_text(text))?,
            Input::Formula(text) => {
                let formula = Formula::new(text, &*self.normalize, &*self.is_valid)?;
                self.set_formula(&name, formula)?
            }
        };

        self.recalculate(&name, &order);
        Ok(order)
    }

    /// Compute the recalculation order for several changed cells at once.
    pub fn cells_to_recalculate<I, S>(&self, names: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| self.checked_name(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        recalculation_order(&self.graph, &names).map_err(|cycle| SheetError::Circular(cycle.cell))
    }

    /// Store a text or number cell. Such a cell reads no other cells.
    fn set_plain(&mut self, name: &str, cell: Cell) -> Result<Vec<String>> {
        self.note_change(name, &cell.contents);
        self.cells.insert(name.to_string(), cell);
        self.graph.replace_dependees(name, std::iter::empty::<&str>());
        // With no dependees left, no loop can pass through this cell.
        recalculation_order(&self.graph, [name]).map_err(|cycle| SheetError::Circular(cycle.cell))
    }

    /// Store a formula cell, unless doing so would close a dependency loop.
    fn set_formula(&mut self, name: &str, formula: Formula) -> Result<Vec<String>> {
        let previous: Vec<String> = self.graph.dependees(name).map(str::to_string).collect();
        self.graph.replace_dependees(name, formula.variables());

        let order = match recalculation_order(&self.graph, [name]) {
            Ok(order) => order,
            Err(cycle) => {
                // The cell itself was never touched; put the edges back.
                self.graph.replace_dependees(name, &previous);
                warn!(
                    "rejected formula ={} for {}: cycle through {}",
                    formula, name, cycle.cell
                );
                return Err(SheetError::Circular(name.to_string()));
            }
        };

        let value = self.evaluate(&formula);
        let contents = CellContents::Formula(formula);
        self.note_change(name, &contents);
        self.cells.insert(
            name.to_string(),
            Cell {
                contents,
                value,
            },
        );
        Ok(order)
    }

    /// Re-evaluate every formula cell in `order` except `changed`, whose
    /// value is already current.
    fn recalculate(&mut self, changed: &str, order: &[String]) {
        for name in order.iter().filter(|n| n.as_str() != changed) {
            let value = match self.cells.get(name).and_then(|cell| cell.contents.as_formula()) {
                Some(formula) => self.evaluate(formula),
                None => continue,
            };
            debug!("recalculated {} = {}", name, value);
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    fn evaluate(&self, formula: &Formula) -> CellValue {
        formula.evaluate(|var| self.lookup(var)).into()
    }

    /// Numeric value of a cell, or `None` when it is absent or not a number.
    fn lookup(&self, name: &str) -> Option<f64> {
        self.cells.get(name)?.value.as_number()
    }

    fn note_change(&mut self, name: &str, contents: &CellContents) {
        let same = match self.cells.get(name) {
            Some(cell) => cell.contents == *contents,
            None => contents.is_empty(),
        };
        if !same {
            self.changed = true;
        }
    }
}
