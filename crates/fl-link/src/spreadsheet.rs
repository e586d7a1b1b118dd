//! Spreadsheet operation facade.

use std::fmt;

use fl_host::{CellValue, ObjectHandle};

use crate::error::LinkResult;
use crate::session::Session;

/// Typed view of one spreadsheet operation.
///
/// Cells are addressed by "A1"-style references. Values and formulas are
/// separate surfaces, matching how the host exposes them: writing a value
/// clears the cell's formula, and attaching a formula leaves the last value
/// in place until the host recalculates.
pub struct Spreadsheet<'a> {
    session: &'a Session,
    object: ObjectHandle,
    name: String,
}

// Manual impl: the borrowed `Session` holds a `dyn HostInstance`, which has
// no `Debug` bound.
impl fmt::Debug for Spreadsheet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("object", &self.object)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<'a> Spreadsheet<'a> {
    pub(crate) fn new(session: &'a Session, object: ObjectHandle, name: String) -> Self {
        Self {
            session,
            object,
            name,
        }
    }

    /// Operation name as the host knows it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of a cell.
    pub fn cell(&self, cell: &str) -> LinkResult<CellValue> {
        Ok(self.session.host()?.cell_value(self.object, cell)?)
    }

    /// Set a cell to a literal value.
    pub fn set_cell(&self, cell: &str, value: &CellValue) -> LinkResult<()> {
        Ok(self.session.host()?.set_cell_value(self.object, cell, value)?)
    }

    /// Set a cell to a number.
    pub fn set_number(&self, cell: &str, value: f64) -> LinkResult<()> {
        self.set_cell(cell, &CellValue::Number(value))
    }

    /// Set a cell to a text value.
    pub fn set_text(&self, cell: &str, text: &str) -> LinkResult<()> {
        self.set_cell(cell, &CellValue::Text(text.to_owned()))
    }

    /// Formula attached to a cell, if any.
    pub fn formula(&self, cell: &str) -> LinkResult<Option<String>> {
        Ok(self.session.host()?.cell_formula(self.object, cell)?)
    }

    /// Attach a formula to a cell.
    pub fn set_formula(&self, cell: &str, formula: &str) -> LinkResult<()> {
        Ok(self
            .session
            .host()?
            .set_cell_formula(self.object, cell, formula)?)
    }
}
