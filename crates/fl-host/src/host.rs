//! Host instance trait and shared boundary types.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::HostResult;
use crate::handle::{CaseHandle, ObjectHandle};

/// Flowsheet collections the adapter can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Material streams of the top-level flowsheet.
    MaterialStreams,
    /// Energy streams of the top-level flowsheet.
    EnergyStreams,
    /// Unit operations, including spreadsheets.
    Operations,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::MaterialStreams,
        Collection::EnergyStreams,
        Collection::Operations,
    ];

    /// Singular noun used in error messages and listings.
    pub fn noun(&self) -> &'static str {
        match self {
            Collection::MaterialStreams => "material stream",
            Collection::EnergyStreams => "energy stream",
            Collection::Operations => "operation",
        }
    }
}

/// Descriptive facts about an open simulation case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseInfo {
    /// Case title as the host shows it.
    pub title: String,
    /// Backing file, if the case has been saved before.
    pub path: Option<PathBuf>,
}

/// Payload of a spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

/// Trait for simulator host backends.
///
/// Implementations must be thread-safe (Send + Sync). A `HostInstance` stands
/// for one running host process; cases and flowsheet objects are addressed
/// through opaque handles issued by that instance.
///
/// Unit labels are passed through verbatim: the host owns all unit
/// conversion, and an implementation that cannot express a property in the
/// requested unit returns [`HostError::UnitMismatch`] rather than guessing.
///
/// [`HostError::UnitMismatch`]: crate::error::HostError::UnitMismatch
pub trait HostInstance: Send + Sync {
    /// Backend name (for debugging/logging).
    fn name(&self) -> &str;

    /// Show or hide the host's user interface.
    fn set_visible(&self, visible: bool) -> HostResult<()>;

    /// Case currently in the foreground, if any.
    fn active_case(&self) -> HostResult<Option<CaseHandle>>;

    /// Open a case from a file and make it active.
    fn open_case(&self, path: &Path) -> HostResult<CaseHandle>;

    /// All open cases with their titles, in host order.
    ///
    /// Listing does not change which case is active.
    fn cases(&self) -> HostResult<Vec<(CaseHandle, String)>>;

    /// Bring an already-open case to the foreground.
    fn activate_case(&self, case: CaseHandle) -> HostResult<()>;

    /// Title and backing file of a case.
    fn case_info(&self, case: CaseHandle) -> HostResult<CaseInfo>;

    /// Save a case to its backing file.
    fn save_case(&self, case: CaseHandle) -> HostResult<()>;

    /// Names in one of the case's flowsheet collections, in host order.
    fn list_names(&self, case: CaseHandle, collection: Collection) -> HostResult<Vec<String>>;

    /// Resolve a named object inside a collection.
    fn find_object(
        &self,
        case: CaseHandle,
        collection: Collection,
        name: &str,
    ) -> HostResult<ObjectHandle>;

    /// Component names of the case's basis, grouped the way the host reports
    /// them.
    ///
    /// Groups may contain empty padding entries; callers are expected to
    /// flatten and drop those.
    fn component_name_groups(&self, case: CaseHandle) -> HostResult<Vec<Vec<String>>>;

    /// Read a scalar property, converted by the host into `unit`.
    ///
    /// `unit: None` asks for the host's native value with no conversion.
    fn read_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
    ) -> HostResult<f64>;

    /// Write a scalar property, interpreted by the host in `unit`.
    fn write_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
        value: f64,
    ) -> HostResult<()>;

    /// Read a per-component vector property, converted into `unit`.
    fn read_vector(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
    ) -> HostResult<Vec<f64>>;

    /// Replace a per-component vector property in one call.
    ///
    /// The whole vector is applied atomically; the host rejects a vector
    /// whose length does not match its component count.
    fn write_vector(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
        values: &[f64],
    ) -> HostResult<()>;

    /// Current value of a spreadsheet cell ("A1"-style reference).
    fn cell_value(&self, object: ObjectHandle, cell: &str) -> HostResult<CellValue>;

    /// Set a spreadsheet cell to a literal value.
    fn set_cell_value(&self, object: ObjectHandle, cell: &str, value: &CellValue) -> HostResult<()>;

    /// Formula attached to a spreadsheet cell, if any.
    fn cell_formula(&self, object: ObjectHandle, cell: &str) -> HostResult<Option<String>>;

    /// Attach a formula to a spreadsheet cell.
    fn set_cell_formula(&self, object: ObjectHandle, cell: &str, formula: &str) -> HostResult<()>;
}

impl fmt::Debug for dyn HostInstance + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostInstance")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_nouns() {
        assert_eq!(Collection::MaterialStreams.noun(), "material stream");
        assert_eq!(Collection::Operations.noun(), "operation");
        assert_eq!(Collection::ALL.len(), 3);
    }
}
