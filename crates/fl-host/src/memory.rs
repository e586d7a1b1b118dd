//! In-memory host backend.
//!
//! A full [`HostInstance`] that keeps cases, streams and spreadsheets in
//! process memory. It exists so the session and facade layers can be
//! exercised without a simulator installed, and it reproduces the host
//! behaviours that matter to callers: unit conversion on every read and
//! write, read-only calculated properties, whole-vector composition writes
//! and grouped component names with empty padding slots.
//!
//! Spreadsheet formulas are stored, not evaluated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{HostError, HostResult};
use crate::handle::{CaseHandle, ObjectHandle};
use crate::host::{CaseInfo, CellValue, Collection, HostInstance};
use crate::locator::{HostLocator, WindowInfo};
use crate::property::Property;
use fl_core::units;

/// Unit families the in-memory conversion table understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Temperature,
    Pressure,
    MolarFlow,
    MassFlow,
    EnergyFlow,
    Dimensionless,
}

impl Dimension {
    /// Unit label this host stores values of the family in.
    pub fn canonical_unit(&self) -> Option<&'static str> {
        match self {
            Dimension::Temperature => Some(units::KELVIN),
            Dimension::Pressure => Some(units::BAR),
            Dimension::MolarFlow => Some(units::GMOLE_PER_S),
            Dimension::MassFlow => Some(units::KG_PER_H),
            Dimension::EnergyFlow => Some(units::KJ_PER_H),
            Dimension::Dimensionless => None,
        }
    }

    /// Units-per-canonical factor for the multiplicative families.
    fn factor(&self, unit: &str) -> Option<f64> {
        match self {
            Dimension::Pressure => match unit {
                "bar" => Some(1.0),
                "kPa" => Some(100.0),
                "atm" => Some(1.0 / 1.013_25),
                "psia" => Some(14.503_773_773),
                _ => None,
            },
            Dimension::MolarFlow => match unit {
                "gmole/s" => Some(1.0),
                "kgmole/h" => Some(3.6),
                "lbmole/h" => Some(3600.0 / 453.592_37),
                _ => None,
            },
            Dimension::MassFlow => match unit {
                "kg/h" => Some(1.0),
                "kg/s" => Some(1.0 / 3600.0),
                "lb/h" => Some(2.204_622_622),
                _ => None,
            },
            Dimension::EnergyFlow => match unit {
                "kJ/h" => Some(1.0),
                "kW" => Some(1.0 / 3600.0),
                "Btu/h" => Some(1.0 / 1.055_055_852_62),
                _ => None,
            },
            Dimension::Temperature | Dimension::Dimensionless => None,
        }
    }

    /// Convert a canonically stored value into `unit`.
    ///
    /// Temperature is affine, everything else is a pure scale. `None` means
    /// the label is not convertible for this family.
    fn from_canonical(&self, value: f64, unit: &str) -> Option<f64> {
        match self {
            Dimension::Temperature => match unit {
                "K" => Some(value),
                "C" => Some(value - 273.15),
                "F" => Some(value * 1.8 - 459.67),
                _ => None,
            },
            Dimension::Dimensionless => None,
            _ => self.factor(unit).map(|f| value * f),
        }
    }

    /// Convert a value given in `unit` into canonical storage.
    fn to_canonical(&self, value: f64, unit: &str) -> Option<f64> {
        match self {
            Dimension::Temperature => match unit {
                "K" => Some(value),
                "C" => Some(value + 273.15),
                "F" => Some((value + 459.67) / 1.8),
                _ => None,
            },
            Dimension::Dimensionless => None,
            _ => self.factor(unit).map(|f| value / f),
        }
    }
}

/// Unit family of each standard stream property.
fn dimension_for(property: Property) -> Dimension {
    match property {
        Property::Temperature => Dimension::Temperature,
        Property::Pressure => Dimension::Pressure,
        Property::MolarFlow => Dimension::MolarFlow,
        Property::MassFlow => Dimension::MassFlow,
        Property::HeatFlow => Dimension::EnergyFlow,
        Property::VapourFraction | Property::MolecularWeight | Property::ZFactor => {
            Dimension::Dimensionless
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    dimension: Dimension,
    value: f64,
    read_only: bool,
}

#[derive(Debug, Clone)]
struct VectorSlot {
    dimension: Dimension,
    values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectKind {
    Material,
    Energy,
    Spreadsheet,
}

impl ObjectKind {
    fn collection(self) -> Collection {
        match self {
            ObjectKind::Material => Collection::MaterialStreams,
            ObjectKind::Energy => Collection::EnergyStreams,
            ObjectKind::Spreadsheet => Collection::Operations,
        }
    }
}

#[derive(Debug, Clone)]
struct ObjectEntry {
    case: CaseHandle,
    name: String,
    kind: ObjectKind,
    scalars: BTreeMap<String, Slot>,
    vectors: BTreeMap<String, VectorSlot>,
    /// Cell reference -> (value, formula). Cells not present read as Empty.
    cells: BTreeMap<String, (CellValue, Option<String>)>,
}

#[derive(Debug, Clone)]
struct CaseEntry {
    title: String,
    path: Option<PathBuf>,
    saves: u32,
    component_groups: Vec<Vec<String>>,
    objects: Vec<ObjectHandle>,
}

#[derive(Debug, Default)]
struct HostState {
    visible: bool,
    active: Option<CaseHandle>,
    cases: Vec<CaseEntry>,
    objects: Vec<ObjectEntry>,
}

impl HostState {
    fn case(&self, handle: CaseHandle) -> HostResult<&CaseEntry> {
        self.cases
            .get(handle.index() as usize)
            .ok_or(HostError::UnknownHandle { what: "case" })
    }

    fn case_mut(&mut self, handle: CaseHandle) -> HostResult<&mut CaseEntry> {
        self.cases
            .get_mut(handle.index() as usize)
            .ok_or(HostError::UnknownHandle { what: "case" })
    }

    fn object(&self, handle: ObjectHandle) -> HostResult<&ObjectEntry> {
        self.objects
            .get(handle.index() as usize)
            .ok_or(HostError::UnknownHandle { what: "object" })
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> HostResult<&mut ObjectEntry> {
        self.objects
            .get_mut(handle.index() as usize)
            .ok_or(HostError::UnknownHandle { what: "object" })
    }
}

fn real_component_count(groups: &[Vec<String>]) -> usize {
    groups
        .iter()
        .flatten()
        .filter(|name| !name.trim().is_empty())
        .count()
}

fn is_cell_ref(cell: &str) -> bool {
    !cell.is_empty()
        && cell.chars().all(|c| c.is_ascii_alphanumeric())
        && cell.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && cell.chars().last().is_some_and(|c| c.is_ascii_digit())
}

/// In-memory [`HostInstance`].
///
/// Cheap to clone; clones share state, so a test can keep one copy for
/// seeding and inspection while a session owns the other.
#[derive(Clone)]
pub struct InMemoryHost {
    label: String,
    inner: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(Mutex::new(HostState::default())),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a case. The first registered case becomes active.
    pub fn add_case(&self, title: &str, path: Option<&Path>) -> CaseHandle {
        let mut state = self.lock();
        let handle = CaseHandle::from_index(state.cases.len() as u32);
        state.cases.push(CaseEntry {
            title: title.to_owned(),
            path: path.map(Path::to_path_buf),
            saves: 0,
            component_groups: Vec::new(),
            objects: Vec::new(),
        });
        if state.active.is_none() {
            state.active = Some(handle);
        }
        handle
    }

    /// Make a case the active one.
    pub fn activate(&self, case: CaseHandle) -> HostResult<()> {
        let mut state = self.lock();
        state.case(case)?;
        state.active = Some(case);
        Ok(())
    }

    /// Replace the component basis of a case.
    ///
    /// Groups mirror how hosts report component names: nested, with empty
    /// padding slots. Per-component vectors on existing streams are resized
    /// to the new real component count, preserving a zero fill.
    pub fn set_component_groups(&self, case: CaseHandle, groups: &[&[&str]]) -> HostResult<()> {
        let owned: Vec<Vec<String>> = groups
            .iter()
            .map(|g| g.iter().map(|s| (*s).to_owned()).collect())
            .collect();
        let count = real_component_count(&owned);

        let mut state = self.lock();
        let members = {
            let entry = state.case_mut(case)?;
            entry.component_groups = owned;
            entry.objects.clone()
        };
        for member in members {
            let object = state.object_mut(member)?;
            for slot in object.vectors.values_mut() {
                slot.values.resize(count, 0.0);
            }
        }
        Ok(())
    }

    /// Add a material stream with the full standard property set.
    ///
    /// Scalars start at zero, the calculated properties are read-only, and
    /// the per-component vectors are zero-filled to the case's component
    /// count.
    pub fn add_material_stream(&self, case: CaseHandle, name: &str) -> HostResult<ObjectHandle> {
        let mut scalars = BTreeMap::new();
        for property in Property::ALL {
            scalars.insert(
                property.host_key().to_owned(),
                Slot {
                    dimension: dimension_for(property),
                    value: 0.0,
                    read_only: !property.writable(),
                },
            );
        }
        self.add_object(case, name, ObjectKind::Material, scalars, true)
    }

    /// Add an energy stream. Its only property is heat flow.
    pub fn add_energy_stream(&self, case: CaseHandle, name: &str) -> HostResult<ObjectHandle> {
        let mut scalars = BTreeMap::new();
        scalars.insert(
            Property::HeatFlow.host_key().to_owned(),
            Slot {
                dimension: Dimension::EnergyFlow,
                value: 0.0,
                read_only: false,
            },
        );
        self.add_object(case, name, ObjectKind::Energy, scalars, false)
    }

    /// Add a spreadsheet operation with an empty grid.
    pub fn add_spreadsheet(&self, case: CaseHandle, name: &str) -> HostResult<ObjectHandle> {
        self.add_object(case, name, ObjectKind::Spreadsheet, BTreeMap::new(), false)
    }

    fn add_object(
        &self,
        case: CaseHandle,
        name: &str,
        kind: ObjectKind,
        scalars: BTreeMap<String, Slot>,
        with_component_vectors: bool,
    ) -> HostResult<ObjectHandle> {
        let mut state = self.lock();
        let count = real_component_count(&state.case(case)?.component_groups);
        let mut vectors = BTreeMap::new();
        if with_component_vectors {
            vectors.insert(
                "ComponentMolarFraction".to_owned(),
                VectorSlot {
                    dimension: Dimension::Dimensionless,
                    values: vec![0.0; count],
                },
            );
            vectors.insert(
                "ComponentMolarFlow".to_owned(),
                VectorSlot {
                    dimension: Dimension::MolarFlow,
                    values: vec![0.0; count],
                },
            );
        }
        let handle = ObjectHandle::from_index(state.objects.len() as u32);
        state.objects.push(ObjectEntry {
            case,
            name: name.to_owned(),
            kind,
            scalars,
            vectors,
            cells: BTreeMap::new(),
        });
        state.case_mut(case)?.objects.push(handle);
        Ok(handle)
    }

    /// Set a scalar directly in canonical units, bypassing read-only checks.
    pub fn seed_scalar(&self, object: ObjectHandle, property: &str, value: f64) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        match entry.scalars.get_mut(property) {
            Some(slot) => {
                slot.value = value;
                Ok(())
            }
            None => Err(HostError::PropertyNotFound {
                object: entry.name.clone(),
                property: property.to_owned(),
            }),
        }
    }

    /// Register an extra scalar property on an object.
    pub fn seed_extra_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        dimension: Dimension,
        value: f64,
        read_only: bool,
    ) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        entry.scalars.insert(
            property.to_owned(),
            Slot {
                dimension,
                value,
                read_only,
            },
        );
        Ok(())
    }

    /// Set a per-component vector directly in canonical units.
    ///
    /// The length must match the case's real component count, same as a
    /// host-side write.
    pub fn seed_vector(&self, object: ObjectHandle, property: &str, values: &[f64]) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let name = entry.name.clone();
        match entry.vectors.get_mut(property) {
            Some(slot) => {
                if slot.values.len() != values.len() {
                    return Err(HostError::Backend {
                        message: format!(
                            "'{}.{}' expects {} values, got {}",
                            name,
                            property,
                            slot.values.len(),
                            values.len()
                        ),
                    });
                }
                slot.values.clear();
                slot.values.extend_from_slice(values);
                Ok(())
            }
            None => Err(HostError::PropertyNotFound {
                object: name,
                property: property.to_owned(),
            }),
        }
    }

    /// Like [`seed_vector`](Self::seed_vector) but without the length check.
    ///
    /// Real hosts sometimes report more fraction values than component
    /// names; this reproduces that inconsistency on purpose.
    pub fn seed_vector_unchecked(
        &self,
        object: ObjectHandle,
        property: &str,
        values: &[f64],
    ) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let name = entry.name.clone();
        match entry.vectors.get_mut(property) {
            Some(slot) => {
                slot.values = values.to_vec();
                Ok(())
            }
            None => Err(HostError::PropertyNotFound {
                object: name,
                property: property.to_owned(),
            }),
        }
    }

    /// How many times a case was saved (test inspection).
    pub fn save_count(&self, case: CaseHandle) -> HostResult<u32> {
        Ok(self.lock().case(case)?.saves)
    }

    /// Raw canonical value of a scalar (test inspection).
    pub fn scalar_raw(&self, object: ObjectHandle, property: &str) -> HostResult<f64> {
        let state = self.lock();
        let entry = state.object(object)?;
        match entry.scalars.get(property) {
            Some(slot) => Ok(slot.value),
            None => Err(HostError::PropertyNotFound {
                object: entry.name.clone(),
                property: property.to_owned(),
            }),
        }
    }

    /// Raw canonical values of a vector (test inspection).
    pub fn vector_raw(&self, object: ObjectHandle, property: &str) -> HostResult<Vec<f64>> {
        let state = self.lock();
        let entry = state.object(object)?;
        match entry.vectors.get(property) {
            Some(slot) => Ok(slot.values.clone()),
            None => Err(HostError::PropertyNotFound {
                object: entry.name.clone(),
                property: property.to_owned(),
            }),
        }
    }

    /// Whether the host UI is currently shown (test inspection).
    pub fn visible(&self) -> bool {
        self.lock().visible
    }

    fn require_spreadsheet<'a>(
        entry: &'a mut ObjectEntry,
        cell: &str,
    ) -> HostResult<&'a mut BTreeMap<String, (CellValue, Option<String>)>> {
        if entry.kind != ObjectKind::Spreadsheet {
            return Err(HostError::KindMismatch {
                object: entry.name.clone(),
                expected: "spreadsheet",
            });
        }
        if !is_cell_ref(cell) {
            return Err(HostError::Backend {
                message: format!("'{cell}' is not a cell reference"),
            });
        }
        Ok(&mut entry.cells)
    }
}

impl HostInstance for InMemoryHost {
    fn name(&self) -> &str {
        &self.label
    }

    fn set_visible(&self, visible: bool) -> HostResult<()> {
        self.lock().visible = visible;
        Ok(())
    }

    fn active_case(&self) -> HostResult<Option<CaseHandle>> {
        Ok(self.lock().active)
    }

    fn open_case(&self, path: &Path) -> HostResult<CaseHandle> {
        let mut state = self.lock();
        let found = state
            .cases
            .iter()
            .position(|c| c.path.as_deref() == Some(path));
        match found {
            Some(index) => {
                let handle = CaseHandle::from_index(index as u32);
                state.active = Some(handle);
                Ok(handle)
            }
            None => Err(HostError::CaseNotFound {
                what: path.display().to_string(),
            }),
        }
    }

    fn cases(&self) -> HostResult<Vec<(CaseHandle, String)>> {
        let state = self.lock();
        Ok(state
            .cases
            .iter()
            .enumerate()
            .map(|(index, c)| (CaseHandle::from_index(index as u32), c.title.clone()))
            .collect())
    }

    fn activate_case(&self, case: CaseHandle) -> HostResult<()> {
        self.activate(case)
    }

    fn case_info(&self, case: CaseHandle) -> HostResult<CaseInfo> {
        let state = self.lock();
        let entry = state.case(case)?;
        Ok(CaseInfo {
            title: entry.title.clone(),
            path: entry.path.clone(),
        })
    }

    fn save_case(&self, case: CaseHandle) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.case_mut(case)?;
        if entry.path.is_none() {
            return Err(HostError::Backend {
                message: format!("case '{}' has no backing file", entry.title),
            });
        }
        entry.saves += 1;
        Ok(())
    }

    fn list_names(&self, case: CaseHandle, collection: Collection) -> HostResult<Vec<String>> {
        let state = self.lock();
        let entry = state.case(case)?;
        let mut names = Vec::new();
        for handle in &entry.objects {
            let object = state.object(*handle)?;
            if object.kind.collection() == collection {
                names.push(object.name.clone());
            }
        }
        Ok(names)
    }

    fn find_object(
        &self,
        case: CaseHandle,
        collection: Collection,
        name: &str,
    ) -> HostResult<ObjectHandle> {
        let state = self.lock();
        let entry = state.case(case)?;
        for handle in &entry.objects {
            let object = state.object(*handle)?;
            if object.kind.collection() == collection && object.name == name {
                return Ok(*handle);
            }
        }
        Err(HostError::ObjectNotFound {
            collection: collection.noun(),
            name: name.to_owned(),
        })
    }

    fn component_name_groups(&self, case: CaseHandle) -> HostResult<Vec<Vec<String>>> {
        Ok(self.lock().case(case)?.component_groups.clone())
    }

    fn read_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
    ) -> HostResult<f64> {
        let state = self.lock();
        let entry = state.object(object)?;
        let slot = entry
            .scalars
            .get(property)
            .ok_or_else(|| HostError::PropertyNotFound {
                object: entry.name.clone(),
                property: property.to_owned(),
            })?;
        match unit {
            None => Ok(slot.value),
            Some(unit) => slot.dimension.from_canonical(slot.value, unit).ok_or_else(|| {
                HostError::UnitMismatch {
                    object: entry.name.clone(),
                    property: property.to_owned(),
                    unit: unit.to_owned(),
                }
            }),
        }
    }

    fn write_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
        value: f64,
    ) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let name = entry.name.clone();
        let slot = entry
            .scalars
            .get_mut(property)
            .ok_or_else(|| HostError::PropertyNotFound {
                object: name.clone(),
                property: property.to_owned(),
            })?;
        if slot.read_only {
            return Err(HostError::ReadOnly {
                object: name,
                property: property.to_owned(),
            });
        }
        let canonical = match unit {
            None => value,
            Some(unit) => {
                slot.dimension
                    .to_canonical(value, unit)
                    .ok_or_else(|| HostError::UnitMismatch {
                        object: name,
                        property: property.to_owned(),
                        unit: unit.to_owned(),
                    })?
            }
        };
        slot.value = canonical;
        Ok(())
    }

    fn read_vector(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
    ) -> HostResult<Vec<f64>> {
        let state = self.lock();
        let entry = state.object(object)?;
        let slot = entry
            .vectors
            .get(property)
            .ok_or_else(|| HostError::PropertyNotFound {
                object: entry.name.clone(),
                property: property.to_owned(),
            })?;
        match unit {
            None => Ok(slot.values.clone()),
            Some(unit) => {
                let mut out = Vec::with_capacity(slot.values.len());
                for value in &slot.values {
                    let converted = slot.dimension.from_canonical(*value, unit).ok_or_else(|| {
                        HostError::UnitMismatch {
                            object: entry.name.clone(),
                            property: property.to_owned(),
                            unit: unit.to_owned(),
                        }
                    })?;
                    out.push(converted);
                }
                Ok(out)
            }
        }
    }

    fn write_vector(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
        values: &[f64],
    ) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let name = entry.name.clone();
        let slot = entry
            .vectors
            .get_mut(property)
            .ok_or_else(|| HostError::PropertyNotFound {
                object: name.clone(),
                property: property.to_owned(),
            })?;
        if slot.values.len() != values.len() {
            return Err(HostError::Backend {
                message: format!(
                    "'{}.{}' expects {} values, got {}",
                    name,
                    property,
                    slot.values.len(),
                    values.len()
                ),
            });
        }
        let mut canonical = Vec::with_capacity(values.len());
        for value in values {
            let converted = match unit {
                None => *value,
                Some(unit) => {
                    slot.dimension
                        .to_canonical(*value, unit)
                        .ok_or_else(|| HostError::UnitMismatch {
                            object: name.clone(),
                            property: property.to_owned(),
                            unit: unit.to_owned(),
                        })?
                }
            };
            canonical.push(converted);
        }
        // All values converted; replace in one step.
        slot.values = canonical;
        Ok(())
    }

    fn cell_value(&self, object: ObjectHandle, cell: &str) -> HostResult<CellValue> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let cells = Self::require_spreadsheet(entry, cell)?;
        Ok(cells
            .get(cell)
            .map(|(value, _)| value.clone())
            .unwrap_or(CellValue::Empty))
    }

    fn set_cell_value(&self, object: ObjectHandle, cell: &str, value: &CellValue) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let cells = Self::require_spreadsheet(entry, cell)?;
        // A direct write supersedes any formula on the cell.
        cells.insert(cell.to_owned(), (value.clone(), None));
        Ok(())
    }

    fn cell_formula(&self, object: ObjectHandle, cell: &str) -> HostResult<Option<String>> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let cells = Self::require_spreadsheet(entry, cell)?;
        Ok(cells.get(cell).and_then(|(_, formula)| formula.clone()))
    }

    fn set_cell_formula(&self, object: ObjectHandle, cell: &str, formula: &str) -> HostResult<()> {
        let mut state = self.lock();
        let entry = state.object_mut(object)?;
        let cells = Self::require_spreadsheet(entry, cell)?;
        let value = cells
            .get(cell)
            .map(|(value, _)| value.clone())
            .unwrap_or(CellValue::Empty);
        cells.insert(cell.to_owned(), (value, Some(formula.to_owned())));
        Ok(())
    }
}

/// Locator over an in-memory host.
pub struct MemoryLocator {
    instance: Option<InMemoryHost>,
    windows: Vec<WindowInfo>,
    probes: Vec<HostResult<String>>,
}

impl MemoryLocator {
    /// Locator that finds `host` as the running instance.
    pub fn new(host: InMemoryHost) -> Self {
        let windows = vec![WindowInfo {
            title: format!("{} - Simulation Environment", host.label()),
            responding: true,
        }];
        let probes = vec![Ok(host.label().to_owned())];
        Self {
            instance: Some(host),
            windows,
            probes,
        }
    }

    /// Locator that observes no running instance.
    pub fn offline() -> Self {
        Self {
            instance: None,
            windows: Vec::new(),
            probes: Vec::new(),
        }
    }

    /// Add a window to the observed set (for discovery tests).
    pub fn push_window(&mut self, title: &str, responding: bool) {
        self.windows.push(WindowInfo {
            title: title.to_owned(),
            responding,
        });
    }

    /// Add an instance that fails its introspection probe (for discovery
    /// tests).
    pub fn push_opaque_instance(&mut self, message: &str) {
        self.probes.push(Err(HostError::Backend {
            message: message.to_owned(),
        }));
    }
}

impl HostLocator for MemoryLocator {
    fn name(&self) -> &str {
        "memory"
    }

    fn windows(&self) -> Vec<WindowInfo> {
        self.windows.clone()
    }

    fn instances(&self) -> Vec<HostResult<String>> {
        self.probes.clone()
    }

    fn active_instance(&self) -> HostResult<Box<dyn HostInstance>> {
        match &self.instance {
            Some(host) => Ok(Box::new(host.clone())),
            None => Err(HostError::NoInstance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::{Tolerances, nearly_equal};
    use proptest::prelude::*;

    fn fixture() -> (InMemoryHost, CaseHandle, ObjectHandle) {
        let host = InMemoryHost::new("4-plant");
        let case = host.add_case("Plant 4 heat balance", Some(Path::new("plant4.fls")));
        host.set_component_groups(case, &[&["Methane", "Ethane", ""], &["CO2"]])
            .unwrap();
        let feed = host.add_material_stream(case, "Feed").unwrap();
        host.seed_scalar(feed, "Temperature", 310.0).unwrap();
        host.seed_scalar(feed, "Pressure", 5.0).unwrap();
        host.seed_vector(feed, "ComponentMolarFraction", &[0.7, 0.2, 0.1])
            .unwrap();
        (host, case, feed)
    }

    #[test]
    fn open_case_by_path_activates_it() {
        let (host, case, _) = fixture();
        let second = host.add_case("Scratch", Some(Path::new("scratch.fls")));
        host.activate(second).unwrap();

        let reopened = host.open_case(Path::new("plant4.fls")).unwrap();
        assert_eq!(reopened, case);
        assert_eq!(host.active_case().unwrap(), Some(case));

        let err = host.open_case(Path::new("no-such.fls")).unwrap_err();
        assert!(matches!(err, HostError::CaseNotFound { .. }));
    }

    #[test]
    fn listing_cases_does_not_change_the_active_one() {
        let (host, case, _) = fixture();
        let second = host.add_case("Scratch", None);

        let cases = host.cases().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0], (case, "Plant 4 heat balance".to_owned()));
        assert_eq!(cases[1], (second, "Scratch".to_owned()));
        assert_eq!(host.active_case().unwrap(), Some(case));

        host.activate_case(second).unwrap();
        assert_eq!(host.active_case().unwrap(), Some(second));
    }

    #[test]
    fn scalar_reads_convert_units() {
        let (host, _, feed) = fixture();
        let kelvin = host.read_scalar(feed, "Temperature", Some("K")).unwrap();
        assert_eq!(kelvin, 310.0);
        let celsius = host.read_scalar(feed, "Temperature", Some("C")).unwrap();
        assert!((celsius - 36.85).abs() < 1e-9);
        let kpa = host.read_scalar(feed, "Pressure", Some("kPa")).unwrap();
        assert!((kpa - 500.0).abs() < 1e-9);
        // Native read skips conversion.
        assert_eq!(host.read_scalar(feed, "Temperature", None).unwrap(), 310.0);
    }

    #[test]
    fn scalar_writes_convert_units() {
        let (host, _, feed) = fixture();
        host.write_scalar(feed, "Temperature", Some("C"), 25.0).unwrap();
        assert!((host.scalar_raw(feed, "Temperature").unwrap() - 298.15).abs() < 1e-9);
        host.write_scalar(feed, "Pressure", Some("kPa"), 250.0).unwrap();
        assert!((host.scalar_raw(feed, "Pressure").unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let (host, _, feed) = fixture();
        let err = host
            .read_scalar(feed, "Temperature", Some("furlong"))
            .unwrap_err();
        assert!(matches!(err, HostError::UnitMismatch { .. }));
        // Unit-less properties reject any label.
        let err = host
            .read_scalar(feed, "VapourFraction", Some("K"))
            .unwrap_err();
        assert!(matches!(err, HostError::UnitMismatch { .. }));
    }

    #[test]
    fn calculated_properties_reject_writes() {
        let (host, _, feed) = fixture();
        let err = host
            .write_scalar(feed, "VapourFraction", None, 0.5)
            .unwrap_err();
        assert!(matches!(err, HostError::ReadOnly { .. }));
    }

    #[test]
    fn vector_write_is_all_or_nothing() {
        let (host, _, feed) = fixture();
        let err = host
            .write_vector(feed, "ComponentMolarFraction", None, &[0.5, 0.5])
            .unwrap_err();
        assert!(matches!(err, HostError::Backend { .. }));
        // Failed write left the previous values in place.
        assert_eq!(
            host.vector_raw(feed, "ComponentMolarFraction").unwrap(),
            vec![0.7, 0.2, 0.1]
        );

        host.write_vector(feed, "ComponentMolarFraction", None, &[0.5, 0.3, 0.2])
            .unwrap();
        assert_eq!(
            host.vector_raw(feed, "ComponentMolarFraction").unwrap(),
            vec![0.5, 0.3, 0.2]
        );
    }

    #[test]
    fn component_groups_keep_padding_slots() {
        let (host, case, _) = fixture();
        let groups = host.component_name_groups(case).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec!["Methane", "Ethane", ""]);
        assert_eq!(groups[1], vec!["CO2"]);
    }

    #[test]
    fn listing_and_lookup_by_collection() {
        let (host, case, _) = fixture();
        host.add_energy_stream(case, "Q-100").unwrap();
        host.add_spreadsheet(case, "SHEET-1").unwrap();

        assert_eq!(
            host.list_names(case, Collection::MaterialStreams).unwrap(),
            vec!["Feed"]
        );
        assert_eq!(
            host.list_names(case, Collection::EnergyStreams).unwrap(),
            vec!["Q-100"]
        );
        assert_eq!(
            host.list_names(case, Collection::Operations).unwrap(),
            vec!["SHEET-1"]
        );

        let err = host
            .find_object(case, Collection::MaterialStreams, "Q-100")
            .unwrap_err();
        assert!(matches!(err, HostError::ObjectNotFound { .. }));
    }

    #[test]
    fn cells_require_a_spreadsheet() {
        let (host, case, feed) = fixture();
        let err = host.cell_value(feed, "A1").unwrap_err();
        assert!(matches!(err, HostError::KindMismatch { .. }));

        let sheet = host.add_spreadsheet(case, "SHEET-1").unwrap();
        assert_eq!(host.cell_value(sheet, "A1").unwrap(), CellValue::Empty);

        host.set_cell_value(sheet, "A1", &CellValue::Number(42.0))
            .unwrap();
        assert_eq!(host.cell_value(sheet, "A1").unwrap(), CellValue::Number(42.0));

        let err = host.cell_value(sheet, "not a ref").unwrap_err();
        assert!(matches!(err, HostError::Backend { .. }));
    }

    #[test]
    fn formulas_are_stored_not_evaluated() {
        let (host, case, _) = fixture();
        let sheet = host.add_spreadsheet(case, "SHEET-1").unwrap();
        assert_eq!(host.cell_formula(sheet, "B1").unwrap(), None);

        host.set_cell_formula(sheet, "B1", "=A1*2").unwrap();
        assert_eq!(
            host.cell_formula(sheet, "B1").unwrap(),
            Some("=A1*2".to_owned())
        );
        // The cell's value is untouched by attaching a formula.
        assert_eq!(host.cell_value(sheet, "B1").unwrap(), CellValue::Empty);

        // A direct write supersedes the formula.
        host.set_cell_value(sheet, "B1", &CellValue::Text("done".into()))
            .unwrap();
        assert_eq!(host.cell_formula(sheet, "B1").unwrap(), None);
    }

    #[test]
    fn saving_requires_a_backing_file() {
        let (host, case, _) = fixture();
        host.save_case(case).unwrap();
        host.save_case(case).unwrap();
        assert_eq!(host.save_count(case).unwrap(), 2);

        let untitled = host.add_case("Untitled", None);
        let err = host.save_case(untitled).unwrap_err();
        assert!(matches!(err, HostError::Backend { .. }));
    }

    #[test]
    fn locator_attach_and_offline() {
        let (host, _, _) = fixture();
        let mut locator = MemoryLocator::new(host);
        assert_eq!(locator.windows().len(), 1);
        assert!(locator.windows()[0].responding);
        assert_eq!(locator.instances(), vec![Ok("4-plant".to_owned())]);
        let instance = locator.active_instance().unwrap();
        assert_eq!(instance.name(), "4-plant");

        locator.push_opaque_instance("RPC rejected");
        assert!(locator.instances()[1].is_err());

        let offline = MemoryLocator::offline();
        assert!(offline.instances().is_empty());
        assert!(matches!(
            offline.active_instance().unwrap_err(),
            HostError::NoInstance
        ));
    }

    #[test]
    fn clones_share_state() {
        let (host, case, feed) = fixture();
        let copy = host.clone();
        copy.write_scalar(feed, "Temperature", Some("K"), 400.0)
            .unwrap();
        assert_eq!(host.scalar_raw(feed, "Temperature").unwrap(), 400.0);
        assert_eq!(copy.save_count(case).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn multiplicative_conversions_round_trip(value in -1.0e6_f64..1.0e6) {
            let pairs = [
                (Dimension::Pressure, "kPa"),
                (Dimension::Pressure, "atm"),
                (Dimension::Pressure, "psia"),
                (Dimension::MolarFlow, "kgmole/h"),
                (Dimension::MolarFlow, "lbmole/h"),
                (Dimension::MassFlow, "kg/s"),
                (Dimension::MassFlow, "lb/h"),
                (Dimension::EnergyFlow, "kW"),
                (Dimension::EnergyFlow, "Btu/h"),
            ];
            for (dimension, unit) in pairs {
                let out = dimension.from_canonical(value, unit).unwrap();
                let back = dimension.to_canonical(out, unit).unwrap();
                prop_assert!(nearly_equal(value, back, Tolerances::default()));
            }
        }

        #[test]
        fn temperature_conversions_round_trip(value in 1.0_f64..2000.0) {
            for unit in ["K", "C", "F"] {
                let out = Dimension::Temperature.from_canonical(value, unit).unwrap();
                let back = Dimension::Temperature.to_canonical(out, unit).unwrap();
                prop_assert!(nearly_equal(value, back, Tolerances::default()));
            }
        }
    }
}
