//! Deadline enforcement for host calls.
//!
//! Automation calls block until the host answers, and a host that is busy
//! solving can hold a caller indefinitely. [`TimeoutHost`] wraps any
//! [`HostInstance`] and runs every call on a worker thread, abandoning the
//! call once a deadline passes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;

use crate::error::{HostError, HostResult};
use crate::handle::{CaseHandle, ObjectHandle};
use crate::host::{CaseInfo, CellValue, Collection, HostInstance};

/// Host wrapper that bounds every call by a deadline.
///
/// A call that exceeds the deadline returns [`HostError::Timeout`] and marks
/// the wrapper as abandoned: the worker thread may still be executing inside
/// the host, so the connection state is unknown and every later call is
/// refused. Reattaching produces a fresh instance.
pub struct TimeoutHost {
    inner: Arc<dyn HostInstance>,
    deadline: Duration,
    abandoned: AtomicBool,
}

impl TimeoutHost {
    /// Wrap `inner`, bounding each call by `deadline`.
    pub fn new(inner: Box<dyn HostInstance>, deadline: Duration) -> Self {
        Self {
            inner: Arc::from(inner),
            deadline,
            abandoned: AtomicBool::new(false),
        }
    }

    /// True once a call has been abandoned.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    fn call<T, F>(&self, what: &'static str, op: F) -> HostResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn HostInstance) -> HostResult<T> + Send + 'static,
    {
        if self.abandoned.load(Ordering::SeqCst) {
            return Err(HostError::Backend {
                message: "host abandoned after an earlier timeout".to_owned(),
            });
        }
        let inner = Arc::clone(&self.inner);
        let (tx, rx) = channel();
        thread::spawn(move || {
            // A caller that has already given up dropped the receiver; the
            // send result is meaningless then.
            let _ = tx.send(op(inner.as_ref()));
        });
        match rx.recv_timeout(self.deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                self.abandoned.store(true, Ordering::SeqCst);
                Err(HostError::Timeout { what })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.abandoned.store(true, Ordering::SeqCst);
                Err(HostError::Backend {
                    message: format!("host worker died during {what}"),
                })
            }
        }
    }
}

impl HostInstance for TimeoutHost {
    // Backends answer name() from a cached label, never a host round-trip.
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn set_visible(&self, visible: bool) -> HostResult<()> {
        self.call("set_visible", move |h| h.set_visible(visible))
    }

    fn active_case(&self) -> HostResult<Option<CaseHandle>> {
        self.call("active_case", |h| h.active_case())
    }

    fn open_case(&self, path: &Path) -> HostResult<CaseHandle> {
        let path: PathBuf = path.to_path_buf();
        self.call("open_case", move |h| h.open_case(&path))
    }

    fn cases(&self) -> HostResult<Vec<(CaseHandle, String)>> {
        self.call("cases", |h| h.cases())
    }

    fn activate_case(&self, case: CaseHandle) -> HostResult<()> {
        self.call("activate_case", move |h| h.activate_case(case))
    }

    fn case_info(&self, case: CaseHandle) -> HostResult<CaseInfo> {
        self.call("case_info", move |h| h.case_info(case))
    }

    fn save_case(&self, case: CaseHandle) -> HostResult<()> {
        self.call("save_case", move |h| h.save_case(case))
    }

    fn list_names(&self, case: CaseHandle, collection: Collection) -> HostResult<Vec<String>> {
        self.call("list_names", move |h| h.list_names(case, collection))
    }

    fn find_object(
        &self,
        case: CaseHandle,
        collection: Collection,
        name: &str,
    ) -> HostResult<ObjectHandle> {
        let name = name.to_owned();
        self.call("find_object", move |h| h.find_object(case, collection, &name))
    }

    fn component_name_groups(&self, case: CaseHandle) -> HostResult<Vec<Vec<String>>> {
        self.call("component_name_groups", move |h| h.component_name_groups(case))
    }

    fn read_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
    ) -> HostResult<f64> {
        let property = property.to_owned();
        let unit = unit.map(str::to_owned);
        self.call("read_scalar", move |h| {
            h.read_scalar(object, &property, unit.as_deref())
        })
    }

    fn write_scalar(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
        value: f64,
    ) -> HostResult<()> {
        let property = property.to_owned();
        let unit = unit.map(str::to_owned);
        self.call("write_scalar", move |h| {
            h.write_scalar(object, &property, unit.as_deref(), value)
        })
    }

    fn read_vector(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
    ) -> HostResult<Vec<f64>> {
        let property = property.to_owned();
        let unit = unit.map(str::to_owned);
        self.call("read_vector", move |h| {
            h.read_vector(object, &property, unit.as_deref())
        })
    }

    fn write_vector(
        &self,
        object: ObjectHandle,
        property: &str,
        unit: Option<&str>,
        values: &[f64],
    ) -> HostResult<()> {
        let property = property.to_owned();
        let unit = unit.map(str::to_owned);
        let values = values.to_vec();
        self.call("write_vector", move |h| {
            h.write_vector(object, &property, unit.as_deref(), &values)
        })
    }

    fn cell_value(&self, object: ObjectHandle, cell: &str) -> HostResult<CellValue> {
        let cell = cell.to_owned();
        self.call("cell_value", move |h| h.cell_value(object, &cell))
    }

    fn set_cell_value(&self, object: ObjectHandle, cell: &str, value: &CellValue) -> HostResult<()> {
        let cell = cell.to_owned();
        let value = value.clone();
        self.call("set_cell_value", move |h| {
            h.set_cell_value(object, &cell, &value)
        })
    }

    fn cell_formula(&self, object: ObjectHandle, cell: &str) -> HostResult<Option<String>> {
        let cell = cell.to_owned();
        self.call("cell_formula", move |h| h.cell_formula(object, &cell))
    }

    fn set_cell_formula(&self, object: ObjectHandle, cell: &str, formula: &str) -> HostResult<()> {
        let cell = cell.to_owned();
        let formula = formula.to_owned();
        self.call("set_cell_formula", move |h| {
            h.set_cell_formula(object, &cell, &formula)
        })
    }
}
