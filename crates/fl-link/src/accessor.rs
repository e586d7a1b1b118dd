//! Generic property access for flowsheet objects.
//!
//! The typed facades cover the everyday properties; this is the escape hatch
//! for everything else the host knows by name. Reads and writes go through
//! the host's own unit conversion, so a unit label here means exactly what
//! it means inside the simulator.

use std::fmt;

use fl_core::ensure_finite;
use fl_host::{HostError, ObjectHandle, Property};

use crate::error::{LinkError, LinkResult};
use crate::session::Session;

/// Property access to one flowsheet object.
///
/// Non-owning: borrows the session, which keeps it from being used across a
/// detach or case switch.
pub struct Accessor<'a> {
    session: &'a Session,
    object: ObjectHandle,
    name: String,
}

// Manual impl: the borrowed `Session` holds a `dyn HostInstance`, which has
// no `Debug` bound.
impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("object", &self.object)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<'a> Accessor<'a> {
    pub(crate) fn new(session: &'a Session, object: ObjectHandle, name: String) -> Self {
        Self {
            session,
            object,
            name,
        }
    }

    /// Object name as the host knows it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn session(&self) -> &'a Session {
        self.session
    }

    pub(crate) fn object(&self) -> ObjectHandle {
        self.object
    }

    /// Read a property in its canonical facade unit.
    pub fn get(&self, property: Property) -> LinkResult<f64> {
        self.get_raw(property.host_key(), property.canonical_unit())
    }

    /// Read a property converted by the host into an explicit unit.
    pub fn get_in(&self, property: Property, unit: &str) -> LinkResult<f64> {
        self.get_raw(property.host_key(), Some(unit))
    }

    /// Write a property in its canonical facade unit.
    pub fn set(&self, property: Property, value: f64) -> LinkResult<()> {
        self.check_writable(property)?;
        self.set_raw(property.host_key(), property.canonical_unit(), value)
    }

    /// Write a property interpreted by the host in an explicit unit.
    pub fn set_in(&self, property: Property, unit: &str, value: f64) -> LinkResult<()> {
        self.check_writable(property)?;
        self.set_raw(property.host_key(), Some(unit), value)
    }

    /// Read any scalar the host exposes under `key`.
    ///
    /// `unit: None` returns the host's native value.
    pub fn get_raw(&self, key: &str, unit: Option<&str>) -> LinkResult<f64> {
        let value = self.session.host()?.read_scalar(self.object, key, unit)?;
        Ok(ensure_finite(value, "property read")?)
    }

    /// Write any scalar the host exposes under `key`.
    pub fn set_raw(&self, key: &str, unit: Option<&str>, value: f64) -> LinkResult<()> {
        ensure_finite(value, "property write")?;
        Ok(self
            .session
            .host()?
            .write_scalar(self.object, key, unit, value)?)
    }

    /// Calculated properties are rejected before the host is asked, so the
    /// failure mode is the same whether or not a host is even attached.
    fn check_writable(&self, property: Property) -> LinkResult<()> {
        if property.writable() {
            Ok(())
        } else {
            Err(LinkError::Host(HostError::ReadOnly {
                object: self.name.clone(),
                property: property.host_key().to_owned(),
            }))
        }
    }
}
