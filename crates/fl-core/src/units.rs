// fl-core/src/units.rs

//! Canonical unit labels for facade properties.
//!
//! The adapter never converts between units itself: labels are passed to the
//! host verbatim and the host's conversion layer is the source of truth.
//! These constants are the fixed units the typed facades read and write in;
//! callers wanting anything else go through the generic accessor with their
//! own label.

/// Kelvin, the facade unit for temperature.
pub const KELVIN: &str = "K";

/// Bar, the facade unit for pressure.
pub const BAR: &str = "bar";

/// Gram-moles per second, the facade unit for molar flow.
pub const GMOLE_PER_S: &str = "gmole/s";

/// Kilograms per hour, the facade unit for mass flow.
pub const KG_PER_H: &str = "kg/h";

/// Kilojoules per hour, the facade unit for heat flow.
pub const KJ_PER_H: &str = "kJ/h";
