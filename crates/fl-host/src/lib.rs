//! fl-host: the automation boundary to a flowsheet simulation host.
//!
//! Everything above this crate talks to the host through the [`HostInstance`]
//! and [`HostLocator`] traits; everything below is a concrete backend. The
//! in-memory backend ships here so the rest of the workspace can run without
//! a simulator installed.

pub mod error;
pub mod handle;
pub mod host;
pub mod locator;
pub mod memory;
pub mod property;
pub mod timeout;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HostError, HostResult};
pub use handle::{CaseHandle, Handle, ObjectHandle};
pub use host::{CaseInfo, CellValue, Collection, HostInstance};
pub use locator::{Discovery, HostLocator, WindowInfo};
pub use memory::{Dimension, InMemoryHost, MemoryLocator};
pub use property::Property;
pub use timeout::TimeoutHost;
