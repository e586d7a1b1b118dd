//! Locating running host instances.

use crate::error::HostResult;
use crate::host::HostInstance;

/// A top-level host window observed on the desktop.
///
/// Window enumeration is diagnostic only. Titles are whatever the host puts
/// in its title bar; `responding` is false when the window exists but its
/// process no longer answers messages.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub title: String,
    pub responding: bool,
}

/// Everything a discovery sweep found: host windows on screen plus the
/// attachable instances that answered an introspection probe.
///
/// The two lists are independent observations. A window can exist for an
/// instance that refuses probes, and a headless instance has no window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub windows: Vec<WindowInfo>,
    pub instances: Vec<String>,
}

/// Trait for finding and attaching to running host instances.
///
/// Implementations must be thread-safe (Send + Sync). A locator is the only
/// part of the system that knows how hosts are discovered on a particular
/// platform; everything above it works with the [`HostInstance`] it returns.
pub trait HostLocator: Send + Sync {
    /// Locator name (for debugging/logging).
    fn name(&self) -> &str;

    /// Best-effort list of host windows currently on screen.
    ///
    /// An empty list does not prove that no instance is running; it only
    /// means none was observed.
    fn windows(&self) -> Vec<WindowInfo>;

    /// Probe every attachable instance for a descriptive label.
    ///
    /// An `Err` entry is an instance that exists but could not be
    /// introspected; callers decide whether to surface or skip it.
    fn instances(&self) -> Vec<HostResult<String>>;

    /// Attach to the running instance.
    ///
    /// Returns [`HostError::NoInstance`] when nothing is there to attach to.
    ///
    /// [`HostError::NoInstance`]: crate::error::HostError::NoInstance
    fn active_instance(&self) -> HostResult<Box<dyn HostInstance>>;
}
