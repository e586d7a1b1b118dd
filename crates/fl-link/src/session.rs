//! Session lifecycle against a simulation host.
//!
//! A [`Session`] moves through three states: unattached, attached without a
//! case, and attached with an active case. Facades borrow the session, so
//! the borrow checker keeps them from outliving a detach or case switch.

use std::path::Path;
use std::time::Duration;

use fl_host::{
    CaseHandle, CaseInfo, Collection, Discovery, HostError, HostInstance, HostLocator, TimeoutHost,
};

use crate::accessor::Accessor;
use crate::energy::EnergyStream;
use crate::error::{LinkError, LinkResult};
use crate::material::MaterialStream;
use crate::spreadsheet::Spreadsheet;

/// How an attach selects its case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachMode {
    /// Attach to the running instance and leave case selection for later.
    ActiveInstance,
    /// Attach and adopt whatever case the host has in the foreground.
    CurrentDocument,
    /// Attach and open a case file.
    OpenPath(std::path::PathBuf),
    /// Attach and select an already-open case by title.
    CaseNamed(String),
}

/// What to do when component names and values disagree in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Log one warning and zip to the shorter length.
    #[default]
    WarnTruncate,
    /// Fail the read instead.
    Strict,
}

/// What to do when the host cannot express a vector in the requested unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Log one warning and return the host's native values.
    #[default]
    WarnNative,
    /// Fail the read instead.
    Strict,
}

/// Session behaviour knobs.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mismatch: MismatchPolicy,
    pub fallback: FallbackPolicy,
    /// Ask the host to show its UI when attaching.
    pub visible: bool,
    /// Bound every host call by a deadline. `None` waits indefinitely.
    pub call_deadline: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mismatch: MismatchPolicy::default(),
            fallback: FallbackPolicy::default(),
            visible: true,
            call_deadline: None,
        }
    }
}

/// A connection to one simulation host, plus the case being worked on.
#[derive(Default)]
pub struct Session {
    options: SessionOptions,
    host: Option<Box<dyn HostInstance>>,
    case: Option<CaseHandle>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            host: None,
            case: None,
        }
    }

    /// Best-effort scan for host windows and attachable instances, for
    /// diagnostics before attaching.
    ///
    /// Windows whose process has stopped answering are logged; the host they
    /// belong to usually cannot be attached to until it recovers. Instances
    /// that fail their introspection probe are logged and left out of the
    /// result.
    pub fn discover(locator: &dyn HostLocator) -> Discovery {
        let windows = locator.windows();
        for window in &windows {
            if !window.responding {
                tracing::warn!(title = %window.title, "host window is not responding");
            }
        }
        let mut instances = Vec::new();
        for probe in locator.instances() {
            match probe {
                Ok(label) => instances.push(label),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping host instance that failed its probe");
                }
            }
        }
        tracing::info!(
            locator = locator.name(),
            windows = windows.len(),
            instances = instances.len(),
            "host scan complete"
        );
        Discovery { windows, instances }
    }

    /// Attach to a running host and select a case per `mode`.
    ///
    /// Nothing about the session changes if any step fails: a failed attach
    /// leaves it unattached.
    pub fn attach(&mut self, locator: &dyn HostLocator, mode: AttachMode) -> LinkResult<()> {
        let host = locator.active_instance()?;
        let host: Box<dyn HostInstance> = match self.options.call_deadline {
            Some(deadline) => Box::new(TimeoutHost::new(host, deadline)),
            None => host,
        };
        if self.options.visible {
            host.set_visible(true)?;
        }
        let case = match &mode {
            AttachMode::ActiveInstance => None,
            AttachMode::CurrentDocument => match host.active_case()? {
                Some(case) => Some(case),
                None => return Err(LinkError::NoActiveCase),
            },
            AttachMode::OpenPath(path) => Some(host.open_case(path)?),
            AttachMode::CaseNamed(title) => match case_with_title(host.as_ref(), title)? {
                Some(case) => {
                    host.activate_case(case)?;
                    Some(case)
                }
                None => {
                    return Err(LinkError::NotFound {
                        kind: "case",
                        name: title.clone(),
                    });
                }
            },
        };
        tracing::info!(
            host = host.name(),
            locator = locator.name(),
            "attached to simulation host"
        );
        if let Some(case) = case {
            let info = host.case_info(case)?;
            tracing::info!(case = %info.title, "active case selected");
        }
        self.host = Some(host);
        self.case = case;
        Ok(())
    }

    /// Drop the host connection and any active case.
    pub fn detach(&mut self) {
        if self.host.is_some() {
            tracing::info!("detached from simulation host");
        }
        self.host = None;
        self.case = None;
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    pub fn has_active_case(&self) -> bool {
        self.case.is_some()
    }

    /// Open a case file on the attached host and make it the active case.
    pub fn open_case(&mut self, path: &Path) -> LinkResult<()> {
        let case = self.host()?.open_case(path)?;
        self.case = Some(case);
        Ok(())
    }

    /// Select an already-open case by title and make it the active case.
    pub fn select_case(&mut self, title: &str) -> LinkResult<()> {
        let host = self.host()?;
        match case_with_title(host, title)? {
            Some(case) => {
                host.activate_case(case)?;
                self.case = Some(case);
                Ok(())
            }
            None => Err(LinkError::NotFound {
                kind: "case",
                name: title.to_owned(),
            }),
        }
    }

    /// First open case whose title matches `title` exactly, if any.
    ///
    /// The scan does not change which case is active.
    pub fn find_case_by_name(&self, title: &str) -> LinkResult<Option<CaseHandle>> {
        case_with_title(self.host()?, title)
    }

    /// Show or hide the host's UI.
    pub fn set_visible(&self, visible: bool) -> LinkResult<()> {
        Ok(self.host()?.set_visible(visible)?)
    }

    /// Backend name of the attached host.
    pub fn host_name(&self) -> LinkResult<&str> {
        Ok(self.host()?.name())
    }

    /// Title and backing file of the active case.
    pub fn case_info(&self) -> LinkResult<CaseInfo> {
        let (host, case) = self.active()?;
        Ok(host.case_info(case)?)
    }

    /// Title of the active case.
    pub fn case_title(&self) -> LinkResult<String> {
        Ok(self.case_info()?.title)
    }

    /// Save the active case to its backing file.
    ///
    /// With no active case there is nothing to save; that is logged and
    /// ignored rather than treated as an error.
    pub fn save(&self) -> LinkResult<()> {
        let host = self.host()?;
        match self.case {
            Some(case) => {
                host.save_case(case)?;
                tracing::info!("case saved");
            }
            None => tracing::warn!("no active case to save"),
        }
        Ok(())
    }

    /// Material stream names of the active case, in host order.
    pub fn material_stream_names(&self) -> LinkResult<Vec<String>> {
        let (host, case) = self.active()?;
        Ok(host.list_names(case, Collection::MaterialStreams)?)
    }

    /// Energy stream names of the active case, in host order.
    pub fn energy_stream_names(&self) -> LinkResult<Vec<String>> {
        let (host, case) = self.active()?;
        Ok(host.list_names(case, Collection::EnergyStreams)?)
    }

    /// Operation names of the active case, in host order.
    pub fn operation_names(&self) -> LinkResult<Vec<String>> {
        let (host, case) = self.active()?;
        Ok(host.list_names(case, Collection::Operations)?)
    }

    /// Facade over a named material stream.
    pub fn material_stream(&self, name: &str) -> LinkResult<MaterialStream<'_>> {
        let (host, case) = self.active()?;
        let handle = host.find_object(case, Collection::MaterialStreams, name)?;
        Ok(MaterialStream::new(Accessor::new(
            self,
            handle,
            name.to_owned(),
        )))
    }

    /// Facade over a named energy stream.
    pub fn energy_stream(&self, name: &str) -> LinkResult<EnergyStream<'_>> {
        let (host, case) = self.active()?;
        let handle = host.find_object(case, Collection::EnergyStreams, name)?;
        Ok(EnergyStream::new(Accessor::new(
            self,
            handle,
            name.to_owned(),
        )))
    }

    /// Facade over a named spreadsheet operation.
    pub fn spreadsheet(&self, name: &str) -> LinkResult<Spreadsheet<'_>> {
        let (host, case) = self.active()?;
        let handle = host.find_object(case, Collection::Operations, name)?;
        Ok(Spreadsheet::new(self, handle, name.to_owned()))
    }

    /// Accessor over a named operation, with no typed facade.
    ///
    /// Useful for operations this crate has no facade for. Spreadsheet cells
    /// still need [`Session::spreadsheet`].
    pub fn operation(&self, name: &str) -> LinkResult<Accessor<'_>> {
        let (host, case) = self.active()?;
        let handle = host.find_object(case, Collection::Operations, name)?;
        Ok(Accessor::new(self, handle, name.to_owned()))
    }

    /// Accessor over a named stream of either kind.
    ///
    /// Material streams are searched first, then energy streams.
    pub fn stream(&self, name: &str) -> LinkResult<Accessor<'_>> {
        let (host, case) = self.active()?;
        let handle = match host.find_object(case, Collection::MaterialStreams, name) {
            Ok(handle) => handle,
            Err(HostError::ObjectNotFound { .. }) => {
                match host.find_object(case, Collection::EnergyStreams, name) {
                    Ok(handle) => handle,
                    Err(HostError::ObjectNotFound { .. }) => {
                        return Err(LinkError::NotFound {
                            kind: "stream",
                            name: name.to_owned(),
                        });
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Accessor::new(self, handle, name.to_owned()))
    }

    pub(crate) fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub(crate) fn host(&self) -> LinkResult<&dyn HostInstance> {
        match &self.host {
            Some(host) => Ok(host.as_ref()),
            None => Err(LinkError::NotAttached),
        }
    }

    pub(crate) fn active(&self) -> LinkResult<(&dyn HostInstance, CaseHandle)> {
        let host = self.host()?;
        match self.case {
            Some(case) => Ok((host, case)),
            None => Err(LinkError::NoActiveCase),
        }
    }
}

/// Linear scan over the host's open cases for an exact title match.
fn case_with_title(host: &dyn HostInstance, title: &str) -> LinkResult<Option<CaseHandle>> {
    let found = host
        .cases()?
        .into_iter()
        .find(|(_, candidate)| candidate == title)
        .map(|(handle, _)| handle);
    Ok(found)
}
