//! Session and facade errors.

use fl_core::FlError;
use fl_host::HostError;
use thiserror::Error;

/// Result type for session operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors raised by the session and the typed facades.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Operation needs a host but the session is not attached.
    #[error("Not attached to a simulation host")]
    NotAttached,

    /// Operation needs a case but none is active.
    #[error("No active simulation case")]
    NoActiveCase,

    /// Something addressed by name does not exist.
    ///
    /// All of the host's "no such case / object / property" shapes normalize
    /// to this one variant so callers match a single pattern.
    #[error("No {kind} named '{name}'")]
    NotFound { kind: &'static str, name: String },

    /// Component names and fraction values disagree in length.
    #[error("Component names ({names}) and values ({values}) disagree in length")]
    CompositionLengthMismatch { names: usize, values: usize },

    /// Composition that cannot be normalized or applied.
    #[error("Invalid composition: {what}")]
    InvalidComposition { what: &'static str },

    /// Numeric validation failure.
    #[error(transparent)]
    Numeric(#[from] FlError),

    /// Host fault that has no tighter mapping.
    #[error("Host error: {0}")]
    Host(HostError),
}

impl From<HostError> for LinkError {
    fn from(err: HostError) -> Self {
        // The name-lookup failures collapse into NotFound; everything else
        // keeps its host shape.
        match err {
            HostError::CaseNotFound { what } => LinkError::NotFound {
                kind: "case",
                name: what,
            },
            HostError::ObjectNotFound { collection, name } => LinkError::NotFound {
                kind: collection,
                name,
            },
            HostError::PropertyNotFound { object, property } => LinkError::NotFound {
                kind: "property",
                name: format!("{object}.{property}"),
            },
            other => LinkError::Host(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_normalize_to_not_found() {
        let err: LinkError = HostError::ObjectNotFound {
            collection: "material stream",
            name: "Feed".into(),
        }
        .into();
        assert!(matches!(
            err,
            LinkError::NotFound {
                kind: "material stream",
                ..
            }
        ));

        let err: LinkError = HostError::PropertyNotFound {
            object: "Feed".into(),
            property: "Frobnication".into(),
        }
        .into();
        match err {
            LinkError::NotFound { kind, name } => {
                assert_eq!(kind, "property");
                assert_eq!(name, "Feed.Frobnication");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn host_faults_keep_their_shape() {
        let err: LinkError = HostError::ReadOnly {
            object: "Feed".into(),
            property: "ZFactor".into(),
        }
        .into();
        assert!(matches!(err, LinkError::Host(HostError::ReadOnly { .. })));
    }
}
