//! Host boundary errors.

use thiserror::Error;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors surfaced by a host instance or locator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// No running host instance to attach to.
    #[error("No running host instance found")]
    NoInstance,

    /// No simulation case matched the request.
    #[error("Case not found: {what}")]
    CaseNotFound { what: String },

    /// Named object missing from a flowsheet collection.
    #[error("No {collection} named '{name}'")]
    ObjectNotFound {
        collection: &'static str,
        name: String,
    },

    /// Object exists but does not expose the requested property.
    #[error("'{object}' has no property '{property}'")]
    PropertyNotFound { object: String, property: String },

    /// The host cannot express the property in the requested unit.
    #[error("'{object}.{property}' cannot be expressed in '{unit}'")]
    UnitMismatch {
        object: String,
        property: String,
        unit: String,
    },

    /// Attempt to write a calculated (read-only) property.
    #[error("'{object}.{property}' is read-only")]
    ReadOnly { object: String, property: String },

    /// Operation applied to the wrong kind of object.
    #[error("'{object}' is not a {expected}")]
    KindMismatch {
        object: String,
        expected: &'static str,
    },

    /// Handle that does not belong to this instance (or outlived its case).
    #[error("Unknown {what} handle")]
    UnknownHandle { what: &'static str },

    /// A host call did not come back within the configured deadline.
    #[error("Host did not answer {what} in time")]
    Timeout { what: &'static str },

    /// Anything the automation layer reports that has no tighter mapping.
    #[error("Host error: {message}")]
    Backend { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = HostError::ObjectNotFound {
            collection: "material stream",
            name: "Feed".into(),
        };
        assert!(err.to_string().contains("material stream"));
        assert!(err.to_string().contains("Feed"));

        let err = HostError::UnitMismatch {
            object: "Feed".into(),
            property: "Temperature".into(),
            unit: "furlong".into(),
        };
        assert!(err.to_string().contains("furlong"));
    }
}
