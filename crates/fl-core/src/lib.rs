//! fl-core: stable foundation for flowlink.
//!
//! Contains:
//! - error (shared error type for numeric and argument checks)
//! - numeric (Real + tolerances + float helpers)
//! - units (canonical unit labels understood by the host)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FlError, FlResult};
pub use numeric::*;
