//! fl-link: sessions and typed facades over a flowsheet simulation host.
//!
//! The session owns the host connection and the active case; facades borrow
//! the session and translate between host property names and a small typed
//! surface with fixed units.

pub mod accessor;
pub mod energy;
pub mod error;
pub mod material;
pub mod session;
pub mod spreadsheet;

// Re-exports: nice ergonomics for downstream crates
pub use accessor::Accessor;
pub use energy::EnergyStream;
pub use error::{LinkError, LinkResult};
pub use material::MaterialStream;
pub use session::{AttachMode, FallbackPolicy, MismatchPolicy, Session, SessionOptions};
pub use spreadsheet::Spreadsheet;
