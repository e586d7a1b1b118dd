use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable handle to something owned by the host.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Handle>` to be pointer-optimized
///
/// Handles are only meaningful to the instance that issued them; they carry
/// no lifetime of their own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Create a Handle from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific handle aliases for clarity (no runtime cost).
pub type CaseHandle = Handle;
pub type ObjectHandle = Handle;
