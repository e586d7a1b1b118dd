use crate::FlError;

/// Floating point type used throughout the adapter.
pub type Real = f64;

/// One tolerance pair for everything.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FlError::NonFinite { what, value: v })
    }
}
