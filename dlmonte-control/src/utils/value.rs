//! Helpers for writing numbers back in a form DL_MONTE reads

use std::fmt::Display;

/// A real number as it appears in a CONTROL file.
///
/// Written in Rust's shortest round-trip notation, always with a decimal
/// point or exponent (`300.0`, `1e-6`), so the text re-reads to the same
/// `f64` and Fortran list-directed input sees a real literal.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Real(pub f64);

impl Display for Real {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<f64> for Real {
    fn from(x: f64) -> Self {
        Real(x)
    }
}

/// Join displayable values with single spaces
pub(crate) fn join_values<T: Display>(values: &[T]) -> String {
    values.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
