//! Small shared helpers

mod value;

pub use value::*;
