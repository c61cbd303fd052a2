mod builder;
mod ensemble;
mod species;

pub use builder::*;
pub use ensemble::*;
pub use species::*;
