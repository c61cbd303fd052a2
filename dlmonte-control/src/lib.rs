//! Reading and writing DL_MONTE CONTROL files
//!
//! ```
//! let doc = dlmonte_control::parse("NVT run\nfinish\ntemperature 300\nstart").unwrap();
//! assert_eq!(doc.main_block.temperature(), Some(300.0));
//! assert_eq!(doc.ensemble(), dlmonte_control::control::Ensemble::Nvt);
//! ```

pub mod control;
pub mod error;
pub mod parser;
pub mod utils;

pub use control::{ControlParser, Ensemble, EnsembleParameters, ParserBuilder};
pub use error::{ControlError, Result};
pub use parser::ControlDocument;

/// Parse CONTROL text with default options
pub fn parse(text: &str) -> Result<ControlDocument> {
    ControlParser::default().parse(text)
}

/// Write a document as CONTROL text, validating it first
pub fn serialize(doc: &ControlDocument) -> Result<String> {
    doc.serialize()
}
