//! Failure taxonomy for reading and writing CONTROL files

use thiserror::Error;

use crate::parser::Line;

pub type Result<T> = std::result::Result<T, ControlError>;

/// Everything that can go wrong while reading (or writing) a CONTROL file.
///
/// Parse failures are final: there is no partial document. Every variant
/// raised during parsing carries the offending normalized line.
#[derive(Clone,Debug,PartialEq,Error)]
pub enum ControlError {
    /// A section terminator is missing or misplaced
    #[error("malformed document: {reason} ({at})")]
    MalformedDocument { reason: String, at: Line },
    /// `use` line with a key outside the known set
    #[error("unknown use key '{key}' ({at})")]
    UnknownUseKey { key: String, at: Line },
    /// Line inside a FED block that is neither method, order parameter nor terminator
    #[error("unrecognised fed keyword ({at})")]
    UnrecognizedFedKeyword { at: Line },
    /// Recognised FED line with a broken payload
    #[error("malformed fed line: {reason} ({at})")]
    MalformedFed { reason: String, at: Line },
    /// Second occurrence of a section that may appear at most once
    #[error("duplicate {section} section ({at})")]
    DuplicateSection { section: String, at: Line },
    /// Move keyword not in the move table
    #[error("unrecognised move ({at})")]
    UnrecognizedMove { at: Line },
    /// Recognised move with bad arity or values
    #[error("malformed move: {reason} ({at})")]
    MalformedMove { reason: String, at: Line },
    /// Main block (or use payload) statement that could not be read
    #[error("malformed statement: {reason} ({at})")]
    MalformedStatement { reason: String, at: Line },
    /// Leaf record (e.g. a potential) with bad arity or values
    #[error("malformed record: {reason} ({at})")]
    MalformedRecord { reason: String, at: Line },
    /// Valid syntax for something this crate does not implement
    #[error("unsupported {variant} ({at})")]
    UnsupportedVariant { variant: String, at: Line },
    /// A hand-built document that cannot be written back faithfully
    #[error("invariant violated: {reason}")]
    InvariantViolation { reason: String },
    /// A statement needed by an accessor is absent
    #[error("missing '{keyword}' statement")]
    MissingStatement { keyword: String },
    /// Mover naming a species the topology does not define
    #[error("unknown species '{species}' in move {keyword}")]
    UnknownSpecies { species: String, keyword: String },
}

impl ControlError {
    /// The offending line, if the failure came from parsing
    pub fn line(&self) -> Option<&Line> {
        match self {
            Self::MalformedDocument { at, .. }
            | Self::UnknownUseKey { at, .. }
            | Self::UnrecognizedFedKeyword { at }
            | Self::MalformedFed { at, .. }
            | Self::DuplicateSection { at, .. }
            | Self::UnrecognizedMove { at }
            | Self::MalformedMove { at, .. }
            | Self::MalformedStatement { at, .. }
            | Self::MalformedRecord { at, .. }
            | Self::UnsupportedVariant { at, .. } => Some(at),
            Self::InvariantViolation { .. }
            | Self::MissingStatement { .. }
            | Self::UnknownSpecies { .. } => None,
        }
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation { reason: reason.into() }
    }
}
