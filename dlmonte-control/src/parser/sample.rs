//! `sample <kind> ...` output directives

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::keyword::{lookup, KeyMatch};
use super::*;

/// Sample kinds, displayed with their canonical keyword
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,EnumIter,StrumDisplay,Serialize,Deserialize)]
pub enum SampleKind {
    #[strum(serialize = "coords")]
    Coords,
    #[strum(serialize = "energies")]
    Energies,
    #[strum(serialize = "rdfs")]
    Rdfs,
    #[strum(serialize = "zdensity")]
    ZDensity,
    #[strum(serialize = "volume")]
    Volume,
}

const SAMPLE_KEYS: &[(KeyMatch, SampleKind)] = &[
    (KeyMatch::Prefix("coord"), SampleKind::Coords),
    (KeyMatch::Prefix("ener"), SampleKind::Energies),
    (KeyMatch::Prefix("rdf"), SampleKind::Rdfs),
    (KeyMatch::Prefix("zden"), SampleKind::ZDensity),
    (KeyMatch::Prefix("vol"), SampleKind::Volume),
];

/// Parameters of a sample directive; the variant matches the kind
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum Sample {
    Coords { nfreq: i64 },
    Energies { nfreq: i64 },
    /// Radial distribution functions
    Rdfs { ngrid: i64, rcut: f64, nfreq: i64 },
    ZDensity { ngrid: i64, nfreq: i64 },
    Volume { mfreq: i64, deltav: f64 },
}

impl Sample {
    pub fn kind(&self) -> SampleKind {
        match self {
            Sample::Coords { .. } => SampleKind::Coords,
            Sample::Energies { .. } => SampleKind::Energies,
            Sample::Rdfs { .. } => SampleKind::Rdfs,
            Sample::ZDensity { .. } => SampleKind::ZDensity,
            Sample::Volume { .. } => SampleKind::Volume,
        }
    }

    /// Parse a `sample` line
    pub fn from_line(line: &Line) -> Result<Sample> {
        let lower = line.lowercase();
        let tokens: Vec<&str> = lower.split(' ').collect();
        let malformed = |reason: String| ControlError::MalformedStatement { reason, at: line.clone() };
        let word = tokens.get(1).copied().unwrap_or("");
        let kind = lookup(SAMPLE_KEYS, word)
            .ok_or_else(|| malformed(format!("unrecognised sample kind '{}'", word)))?;
        let args = &tokens[2..];

        let int = |token: &str| control_parser::int(token)
            .map_err(|e| malformed(format!("expected an integer ({})", e)));
        let real = |token: &str| control_parser::real(token)
            .map_err(|e| malformed(format!("expected a real number ({})", e)));

        let sample = match (*kind, args) {
            (SampleKind::Coords, &[nfreq]) => Sample::Coords { nfreq: int(nfreq)? },
            (SampleKind::Energies, &[nfreq]) => Sample::Energies { nfreq: int(nfreq)? },
            (SampleKind::Rdfs, &[ngrid, rcut, nfreq]) =>
                Sample::Rdfs { ngrid: int(ngrid)?, rcut: real(rcut)?, nfreq: int(nfreq)? },
            (SampleKind::ZDensity, &[ngrid, nfreq]) =>
                Sample::ZDensity { ngrid: int(ngrid)?, nfreq: int(nfreq)? },
            (SampleKind::Volume, &[mfreq, deltav]) =>
                Sample::Volume { mfreq: int(mfreq)?, deltav: real(deltav)? },
            (kind, _) => return Err(malformed(format!(
                "wrong number of arguments for 'sample {}'", kind))),
        };
        tracing::trace!(line = line.number, kind = %sample.kind(), "sample statement");
        Ok(sample)
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sample {}", self.kind())?;
        match self {
            Sample::Coords { nfreq } | Sample::Energies { nfreq } => write!(f, " {}", nfreq),
            Sample::Rdfs { ngrid, rcut, nfreq } => write!(f, " {} {} {}", ngrid, Real(*rcut), nfreq),
            Sample::ZDensity { ngrid, nfreq } => write!(f, " {} {}", ngrid, nfreq),
            Sample::Volume { mfreq, deltav } => write!(f, " {} {}", mfreq, Real(*deltav)),
        }
    }
}
