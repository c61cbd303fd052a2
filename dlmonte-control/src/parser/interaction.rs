//! Potential records shared with the FIELD file (`lj eps sigma` etc.)

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::{control_parser, Line};

/// Keys of the supported potential records
#[derive(Clone,Copy,Debug,PartialEq,Eq,EnumIter,EnumString,StrumDisplay)]
pub enum InteractionKind {
    #[strum(serialize = "lj")]
    LennardJones,
    #[strum(serialize = "nm")]
    NM,
    #[strum(serialize = "12-6")]
    TwelveSix,
    #[strum(serialize = "buck")]
    Buckingham,
    #[strum(serialize = "hs")]
    HardSphere,
}

impl InteractionKind {
    /// Human readable name of the potential
    pub fn description(&self) -> &'static str {
        match self {
            Self::LennardJones => "Lennard-Jones",
            Self::NM => "Lennard-Jones general N-M",
            Self::TwelveSix => "Lennard-Jones-like 12-6",
            Self::Buckingham => "Buckingham",
            Self::HardSphere => "Hard sphere",
        }
    }
}

/// A pair potential with its parameters
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum Interaction {
    /// U(r) = 4 epsilon [(sigma/r)^12 - (sigma/r)^6]
    LennardJones { epsilon: f64, sigma: f64 },
    /// U(r) = e0/(n-m) [m (r0/r)^n - n (r0/r)^m]
    NM { e0: f64, n: i64, m: i64, r0: f64 },
    /// U(r) = a/r^12 - b/r^6
    TwelveSix { a: f64, b: f64 },
    /// U(r) = a exp(-r/rho) - c/r^6
    Buckingham { a: f64, rho: f64, c: f64 },
    /// Infinite inside sigma, zero outside
    HardSphere { sigma: f64 },
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::LennardJones { .. } => InteractionKind::LennardJones,
            Self::NM { .. } => InteractionKind::NM,
            Self::TwelveSix { .. } => InteractionKind::TwelveSix,
            Self::Buckingham { .. } => InteractionKind::Buckingham,
            Self::HardSphere { .. } => InteractionKind::HardSphere,
        }
    }

    /// Read a potential record; the key is case-insensitive
    pub fn from_line(line: &Line) -> Result<Self> {
        let lower = line.lowercase();
        let key = line.keyword();
        if InteractionKind::from_str(&key).is_err() {
            return Err(ControlError::UnsupportedVariant {
                variant: format!("interaction '{}'", key),
                at: line.clone(),
            });
        }
        control_parser::interaction(&lower).map_err(|e| ControlError::MalformedRecord {
            reason: format!("bad {} record: {}", key, e),
            at: line.clone(),
        })
    }
}

impl FromStr for Interaction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_line(&Line::new(1, super::normalize_line(s)))
    }
}

impl Display for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.kind();
        match self {
            Self::LennardJones { epsilon, sigma } =>
                write!(f, "{} {} {}", kind, Real(*epsilon), Real(*sigma)),
            Self::NM { e0, n, m, r0 } =>
                write!(f, "{} {} {} {} {}", kind, Real(*e0), n, m, Real(*r0)),
            Self::TwelveSix { a, b } =>
                write!(f, "{} {} {}", kind, Real(*a), Real(*b)),
            Self::Buckingham { a, rho, c } =>
                write!(f, "{} {} {} {}", kind, Real(*a), Real(*rho), Real(*c)),
            Self::HardSphere { sigma } =>
                write!(f, "{} {}", kind, Real(*sigma)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn records() {
        let test_set = vec![
            ("lj 1.0 2.0", Interaction::LennardJones { epsilon: 1.0, sigma: 2.0 }),
            ("LJ 0.5 3.4", Interaction::LennardJones { epsilon: 0.5, sigma: 3.4 }),
            ("nm 1.0 12 6 2.5", Interaction::NM { e0: 1.0, n: 12, m: 6, r0: 2.5 }),
            ("12-6 1.0 2.0", Interaction::TwelveSix { a: 1.0, b: 2.0 }),
            ("buck 1000.0 0.3 10.0", Interaction::Buckingham { a: 1000.0, rho: 0.3, c: 10.0 }),
            ("hs 1.5", Interaction::HardSphere { sigma: 1.5 }),
        ];
        for (s, expected) in test_set {
            let parsed: Interaction = s.parse().expect(&format!("Cannot parse {}", s));
            assert_eq!(parsed, expected);
            let reparsed: Interaction = parsed.to_string().parse()
                .expect(&format!("Cannot re-read {}", parsed));
            assert_eq!(reparsed, expected);
        }
    }

    #[test]
    fn failures() {
        let err = "morse 1.0 2.0 3.0".parse::<Interaction>().unwrap_err();
        assert!(matches!(err, ControlError::UnsupportedVariant { .. }), "Got {:?}", err);
        let err = "lj 1.0".parse::<Interaction>().unwrap_err();
        assert!(matches!(err, ControlError::MalformedRecord { .. }), "Got {:?}", err);
        let err = "nm 1.0 12.5 6 2.5".parse::<Interaction>().unwrap_err();
        assert!(matches!(err, ControlError::MalformedRecord { .. }), "Got {:?}", err);
    }

    #[test]
    fn every_kind_has_a_description() {
        for kind in InteractionKind::iter() {
            assert!(!kind.description().is_empty());
            assert_eq!(InteractionKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }
}
