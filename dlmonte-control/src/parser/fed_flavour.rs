//! `use fed <flavour> [nfreq]` and the phase-switch settings block

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::keyword::{lookup, KeyMatch};
use super::*;

/// Tuning keys of the phase-switch block
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,EnumIter,StrumDisplay,Serialize,Deserialize)]
pub enum PhaseSwitchKey {
    #[strum(serialize = "switchfreq")]
    SwitchFrequency,
    #[strum(serialize = "initactive")]
    InitActive,
    #[strum(serialize = "datafreq")]
    DataFrequency,
    #[strum(serialize = "meltcheck")]
    MeltCheck,
    #[strum(serialize = "meltthresh")]
    MeltThreshold,
    #[strum(serialize = "meltfreq")]
    MeltFrequency,
}

const PHASE_SWITCH_KEYS: &[(KeyMatch, PhaseSwitchKey)] = &[
    (KeyMatch::Exact("switchfreq"), PhaseSwitchKey::SwitchFrequency),
    (KeyMatch::Prefix("init"), PhaseSwitchKey::InitActive),
    (KeyMatch::Exact("datafreq"), PhaseSwitchKey::DataFrequency),
    (KeyMatch::Exact("meltcheck"), PhaseSwitchKey::MeltCheck),
    (KeyMatch::Exact("meltthresh"), PhaseSwitchKey::MeltThreshold),
    (KeyMatch::Exact("meltfreq"), PhaseSwitchKey::MeltFrequency),
];

/// Value of a phase-switch setting; the shape is fixed by the key
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum PhaseSwitchValue {
    Flag,
    Int(i64),
    Real(f64),
}

impl PhaseSwitchKey {
    fn parse_value(&self, payload: &[&str]) -> std::result::Result<PhaseSwitchValue, String> {
        match (self, payload) {
            (PhaseSwitchKey::MeltCheck, []) => Ok(PhaseSwitchValue::Flag),
            (PhaseSwitchKey::MeltCheck, _) => Err(format!("'{}' takes no value", self)),
            (PhaseSwitchKey::MeltThreshold, [value]) => control_parser::real(value)
                .map(PhaseSwitchValue::Real)
                .map_err(|e| format!("expected a real value for '{}' ({})", self, e)),
            (_, [value]) => control_parser::int(value)
                .map(PhaseSwitchValue::Int)
                .map_err(|e| format!("expected an integer value for '{}' ({})", self, e)),
            (_, _) => Err(format!("expected exactly one value for '{}'", self)),
        }
    }
}

impl PhaseSwitchValue {
    /// Whether this value has the shape `key` is read with
    pub fn fits(&self, key: PhaseSwitchKey) -> bool {
        match key {
            PhaseSwitchKey::MeltCheck => *self == PhaseSwitchValue::Flag,
            PhaseSwitchKey::MeltThreshold => matches!(self, PhaseSwitchValue::Real(_)),
            _ => matches!(self, PhaseSwitchValue::Int(_)),
        }
    }
}

/// Phase-switch flavour with its independently optional settings
#[derive(Clone,Debug,Default,PartialEq,Serialize,Deserialize)]
pub struct PhaseSwitch {
    pub nfreq: Option<i64>,
    pub settings: IndexMap<PhaseSwitchKey, PhaseSwitchValue>,
}

/// Which FED biasing scheme is active
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum FedFlavour {
    Generic { nfreq: Option<i64> },
    PhaseSwitch(PhaseSwitch),
}

impl FedFlavour {
    pub fn nfreq(&self) -> Option<i64> {
        match self {
            FedFlavour::Generic { nfreq } => *nfreq,
            FedFlavour::PhaseSwitch(ps) => ps.nfreq,
        }
    }

    /// Parse the `use fed` line and, for phase switch, its block up to `ps done`
    pub fn parse(cursor: Cursor<'_>) -> Result<(FedFlavour, Cursor<'_>)> {
        let (line, mut cursor) = cursor.next().ok_or_else(|| ControlError::MalformedDocument {
            reason: "expected 'use fed <flavour>'".into(),
            at: cursor.end_of_input(),
        })?;
        let lower = line.lowercase();
        let tokens: Vec<&str> = lower.split(' ').collect();
        let flavour = tokens.get(2).copied().unwrap_or("");
        if !matches!(flavour, "gen" | "generic" | "ps") {
            return Err(ControlError::UnsupportedVariant {
                variant: format!("fed flavour '{}'", flavour),
                at: line.clone(),
            });
        }
        let (_, nfreq) = control_parser::use_fed(&lower).map_err(|e| ControlError::MalformedFed {
            reason: format!("expected 'use fed <flavour> [nfreq]' ({})", e),
            at: line.clone(),
        })?;
        tracing::trace!(line = line.number, flavour, "fed flavour");
        if flavour != "ps" {
            return Ok((FedFlavour::Generic { nfreq }, cursor));
        }

        let mut ps = PhaseSwitch { nfreq, settings: IndexMap::new() };
        loop {
            let (line, rest) = cursor.next().ok_or_else(|| ControlError::MalformedDocument {
                reason: "phase-switch block without 'ps done'".into(),
                at: cursor.end_of_input(),
            })?;
            cursor = rest;
            let lower = line.lowercase();
            if lower == "ps done" {
                break;
            }
            let tokens: Vec<&str> = lower.split(' ').collect();
            let key = lookup(PHASE_SWITCH_KEYS, tokens[0]).ok_or_else(|| ControlError::MalformedFed {
                reason: "unknown phase-switch setting".into(),
                at: line.clone(),
            })?;
            let value = key.parse_value(&tokens[1..])
                .map_err(|reason| ControlError::MalformedFed { reason, at: line.clone() })?;
            ps.settings.insert(*key, value);
        }
        Ok((FedFlavour::PhaseSwitch(ps), cursor))
    }
}

impl FedFlavour {
    pub(crate) fn check(&self) -> Result<()> {
        let ps = match self {
            FedFlavour::PhaseSwitch(ps) => ps,
            FedFlavour::Generic { .. } => return Ok(()),
        };
        match ps.settings.iter().find(|(key, value)| !value.fits(**key)) {
            Some((key, value)) => Err(ControlError::invariant(format!(
                "phase-switch setting '{}' cannot hold {:?}", key, value))),
            None => Ok(()),
        }
    }
}

impl Display for PhaseSwitchValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseSwitchValue::Flag => Ok(()),
            PhaseSwitchValue::Int(n) => write!(f, " {}", n),
            PhaseSwitchValue::Real(x) => write!(f, " {}", Real(*x)),
        }
    }
}

impl Display for FedFlavour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FedFlavour::Generic { nfreq } => {
                write!(f, "use fed generic")?;
                if let Some(n) = nfreq {
                    write!(f, " {}", n)?;
                }
                Ok(())
            }
            FedFlavour::PhaseSwitch(ps) => {
                write!(f, "use fed ps")?;
                if let Some(n) = ps.nfreq {
                    write!(f, " {}", n)?;
                }
                for (key, value) in &ps.settings {
                    write!(f, "\n  {}{}", key, value)?;
                }
                write!(f, "\nps done")
            }
        }
    }
}
