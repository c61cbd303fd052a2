//! `fed order ...`: the coordinate the free energy is computed along

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::records::check_token;
use super::*;

/// Order parameter names with the single-line form
#[derive(Clone,Copy,Debug,PartialEq,Eq,EnumIter,EnumString,StrumDisplay,Serialize,Deserialize)]
pub enum OrderParameterName {
    #[strum(serialize = "ps")]
    PhaseSwitch,
    #[strum(serialize = "psmc")]
    PhaseSwitchMc,
    #[strum(serialize = "hardps")]
    HardPhaseSwitch,
    #[strum(serialize = "volume")]
    Volume,
    #[strum(serialize = "temp")]
    Temperature,
    #[strum(serialize = "beta")]
    Beta,
}

/// Name of the structured centre-of-mass order parameter
pub const COM2_NAME: &str = "com2";

/// Parsed `fed order` header line
#[derive(Clone,Debug,PartialEq)]
pub struct OrderHeader {
    pub name: String,
    pub ngrid: i64,
    pub xmin: f64,
    pub xmax: f64,
    pub npow: Option<i64>,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct SimpleOrderParameter {
    pub name: OrderParameterName,
    pub ngrid: i64,
    pub xmin: f64,
    pub xmax: f64,
    pub npow: Option<i64>,
}

/// Distance between two centres of mass, with the group selectors
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct ComOrderParameter {
    pub ngrid: i64,
    pub xmin: f64,
    pub xmax: f64,
    pub npow: Option<i64>,
    /// Raw `com1 ...` selector line
    pub com1: String,
    /// Raw `com2 ...` selector line
    pub com2: String,
    pub sampling_correction: Option<i64>,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum FedOrderParameter {
    Simple(SimpleOrderParameter),
    CenterOfMass2(ComOrderParameter),
}

fn malformed(line: &Line, reason: impl Into<String>) -> ControlError {
    ControlError::MalformedFed { reason: reason.into(), at: line.clone() }
}

/// Terminator of the com2 sub-block: `fed order ... done`
fn is_order_done(lower: &str) -> bool {
    let tokens: Vec<&str> = lower.split(' ').collect();
    tokens.len() >= 3 && tokens[0] == "fed" && tokens[1] == "order" && tokens[tokens.len() - 1] == "done"
}

impl FedOrderParameter {
    pub fn name(&self) -> String {
        match self {
            FedOrderParameter::Simple(op) => op.name.to_string(),
            FedOrderParameter::CenterOfMass2(_) => COM2_NAME.to_string(),
        }
    }

    /// Parse an order parameter line (and the com2 sub-block if the name asks for it)
    pub fn parse(cursor: Cursor<'_>) -> Result<(FedOrderParameter, Cursor<'_>)> {
        let (line, cursor) = cursor.next().ok_or_else(|| ControlError::MalformedDocument {
            reason: "expected 'fed order'".into(),
            at: cursor.end_of_input(),
        })?;
        let lower = line.lowercase();
        let header = control_parser::order_header(&lower).map_err(|e| malformed(line, format!(
            "expected 'fed order [param[eter]] <name> ngrid xmin xmax [npow]' ({})", e)))?;
        tracing::trace!(line = line.number, name = %header.name, "fed order parameter");

        if header.name != COM2_NAME {
            let name = OrderParameterName::from_str(&header.name).map_err(|_| {
                ControlError::UnsupportedVariant {
                    variant: format!("order parameter '{}'", header.name),
                    at: line.clone(),
                }
            })?;
            let op = SimpleOrderParameter {
                name,
                ngrid: header.ngrid,
                xmin: header.xmin,
                xmax: header.xmax,
                npow: header.npow,
            };
            return Ok((FedOrderParameter::Simple(op), cursor));
        }

        let missing = |cursor: Cursor<'_>, what: &str| malformed(&cursor.end_of_input(),
            format!("com2 order parameter block ended before its {}", what));
        let (com1, cursor) = cursor.next().ok_or_else(|| missing(cursor, "'com1' line"))?;
        if com1.keyword() != "com1" {
            return Err(malformed(com1, "expected the 'com1' selector line"));
        }
        let (com2, cursor) = cursor.next().ok_or_else(|| missing(cursor, "'com2' line"))?;
        if com2.keyword() != "com2" {
            return Err(malformed(com2, "expected the 'com2' selector line"));
        }

        let (mut next, mut cursor) = cursor.next().ok_or_else(|| missing(cursor, "terminator"))?;
        let mut sampling_correction = None;
        if next.keyword() == "com" {
            let n = control_parser::sampling_correction(&next.lowercase()).map_err(|e| malformed(next,
                format!("expected 'com sampling correction <n>' ({})", e)))?;
            sampling_correction = Some(n);
            let (line, rest) = cursor.next().ok_or_else(|| missing(cursor, "terminator"))?;
            next = line;
            cursor = rest;
        }
        if !is_order_done(&next.lowercase()) {
            return Err(malformed(next, "expected 'fed order param done'"));
        }

        let op = ComOrderParameter {
            ngrid: header.ngrid,
            xmin: header.xmin,
            xmax: header.xmax,
            npow: header.npow,
            com1: com1.lowercase(),
            com2: com2.lowercase(),
            sampling_correction,
        };
        Ok((FedOrderParameter::CenterOfMass2(op), cursor))
    }

    /// Check the selector lines of a hand-built com2 parameter
    pub(crate) fn check(&self) -> Result<()> {
        if let FedOrderParameter::CenterOfMass2(op) = self {
            for (what, text) in [("com1", &op.com1), ("com2", &op.com2)] {
                if text.contains('\n') || text.contains(COMMENT_MARKER) {
                    return Err(ControlError::invariant(format!(
                        "{} selector must be a single comment-free line, got {:?}", what, text)));
                }
                let first = text.split_whitespace().next().unwrap_or("");
                if !first.eq_ignore_ascii_case(what) {
                    return Err(ControlError::invariant(format!(
                        "{} selector line must start with '{}', got {:?}", what, what, text)));
                }
                for token in text.split_whitespace() {
                    check_token("selector token", token)?;
                }
            }
        }
        Ok(())
    }
}

fn write_header(f: &mut std::fmt::Formatter<'_>, name: &dyn Display, ngrid: i64, xmin: f64, xmax: f64,
    npow: Option<i64>) -> std::fmt::Result
{
    write!(f, "fed order param {} {} {} {}", name, ngrid, Real(xmin), Real(xmax))?;
    if let Some(n) = npow {
        write!(f, " {}", n)?;
    }
    Ok(())
}

impl Display for FedOrderParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FedOrderParameter::Simple(op) =>
                write_header(f, &op.name, op.ngrid, op.xmin, op.xmax, op.npow),
            FedOrderParameter::CenterOfMass2(op) => {
                write_header(f, &COM2_NAME, op.ngrid, op.xmin, op.xmax, op.npow)?;
                write!(f, "\n{}\n{}", op.com1, op.com2)?;
                if let Some(n) = op.sampling_correction {
                    write!(f, "\ncom sampling correction {}", n)?;
                }
                write!(f, "\nfed order param done")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<FedOrderParameter> {
        let lines = normalize(text);
        let (op, rest) = FedOrderParameter::parse(Cursor::new(&lines))?;
        assert!(rest.is_empty(), "Order parameter left {} lines unconsumed", rest.remaining());
        Ok(op)
    }

    #[test]
    fn simple() {
        let op = parse("fed order parameter volume 100 1000.0 2000.0 2").expect("Cannot parse volume order");
        assert_eq!(op, FedOrderParameter::Simple(SimpleOrderParameter {
            name: OrderParameterName::Volume, ngrid: 100, xmin: 1000.0, xmax: 2000.0, npow: Some(2),
        }));
        assert_eq!(op.to_string(), "fed order param volume 100 1000.0 2000.0 2");
        let op = parse("fed order temp 10 1 2").expect("Cannot parse abbreviated order line");
        assert_eq!(op.name(), "temp");
    }

    #[test]
    fn unknown_name() {
        let err = parse("fed order param density 10 0.0 1.0").unwrap_err();
        assert!(matches!(err, ControlError::UnsupportedVariant { .. }), "Got {:?}", err);
        let err = parse("fed order param ps ten 0.0 1.0").unwrap_err();
        assert!(matches!(err, ControlError::MalformedFed { .. }), "Got {:?}", err);
    }

    #[test]
    fn com2_block() {
        let text = "fed order param com2 50 0.0 10.0\n\
                    com1 molecules 1 atoms 1 2\n\
                    com2 molecules 2\n\
                    com sampling correction 1\n\
                    fed order parameter done";
        let op = parse(text).expect("Cannot parse com2 block");
        match &op {
            FedOrderParameter::CenterOfMass2(com) => {
                assert_eq!(com.com1, "com1 molecules 1 atoms 1 2");
                assert_eq!(com.sampling_correction, Some(1));
            }
            other => panic!("Expected com2 but got {:?}", other),
        }
        assert!(op.check().is_ok());
        assert_eq!(op.to_string(), "fed order param com2 50 0.0 10.0\n\
                                    com1 molecules 1 atoms 1 2\n\
                                    com2 molecules 2\n\
                                    com sampling correction 1\n\
                                    fed order param done");
    }

    #[test]
    fn com2_block_failures() {
        let err = parse("fed order param com2 50 0.0 10.0\ncom2 molecules 2\ncom1 molecules 1\nfed order done")
            .unwrap_err();
        assert!(matches!(err, ControlError::MalformedFed { .. }), "Swapped selectors not caught: {:?}", err);
        let err = parse("fed order param com2 50 0.0 10.0\ncom1 m 1\ncom2 m 2").unwrap_err();
        assert!(matches!(err, ControlError::MalformedFed { .. }), "Missing terminator not caught: {:?}", err);
        let without = parse("fed order com2 5 0 1\ncom1 m 1\ncom2 m 2\nfed order done").unwrap();
        match without {
            FedOrderParameter::CenterOfMass2(com) => assert_eq!(com.sampling_correction, None),
            other => panic!("Expected com2 but got {:?}", other),
        }
    }

    #[test]
    fn selector_invariant() {
        let op = FedOrderParameter::CenterOfMass2(ComOrderParameter {
            ngrid: 1, xmin: 0.0, xmax: 1.0, npow: None,
            com1: "molecules 1".into(), com2: "com2 molecules 2".into(), sampling_correction: None,
        });
        assert!(op.check().is_err(), "Selector without 'com1' not caught");
    }
}
