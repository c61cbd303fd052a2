//! Single-line global statements of the main block

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};
use crate::utils::{join_values, Real};

use super::keyword::{lookup, KeyMatch};
use super::*;

/// `ewald sum alpha kmax1 kmax2 kmax3`
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct EwaldSum {
    pub alpha: f64,
    pub kmax1: i64,
    pub kmax2: i64,
    pub kmax3: i64,
}

/// Explicit seeds for the random number generator
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct Seeds(pub [i64; 4]);

#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub enum NeighbourList {
    Auto,
    Fixed(i64),
}

/// Boxes without Ewald summation
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub enum EwaldExclusion {
    All,
    Box(i64),
}

/// Typed payload of a main-block statement
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum StatementValue {
    Flag,
    Int(i64),
    Float(f64),
    Word(String),
    EwaldSum(EwaldSum),
    Seeds(Seeds),
    NeighbourList(NeighbourList),
    EwaldExclusion(EwaldExclusion),
}

impl StatementValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StatementValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Reals, or integers where a real would do
    pub fn as_float(&self) -> Option<f64> {
        match self {
            StatementValue::Float(x) => Some(*x),
            StatementValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// Payload shape of a table entry
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
enum Payload {
    Int,
    /// Integer, also written as a real with an integral value (`100.0`)
    Interval,
    Real,
    Word,
    Flag,
    /// Integer taken from the last token, any words in between are dropped
    LastInt,
    LastReal,
    /// `ewald precision <real>` or `ewald sum <real> <int> <int> <int>`
    Ewald,
    NeighbourList,
    EwaldExclusion,
    Seeds,
}

/// A recognised statement: the key it is stored under (`None` keeps the
/// keyword as written) and its payload
#[derive(Clone,Copy,Debug)]
struct Rule {
    key: Option<&'static str>,
    payload: Payload,
}

const fn rule(payload: Payload) -> Rule {
    Rule { key: None, payload }
}

/// Main-block keywords, evaluated top to bottom
const STATEMENTS: &[(KeyMatch, Rule)] = &[
    (KeyMatch::Exact("acceptatmmoveupdate"), rule(Payload::Interval)),
    (KeyMatch::Exact("acceptmolmoveupdate"), rule(Payload::Int)),
    (KeyMatch::Exact("acceptmolrotupdate"), rule(Payload::Int)),
    (KeyMatch::Exact("check"), rule(Payload::Int)),
    (KeyMatch::Exact("maxnonbondnbrs"), rule(Payload::Int)),
    (KeyMatch::Exact("print"), rule(Payload::Int)),
    (KeyMatch::Exact("stack"), rule(Payload::Int)),
    (KeyMatch::Exact("steps"), rule(Payload::Int)),
    (KeyMatch::Exact("yamldata"), rule(Payload::Int)),
    (KeyMatch::Exact("maxatmdist"), rule(Payload::Real)),
    (KeyMatch::Exact("maxmolrot"), rule(Payload::Real)),
    (KeyMatch::Exact("revconformat"), rule(Payload::Word)),
    (KeyMatch::Exact("distewald"), rule(Payload::Flag)),
    (KeyMatch::Exact("ranseed"), rule(Payload::Flag)),
    (KeyMatch::Prefix("equil"), rule(Payload::LastInt)),
    (KeyMatch::Prefix("ewald"), rule(Payload::Ewald)),
    (KeyMatch::Exact("nbrlist"), rule(Payload::NeighbourList)),
    (KeyMatch::Exact("noewald"), rule(Payload::EwaldExclusion)),
    (KeyMatch::Prefix("pres"), Rule { key: Some(PRESSURE_KEY), payload: Payload::LastReal }),
    (KeyMatch::Exact("seeds"), rule(Payload::Seeds)),
    (KeyMatch::Prefix("stat"), rule(Payload::LastInt)),
    (KeyMatch::Prefix("temp"), rule(Payload::LastReal)),
    (KeyMatch::Prefix("toler"), rule(Payload::LastReal)),
];

pub const PRESSURE_KEY: &str = "pressure";
pub const EWALD_PRECISION_KEY: &str = "ewald precision";
pub const EWALD_SUM_KEY: &str = "ewald sum";

/// Keys stored with a space in them
pub const COMPOUND_KEYS: [&str; 2] = [EWALD_PRECISION_KEY, EWALD_SUM_KEY];

fn malformed(line: &Line, reason: impl Into<String>) -> ControlError {
    ControlError::MalformedStatement { reason: reason.into(), at: line.clone() }
}

fn exact_arity(line: &Line, tokens: &[&str], n: usize) -> Result<()> {
    if tokens.len() != n {
        return Err(malformed(line, format!(
            "'{}' takes {} argument{}, found {}", tokens[0], n - 1, if n == 2 { "" } else { "s" },
            tokens.len() - 1)));
    }
    Ok(())
}

fn int(line: &Line, token: &str) -> Result<i64> {
    control_parser::int(token).map_err(|e| malformed(line, format!("expected an integer ({})", e)))
}

fn real(line: &Line, token: &str) -> Result<f64> {
    control_parser::real(token).map_err(|e| malformed(line, format!("expected a real number ({})", e)))
}

fn interval(line: &Line, token: &str) -> Result<i64> {
    if let Ok(n) = control_parser::int(token) {
        return Ok(n);
    }
    let x = real(line, token)?;
    if x.fract() != 0.0 || x.abs() > i64::MAX as f64 {
        return Err(malformed(line, format!("expected a whole number of steps, found {}", token)));
    }
    Ok(x as i64)
}

/// Parse one global statement into its stored key and value
pub fn parse_statement(line: &Line) -> Result<(String, StatementValue)> {
    let lower = line.lowercase();
    let tokens: Vec<&str> = lower.split(' ').collect();
    let keyword = tokens[0];
    let rule = lookup(STATEMENTS, keyword).ok_or_else(|| malformed(line, "unrecognised statement"))?;
    let mut key = rule.key.unwrap_or(keyword).to_string();
    let last = tokens[tokens.len() - 1];

    let value = match rule.payload {
        Payload::Int => {
            exact_arity(line, &tokens, 2)?;
            StatementValue::Int(int(line, tokens[1])?)
        }
        Payload::Interval => {
            exact_arity(line, &tokens, 2)?;
            StatementValue::Int(interval(line, tokens[1])?)
        }
        Payload::Real => {
            exact_arity(line, &tokens, 2)?;
            StatementValue::Float(real(line, tokens[1])?)
        }
        Payload::Word => {
            exact_arity(line, &tokens, 2)?;
            StatementValue::Word(tokens[1].to_string())
        }
        Payload::Flag => {
            exact_arity(line, &tokens, 1)?;
            StatementValue::Flag
        }
        Payload::LastInt | Payload::LastReal => {
            if tokens.len() < 2 {
                return Err(malformed(line, format!("'{}' needs a value", keyword)));
            }
            if rule.payload == Payload::LastInt {
                StatementValue::Int(int(line, last)?)
            }
            else {
                StatementValue::Float(real(line, last)?)
            }
        }
        Payload::Ewald => {
            let sub = tokens.get(1).copied().unwrap_or("");
            if sub.starts_with("prec") {
                exact_arity(line, &tokens, 3)?;
                key = EWALD_PRECISION_KEY.to_string();
                StatementValue::Float(real(line, tokens[2])?)
            }
            else if sub.starts_with("sum") {
                key = EWALD_SUM_KEY.to_string();
                let payload = tokens[2..].join(" ");
                let sum = control_parser::ewald_sum(&payload).map_err(|e| malformed(line,
                    format!("expected 'ewald sum alpha kmax1 kmax2 kmax3' ({})", e)))?;
                StatementValue::EwaldSum(sum)
            }
            else {
                return Err(malformed(line, "unrecognised statement"));
            }
        }
        Payload::NeighbourList => {
            if tokens.len() < 2 {
                return Err(malformed(line, "'nbrlist' needs 'auto' or a size"));
            }
            if tokens[1] == "auto" {
                exact_arity(line, &tokens, 2)?;
                StatementValue::NeighbourList(NeighbourList::Auto)
            }
            else {
                StatementValue::NeighbourList(NeighbourList::Fixed(int(line, last)?))
            }
        }
        Payload::EwaldExclusion => {
            exact_arity(line, &tokens, 2)?;
            if tokens[1] == "all" {
                StatementValue::EwaldExclusion(EwaldExclusion::All)
            }
            else {
                StatementValue::EwaldExclusion(EwaldExclusion::Box(int(line, tokens[1])?))
            }
        }
        Payload::Seeds => {
            let payload = tokens[1..].join(" ");
            let seeds = control_parser::seeds(&payload)
                .map_err(|e| malformed(line, format!("expected four integer seeds ({})", e)))?;
            StatementValue::Seeds(seeds)
        }
    };
    Ok((key, value))
}

/// Check that `key` would be read back as itself
pub(crate) fn check_key(key: &str) -> Result<()> {
    let valid = if COMPOUND_KEYS.contains(&key) {
        true
    }
    else {
        !key.is_empty()
            && key == key.to_lowercase()
            && !key.contains(char::is_whitespace)
            && !key.contains(COMMENT_MARKER)
            && lookup(STATEMENTS, key)
                .map(|rule| rule.payload != Payload::Ewald && rule.key.map_or(true, |k| k == key))
                .unwrap_or(false)
    };
    if !valid {
        return Err(ControlError::invariant(format!("invalid statement key {:?}", key)));
    }
    Ok(())
}

/// Check that `value` has the shape the statement table reads back for `key`
pub(crate) fn check_value(key: &str, value: &StatementValue) -> Result<()> {
    let payload = lookup(STATEMENTS, key).map(|rule| rule.payload);
    let valid = match (payload, value) {
        (Some(Payload::Ewald), StatementValue::Float(_)) => key == EWALD_PRECISION_KEY,
        (Some(Payload::Ewald), StatementValue::EwaldSum(_)) => key == EWALD_SUM_KEY,
        (Some(Payload::Int | Payload::Interval | Payload::LastInt), StatementValue::Int(_)) => true,
        (Some(Payload::Real | Payload::LastReal), StatementValue::Float(_)) => true,
        (Some(Payload::Word), StatementValue::Word(word)) => {
            !word.is_empty()
                && *word == word.to_lowercase()
                && !word.contains(char::is_whitespace)
                && !word.contains(COMMENT_MARKER)
        }
        (Some(Payload::Flag), StatementValue::Flag) => true,
        (Some(Payload::NeighbourList), StatementValue::NeighbourList(_)) => true,
        (Some(Payload::EwaldExclusion), StatementValue::EwaldExclusion(_)) => true,
        (Some(Payload::Seeds), StatementValue::Seeds(_)) => true,
        _ => false,
    };
    if !valid {
        return Err(ControlError::invariant(format!(
            "statement '{}' cannot hold {:?}", key, value)));
    }
    Ok(())
}

impl Display for EwaldSum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", Real(self.alpha), self.kmax1, self.kmax2, self.kmax3)
    }
}

impl Display for Seeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&join_values(&self.0))
    }
}

impl Display for StatementValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementValue::Flag => Ok(()),
            StatementValue::Int(n) => write!(f, "{}", n),
            StatementValue::Float(x) => write!(f, "{}", Real(*x)),
            StatementValue::Word(w) => f.write_str(w),
            StatementValue::EwaldSum(sum) => write!(f, "{}", sum),
            StatementValue::Seeds(seeds) => write!(f, "{}", seeds),
            StatementValue::NeighbourList(NeighbourList::Auto) => f.write_str("auto"),
            StatementValue::NeighbourList(NeighbourList::Fixed(n)) => write!(f, "{}", n),
            StatementValue::EwaldExclusion(EwaldExclusion::All) => f.write_str("all"),
            StatementValue::EwaldExclusion(EwaldExclusion::Box(n)) => write!(f, "{}", n),
        }
    }
}

/// Write a statement line
pub fn format_statement(key: &str, value: &StatementValue) -> String {
    match value {
        StatementValue::Flag => key.to_string(),
        _ => format!("{} {}", key, value),
    }
}
