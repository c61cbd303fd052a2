//! The use block: `use` directives (and the optional FED block) up to `finish`

use std::fmt::Display;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

use crate::control::ParserOptions;
use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::*;

/// Terminator line of the use block as written
pub const USE_BLOCK_TERMINATOR: &str = "finish use-block";

/// The closed set of `use` keys
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,EnumIter,EnumString,StrumDisplay,Serialize,Deserialize)]
pub enum UseKey {
    #[strum(serialize = "gaspressure")]
    GasPressure,
    #[strum(serialize = "repexch")]
    ReplicaExchange,
    #[strum(serialize = "rotquaternion")]
    RotQuaternion,
    #[strum(serialize = "seqmove")]
    SequentialMove,
    #[strum(serialize = "seqmolmove")]
    SequentialMolMove,
    #[strum(serialize = "seqmolrot")]
    SequentialMolRot,
}

impl UseKey {
    /// Only replica exchange carries a payload
    pub fn takes_payload(&self) -> bool {
        *self == UseKey::ReplicaExchange
    }
}

/// Payload of `use repexch`
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct ReplicaExchange {
    /// Number of replicas
    pub nrep: i64,
    /// Temperature increment between replicas
    pub deltat: f64,
    /// Steps between exchange attempts
    pub nstep: i64,
}

impl Display for ReplicaExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.nrep, Real(self.deltat), self.nstep)
    }
}

#[derive(Clone,Debug,Default,PartialEq,Serialize,Deserialize)]
pub struct UseBlock {
    /// Directives in first-seen order; `Some` exactly for `repexch`
    pub statements: IndexMap<UseKey, Option<ReplicaExchange>>,
    pub fed: Option<FedBlock>,
}

impl UseBlock {
    pub fn fed(&self) -> Option<&FedBlock> {
        self.fed.as_ref()
    }

    pub fn contains(&self, key: UseKey) -> bool {
        self.statements.contains_key(&key)
    }

    pub fn replica_exchange(&self) -> Option<&ReplicaExchange> {
        self.statements.get(&UseKey::ReplicaExchange).and_then(|p| p.as_ref())
    }

    /// Parse the use span (everything between title and terminator)
    pub fn parse(lines: &[Line], options: &ParserOptions) -> Result<UseBlock> {
        let mut block = UseBlock::default();
        let mut cursor = Cursor::new(lines);
        while let Some(line) = cursor.peek() {
            let lower = line.lowercase();
            let tokens: Vec<&str> = lower.split(' ').collect();
            if tokens[0] != "use" {
                return Err(ControlError::UnknownUseKey { key: tokens[0].to_string(), at: line.clone() });
            }
            let key = tokens.get(1).copied().unwrap_or("");
            if key == "fed" {
                if block.fed.is_some() {
                    return Err(ControlError::DuplicateSection { section: "use fed".into(), at: line.clone() });
                }
                let (fed, rest) = FedBlock::parse(cursor, options)?;
                block.fed = Some(fed);
                cursor = rest;
                continue;
            }
            let use_key = UseKey::from_str(key).map_err(|_| ControlError::UnknownUseKey {
                key: key.to_string(),
                at: line.clone(),
            })?;
            let payload = &tokens[2..];
            let value = if use_key.takes_payload() {
                let payload = payload.join(" ");
                let repexch = control_parser::replica_exchange(&payload).map_err(|e| {
                    ControlError::MalformedStatement {
                        reason: format!("expected 'use {} nrep deltat nstep' ({})", use_key, e),
                        at: line.clone(),
                    }
                })?;
                Some(repexch)
            }
            else if !payload.is_empty() {
                return Err(ControlError::MalformedStatement {
                    reason: format!("'use {}' takes no arguments", use_key),
                    at: line.clone(),
                });
            }
            else {
                None
            };
            tracing::trace!(line = line.number, key = %use_key, "use statement");
            block.statements.insert(use_key, value);
            if let Some((_, rest)) = cursor.next() {
                cursor = rest;
            }
        }
        tracing::debug!(statements = block.statements.len(), fed = block.fed.is_some(), "parsed use block");
        Ok(block)
    }

    pub(crate) fn check(&self) -> Result<()> {
        for (key, payload) in &self.statements {
            if key.takes_payload() != payload.is_some() {
                return Err(ControlError::invariant(format!(
                    "'use {}' {} a payload", key,
                    if key.takes_payload() { "requires" } else { "does not take" })));
            }
        }
        match &self.fed {
            Some(fed) => fed.check(),
            None => Ok(()),
        }
    }
}

impl Display for UseBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, payload) in &self.statements {
            match payload {
                Some(payload) => writeln!(f, "use {} {}", key, payload)?,
                None => writeln!(f, "use {}", key)?,
            }
        }
        if let Some(fed) = &self.fed {
            writeln!(f, "{}", fed)?;
        }
        write!(f, "{}", USE_BLOCK_TERMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<UseBlock> {
        UseBlock::parse(&normalize(text), &ParserOptions::default())
    }

    #[test]
    fn flags_and_payload() {
        let block = parse("use seqmove\nUSE repexch 4 0.5 100\nuse gaspressure").expect("Cannot parse use block");
        let keys: Vec<_> = block.statements.keys().copied().collect();
        assert_eq!(keys, vec![UseKey::SequentialMove, UseKey::ReplicaExchange, UseKey::GasPressure]);
        assert_eq!(block.replica_exchange(), Some(&ReplicaExchange { nrep: 4, deltat: 0.5, nstep: 100 }));
        assert!(block.fed().is_none());
        assert_eq!(block.to_string(),
            "use seqmove\nuse repexch 4 0.5 100\nuse gaspressure\nfinish use-block");
    }

    #[test]
    fn repeated_key_keeps_position() {
        let block = parse("use repexch 2 1.0 10\nuse seqmolrot\nuse repexch 8 0.25 50").unwrap();
        assert_eq!(block.statements.len(), 2);
        assert_eq!(block.statements.get_index(0).map(|(k, _)| *k), Some(UseKey::ReplicaExchange));
        assert_eq!(block.replica_exchange().map(|r| r.nrep), Some(8));
    }

    #[test]
    fn key_closure() {
        let err = parse("use teleport").unwrap_err();
        match err {
            ControlError::UnknownUseKey { key, .. } => assert_eq!(key, "teleport"),
            other => panic!("Expected UnknownUseKey but got {:?}", other),
        }
        let err = parse("use seqmove 3").unwrap_err();
        assert!(matches!(err, ControlError::MalformedStatement { .. }), "Flag payload not caught: {:?}", err);
        let err = parse("use repexch 4 0.5").unwrap_err();
        assert!(matches!(err, ControlError::MalformedStatement { .. }), "Short payload not caught: {:?}", err);
        let err = parse("use repexch").unwrap_err();
        assert!(matches!(err, ControlError::MalformedStatement { .. }), "Missing payload not caught: {:?}", err);
        match parse("use seqmove\nsteps 10").unwrap_err() {
            ControlError::UnknownUseKey { key, at } => {
                assert_eq!(key, "steps");
                assert_eq!(at.number, 2);
            }
            other => panic!("Expected UnknownUseKey for a bare statement but got {:?}", other),
        }
    }

    #[test]
    fn fed_inside_use_block() {
        let block = parse("use fed generic\nfed method us 0 1 10\nfed done\nuse rotquaternion")
            .expect("Cannot parse use block with fed");
        assert!(block.fed().is_some());
        assert!(block.contains(UseKey::RotQuaternion));
        assert_eq!(block.to_string(),
            "use rotquaternion\nuse fed generic\nfed method us 0.0 1.0 10\nfed done\nfinish use-block");
        let err = parse("use fed generic\nfed done\nuse fed ps\nps done\nfed done").unwrap_err();
        assert!(matches!(err, ControlError::DuplicateSection { .. }), "Second fed block not caught: {:?}", err);
    }

    #[test]
    fn payload_invariant() {
        let mut block = UseBlock::default();
        block.statements.insert(UseKey::ReplicaExchange, None);
        assert!(block.check().is_err(), "Missing repexch payload not caught");
        let mut block = UseBlock::default();
        block.statements.insert(UseKey::SequentialMove, Some(ReplicaExchange { nrep: 1, deltat: 1.0, nstep: 1 }));
        assert!(block.check().is_err(), "Payload on flag not caught");
    }
}
