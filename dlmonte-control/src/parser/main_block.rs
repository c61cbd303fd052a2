//! The main block: global statements, samples and moves up to `start`

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};

use super::*;

/// Terminator line of the main block as written
pub const MAIN_BLOCK_TERMINATOR: &str = "start simulation";

#[derive(Clone,Debug,Default,PartialEq,Serialize,Deserialize)]
pub struct MainBlock {
    /// Global statements by stored (lower-case) key, first-seen order
    pub statements: IndexMap<String, StatementValue>,
    pub moves: Vec<Move>,
    pub samples: IndexMap<SampleKind, Sample>,
}

impl MainBlock {
    /// Statement by key, case-insensitive
    pub fn statement(&self, key: &str) -> Option<&StatementValue> {
        self.statements.get(&key.to_lowercase())
    }

    /// First statement whose key starts with `prefix`
    fn statement_with_prefix(&self, prefix: &str) -> Option<&StatementValue> {
        self.statements.iter()
            .find(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value)
    }

    /// Temperature in Kelvin (any `temp...` statement)
    pub fn temperature(&self) -> Option<f64> {
        self.statement_with_prefix("temp").and_then(|v| v.as_float())
    }

    pub fn pressure(&self) -> Option<f64> {
        self.statement(PRESSURE_KEY).and_then(|v| v.as_float())
    }

    pub fn steps(&self) -> Option<i64> {
        self.statement("steps").and_then(|v| v.as_int())
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn samples(&self) -> &IndexMap<SampleKind, Sample> {
        &self.samples
    }

    /// Insert or replace a statement, keeping the position of an earlier one
    pub fn set_statement(&mut self, key: impl Into<String>, value: StatementValue) {
        self.statements.insert(key.into().to_lowercase(), value);
    }

    pub fn add_move(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.insert(sample.kind(), sample);
    }

    /// Parse the main span (everything between `finish` and `start`)
    pub fn parse(lines: &[Line]) -> Result<MainBlock> {
        let mut block = MainBlock::default();
        let mut cursor = Cursor::new(lines);
        while let Some((line, rest)) = cursor.next() {
            match line.keyword().as_str() {
                "move" => {
                    let (mv, rest) = Move::parse(cursor)?;
                    block.moves.push(mv);
                    cursor = rest;
                }
                "sample" => {
                    block.add_sample(Sample::from_line(line)?);
                    cursor = rest;
                }
                _ => {
                    let (key, value) = parse_statement(line)?;
                    tracing::trace!(line = line.number, %key, "statement");
                    block.statements.insert(key, value);
                    cursor = rest;
                }
            }
        }
        tracing::debug!(statements = block.statements.len(), moves = block.moves.len(),
            samples = block.samples.len(), "parsed main block");
        Ok(block)
    }

    pub(crate) fn check(&self) -> Result<()> {
        for (key, value) in &self.statements {
            check_key(key)?;
            check_value(key, value)?;
        }
        for (kind, sample) in &self.samples {
            if *kind != sample.kind() {
                return Err(ControlError::invariant(format!(
                    "sample stored under '{}' is a '{}' sample", kind, sample.kind())));
            }
        }
        self.moves.iter().try_for_each(|mv| mv.check())
    }
}

impl Display for MainBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in &self.statements {
            writeln!(f, "{}", format_statement(key, value))?;
        }
        for sample in self.samples.values() {
            writeln!(f, "{}", sample)?;
        }
        for mv in &self.moves {
            writeln!(f, "{}", mv)?;
        }
        write!(f, "{}", MAIN_BLOCK_TERMINATOR)
    }
}
