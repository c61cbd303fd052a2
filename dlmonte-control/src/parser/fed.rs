//! The FED block: `use fed ...` up to and including `fed done`

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::control::{DuplicatePolicy, ParserOptions};
use crate::error::{ControlError, Result};

use super::*;

/// Free-energy-difference settings of the use block
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct FedBlock {
    pub flavour: FedFlavour,
    pub method: Option<FedMethod>,
    pub order_parameter: Option<FedOrderParameter>,
}

impl FedBlock {
    pub fn new(flavour: FedFlavour) -> Self {
        Self { flavour, method: None, order_parameter: None }
    }

    pub fn with_method(mut self, method: FedMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_order_parameter(mut self, order_parameter: FedOrderParameter) -> Self {
        self.order_parameter = Some(order_parameter);
        self
    }

    /// Parse from the `use fed` line through `fed done`
    pub fn parse<'a>(cursor: Cursor<'a>, options: &ParserOptions) -> Result<(FedBlock, Cursor<'a>)> {
        let start = cursor.peek().map(|l| l.number);
        let (flavour, mut cursor) = FedFlavour::parse(cursor)?;
        let mut block = FedBlock::new(flavour);
        loop {
            let line = cursor.peek().ok_or_else(|| ControlError::MalformedDocument {
                reason: "fed block without 'fed done'".into(),
                at: cursor.end_of_input(),
            })?;
            let lower = line.lowercase();
            let tokens: Vec<&str> = lower.split(' ').collect();
            match (tokens[0], tokens.get(1).copied()) {
                ("fed", Some("done")) if tokens.len() == 2 => {
                    let (_, rest) = cursor.next().ok_or_else(|| ControlError::MalformedDocument {
                        reason: "fed block without 'fed done'".into(),
                        at: cursor.end_of_input(),
                    })?;
                    cursor = rest;
                    break;
                }
                ("fed", Some("method")) => {
                    let method = FedMethod::from_line(line)?;
                    if block.method.is_some() {
                        duplicate(options, "fed method", line)?;
                    }
                    block.method = Some(method);
                    cursor = skip_line(cursor);
                }
                ("fed", Some("order")) => {
                    let (order_parameter, rest) = FedOrderParameter::parse(cursor)?;
                    if block.order_parameter.is_some() {
                        duplicate(options, "fed order", line)?;
                    }
                    block.order_parameter = Some(order_parameter);
                    cursor = rest;
                }
                _ => return Err(ControlError::UnrecognizedFedKeyword { at: line.clone() }),
            }
        }
        tracing::debug!(?start, method = ?block.method.as_ref().map(|m| m.tag()),
            order = ?block.order_parameter.as_ref().map(|o| o.name()), "parsed fed block");
        Ok((block, cursor))
    }

    pub(crate) fn check(&self) -> Result<()> {
        self.flavour.check()?;
        match &self.order_parameter {
            Some(op) => op.check(),
            None => Ok(()),
        }
    }
}

fn skip_line(cursor: Cursor<'_>) -> Cursor<'_> {
    match cursor.next() {
        Some((_, rest)) => rest,
        None => cursor,
    }
}

fn duplicate(options: &ParserOptions, section: &str, line: &Line) -> Result<()> {
    match options.duplicate_fed_sections {
        DuplicatePolicy::Reject => Err(ControlError::DuplicateSection {
            section: section.to_string(),
            at: line.clone(),
        }),
        DuplicatePolicy::KeepLast => {
            tracing::warn!(line = line.number, section, "replacing earlier fed section");
            Ok(())
        }
    }
}

impl Display for FedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.flavour)?;
        if let Some(method) = &self.method {
            write!(f, "\n{}", method)?;
        }
        if let Some(op) = &self.order_parameter {
            write!(f, "\n{}", op)?;
        }
        write!(f, "\nfed done")
    }
}
