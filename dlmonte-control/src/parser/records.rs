//! Mover records: the per-line participants of a move statement

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::control_parser;

/// An atom given as `name type` (e.g. `Na core`)
#[derive(Clone,Debug,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub struct AtomId {
    pub name: String,
    pub kind: String,
}

impl AtomId {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into() }
    }
}

impl Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.kind)
    }
}

/// A molecule given by name
#[derive(Clone,Debug,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub struct MoleculeId {
    pub name: String,
}

impl MoleculeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for MoleculeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Pair of atoms exchanged by a swap move
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct AtomSwap {
    pub first: AtomId,
    pub second: AtomId,
}

impl Display for AtomSwap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

/// Pair of molecules exchanged by a swap move
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct MoleculeSwap {
    pub first: MoleculeId,
    pub second: MoleculeId,
}

impl Display for MoleculeSwap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

/// Atom inserted/removed by grand-canonical moves, with its activity
/// (chemical potential or partial pressure)
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct GcAtom {
    pub atom: AtomId,
    pub activity: f64,
}

impl Display for GcAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.atom, Real(self.activity))
    }
}

/// Molecule inserted/removed by grand-canonical moves, with its activity
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct GcMolecule {
    pub molecule: MoleculeId,
    pub activity: f64,
}

impl Display for GcMolecule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.molecule, Real(self.activity))
    }
}

/// A species named by a mover record
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum SpeciesRef<'a> {
    Atom(&'a AtomId),
    Molecule(&'a MoleculeId),
}

impl Display for SpeciesRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeciesRef::Atom(atom) => atom.fmt(f),
            SpeciesRef::Molecule(molecule) => molecule.fmt(f),
        }
    }
}

/// One line of a move's mover list
pub trait MoverRecord: Sized + Display {
    /// Parse a single (normalized) mover line; the error is a reason string
    fn parse(text: &str) -> std::result::Result<Self, String>;

    /// Species this record refers to
    fn species(&self) -> Vec<SpeciesRef<'_>>;
}

/// Records of grand-canonical moves additionally carry an activity
pub trait ActivityRecord: MoverRecord {
    fn species_name(&self) -> String;
    fn activity(&self) -> f64;
}

impl MoverRecord for AtomId {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        control_parser::atom_id(text).map_err(|e| format!("expected 'name type' ({})", e))
    }

    fn species(&self) -> Vec<SpeciesRef<'_>> {
        vec![SpeciesRef::Atom(self)]
    }
}

impl MoverRecord for MoleculeId {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        control_parser::molecule_id(text).map_err(|e| format!("expected 'name' ({})", e))
    }

    fn species(&self) -> Vec<SpeciesRef<'_>> {
        vec![SpeciesRef::Molecule(self)]
    }
}

impl MoverRecord for AtomSwap {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        control_parser::atom_swap(text)
            .map_err(|e| format!("expected 'name1 type1 name2 type2' ({})", e))
    }

    fn species(&self) -> Vec<SpeciesRef<'_>> {
        vec![SpeciesRef::Atom(&self.first), SpeciesRef::Atom(&self.second)]
    }
}

impl MoverRecord for MoleculeSwap {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        control_parser::molecule_swap(text).map_err(|e| format!("expected 'name1 name2' ({})", e))
    }

    fn species(&self) -> Vec<SpeciesRef<'_>> {
        vec![SpeciesRef::Molecule(&self.first), SpeciesRef::Molecule(&self.second)]
    }
}

impl MoverRecord for GcAtom {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        control_parser::gc_atom(text).map_err(|e| format!("expected 'name type activity' ({})", e))
    }

    fn species(&self) -> Vec<SpeciesRef<'_>> {
        vec![SpeciesRef::Atom(&self.atom)]
    }
}

impl ActivityRecord for GcAtom {
    fn species_name(&self) -> String {
        self.atom.to_string()
    }

    fn activity(&self) -> f64 {
        self.activity
    }
}

impl MoverRecord for GcMolecule {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        control_parser::gc_molecule(text).map_err(|e| format!("expected 'name activity' ({})", e))
    }

    fn species(&self) -> Vec<SpeciesRef<'_>> {
        vec![SpeciesRef::Molecule(&self.molecule)]
    }
}

impl ActivityRecord for GcMolecule {
    fn species_name(&self) -> String {
        self.molecule.name.clone()
    }

    fn activity(&self) -> f64 {
        self.activity
    }
}

/// Check that a name written into a record survives re-reading as one token
pub(crate) fn check_token(what: &str, value: &str) -> Result<()> {
    if value.is_empty()
        || value.contains(char::is_whitespace)
        || value.contains(super::COMMENT_MARKER)
    {
        return Err(ControlError::invariant(format!(
            "{} must be a single token without '{}', got {:?}", what, super::COMMENT_MARKER, value)));
    }
    Ok(())
}

/// Token check for every species a record names
pub(crate) fn check_record<M: MoverRecord>(record: &M) -> Result<()> {
    for species in record.species() {
        match species {
            SpeciesRef::Atom(atom) => {
                check_token("atom name", &atom.name)?;
                check_token("atom type", &atom.kind)?;
            }
            SpeciesRef::Molecule(molecule) => check_token("molecule name", &molecule.name)?,
        }
    }
    Ok(())
}
