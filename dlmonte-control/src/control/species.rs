//! Cross-reference of movers against the species a topology defines

use std::collections::HashSet;

use crate::error::{ControlError, Result};
use crate::parser::{AtomId, ControlDocument, SpeciesRef};

/// Species known to the companion topology (FIELD) reader
pub trait SpeciesCatalog {
    fn has_atom(&self, name: &str, kind: &str) -> bool;
    fn has_molecule(&self, name: &str) -> bool;
}

/// In-memory catalog
#[derive(Clone,Debug,Default)]
pub struct SpeciesSet {
    atoms: HashSet<AtomId>,
    molecules: HashSet<String>,
}

impl SpeciesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_atom(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.atoms.insert(AtomId::new(name, kind));
        self
    }

    pub fn with_molecule(mut self, name: impl Into<String>) -> Self {
        self.molecules.insert(name.into());
        self
    }
}

impl SpeciesCatalog for SpeciesSet {
    fn has_atom(&self, name: &str, kind: &str) -> bool {
        self.atoms.contains(&AtomId::new(name, kind))
    }

    fn has_molecule(&self, name: &str) -> bool {
        self.molecules.contains(name)
    }
}

impl ControlDocument {
    /// Fail on the first mover naming a species the catalog does not know
    pub fn check_species<C: SpeciesCatalog + ?Sized>(&self, catalog: &C) -> Result<()> {
        for mv in &self.main_block.moves {
            for species in mv.species() {
                let known = match species {
                    SpeciesRef::Atom(atom) => catalog.has_atom(&atom.name, &atom.kind),
                    SpeciesRef::Molecule(molecule) => catalog.has_molecule(&molecule.name),
                };
                if !known {
                    return Err(ControlError::UnknownSpecies {
                        species: species.to_string(),
                        keyword: mv.kind().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
