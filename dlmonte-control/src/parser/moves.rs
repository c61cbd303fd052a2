//! Move statements: `move <kind> ...` plus their mover lists

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::keyword::{lookup, KeyMatch};
use super::records::check_record;
use super::*;

/// Every move kind DL_MONTE knows about, with its CONTROL keyword
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,EnumIter,StrumDisplay)]
pub enum MoveKind {
    #[strum(serialize = "atom")]
    Atom,
    #[strum(serialize = "molecule")]
    Molecule,
    #[strum(serialize = "rotatemol")]
    RotateMolecule,
    #[strum(serialize = "swapatoms")]
    SwapAtoms,
    #[strum(serialize = "swapmols")]
    SwapMolecules,
    #[strum(serialize = "semiwidomatoms")]
    SemiWidomAtoms,
    #[strum(serialize = "semigrandatoms")]
    SemiGrandAtoms,
    #[strum(serialize = "semigrandmol")]
    SemiGrandMolecules,
    #[strum(serialize = "gcinsertatom")]
    InsertAtom,
    #[strum(serialize = "gcinsertmol")]
    InsertMolecule,
    #[strum(serialize = "vector")]
    VolumeVector,
    #[strum(serialize = "ortho")]
    VolumeOrtho,
    #[strum(serialize = "cubic")]
    VolumeCubic,
}

/// The three families of moves, which differ in header and mover shape
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum MoveFamily {
    /// Canonical displacement/rotation/swap moves
    Plain,
    /// Insertion/deletion moves with activities
    GrandCanonical,
    /// Cell volume moves (no movers)
    Volume,
}

impl MoveKind {
    pub fn family(&self) -> MoveFamily {
        match self {
            Self::InsertAtom | Self::InsertMolecule => MoveFamily::GrandCanonical,
            Self::VolumeVector | Self::VolumeOrtho | Self::VolumeCubic => MoveFamily::Volume,
            _ => MoveFamily::Plain,
        }
    }

    /// Kinds that are recognised but not implemented
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::SemiWidomAtoms | Self::SemiGrandAtoms | Self::SemiGrandMolecules)
    }
}

/// What follows `move`: a concrete kind or the volume sub-language
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
enum MoveKey {
    Kind(MoveKind),
    Volume,
}

/// Word after `move`, evaluated top to bottom
const MOVE_KEYS: &[(KeyMatch, MoveKey)] = &[
    (KeyMatch::Prefix("atom"), MoveKey::Kind(MoveKind::Atom)),
    (KeyMatch::Prefix("molecu"), MoveKey::Kind(MoveKind::Molecule)),
    (KeyMatch::Prefix("rotatemol"), MoveKey::Kind(MoveKind::RotateMolecule)),
    (KeyMatch::Exact("swapatoms"), MoveKey::Kind(MoveKind::SwapAtoms)),
    (KeyMatch::Exact("swapmols"), MoveKey::Kind(MoveKind::SwapMolecules)),
    (KeyMatch::Exact("gcinsertatom"), MoveKey::Kind(MoveKind::InsertAtom)),
    (KeyMatch::Exact("gcinsertmol"), MoveKey::Kind(MoveKind::InsertMolecule)),
    (KeyMatch::Exact("semiwidomatoms"), MoveKey::Kind(MoveKind::SemiWidomAtoms)),
    (KeyMatch::Exact("semigrandatoms"), MoveKey::Kind(MoveKind::SemiGrandAtoms)),
    (KeyMatch::Exact("semigrandmol"), MoveKey::Kind(MoveKind::SemiGrandMolecules)),
    (KeyMatch::Exact("volume"), MoveKey::Volume),
];

/// Word after `move volume`
const VOLUME_KEYS: &[(KeyMatch, MoveKind)] = &[
    (KeyMatch::Exact("vector"), MoveKind::VolumeVector),
    (KeyMatch::Exact("ortho"), MoveKind::VolumeOrtho),
    (KeyMatch::Exact("cubic"), MoveKind::VolumeCubic),
];

/// Header line of a plain or grand-canonical move
#[derive(Clone,Debug,PartialEq)]
pub struct MoveHeader {
    pub key: String,
    pub count: usize,
    pub probability: i64,
    pub min_distance: Option<f64>,
}

/// Plain MC move: probability plus movers
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct McMove<M> {
    /// Percentage probability of attempting this move per step
    pub probability: i64,
    pub movers: Vec<M>,
}

/// Grand-canonical move: additionally a minimum insertion distance
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct GcMove<M> {
    pub probability: i64,
    pub min_distance: f64,
    pub movers: Vec<M>,
}

/// Volume move with an optional one or two word sampling descriptor
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct VolumeMove {
    pub probability: i64,
    pub sampling: Option<String>,
}

/// A move statement of the main block
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum Move {
    Atom(McMove<AtomId>),
    Molecule(McMove<MoleculeId>),
    RotateMolecule(McMove<MoleculeId>),
    SwapAtoms(McMove<AtomSwap>),
    SwapMolecules(McMove<MoleculeSwap>),
    InsertAtom(GcMove<GcAtom>),
    InsertMolecule(GcMove<GcMolecule>),
    VolumeVector(VolumeMove),
    VolumeOrtho(VolumeMove),
    VolumeCubic(VolumeMove),
}

impl Move {
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::Atom(_) => MoveKind::Atom,
            Move::Molecule(_) => MoveKind::Molecule,
            Move::RotateMolecule(_) => MoveKind::RotateMolecule,
            Move::SwapAtoms(_) => MoveKind::SwapAtoms,
            Move::SwapMolecules(_) => MoveKind::SwapMolecules,
            Move::InsertAtom(_) => MoveKind::InsertAtom,
            Move::InsertMolecule(_) => MoveKind::InsertMolecule,
            Move::VolumeVector(_) => MoveKind::VolumeVector,
            Move::VolumeOrtho(_) => MoveKind::VolumeOrtho,
            Move::VolumeCubic(_) => MoveKind::VolumeCubic,
        }
    }

    pub fn family(&self) -> MoveFamily {
        self.kind().family()
    }

    pub fn probability(&self) -> i64 {
        match self {
            Move::Atom(m) => m.probability,
            Move::Molecule(m) | Move::RotateMolecule(m) => m.probability,
            Move::SwapAtoms(m) => m.probability,
            Move::SwapMolecules(m) => m.probability,
            Move::InsertAtom(m) => m.probability,
            Move::InsertMolecule(m) => m.probability,
            Move::VolumeVector(m) | Move::VolumeOrtho(m) | Move::VolumeCubic(m) => m.probability,
        }
    }

    /// Number of mover lines (zero for volume moves)
    pub fn mover_count(&self) -> usize {
        match self {
            Move::Atom(m) => m.movers.len(),
            Move::Molecule(m) | Move::RotateMolecule(m) => m.movers.len(),
            Move::SwapAtoms(m) => m.movers.len(),
            Move::SwapMolecules(m) => m.movers.len(),
            Move::InsertAtom(m) => m.movers.len(),
            Move::InsertMolecule(m) => m.movers.len(),
            Move::VolumeVector(_) | Move::VolumeOrtho(_) | Move::VolumeCubic(_) => 0,
        }
    }

    /// Species name and activity of each grand-canonical mover
    pub fn activities(&self) -> Vec<(String, f64)> {
        fn collect<M: ActivityRecord>(movers: &[M]) -> Vec<(String, f64)> {
            movers.iter().map(|m| (m.species_name(), m.activity())).collect()
        }
        match self {
            Move::InsertAtom(m) => collect(&m.movers),
            Move::InsertMolecule(m) => collect(&m.movers),
            _ => vec![],
        }
    }

    /// Every species referenced by the movers
    pub fn species(&self) -> Vec<SpeciesRef<'_>> {
        fn collect<M: MoverRecord>(movers: &[M]) -> Vec<SpeciesRef<'_>> {
            movers.iter().flat_map(|m| m.species()).collect()
        }
        match self {
            Move::Atom(m) => collect(&m.movers),
            Move::Molecule(m) | Move::RotateMolecule(m) => collect(&m.movers),
            Move::SwapAtoms(m) => collect(&m.movers),
            Move::SwapMolecules(m) => collect(&m.movers),
            Move::InsertAtom(m) => collect(&m.movers),
            Move::InsertMolecule(m) => collect(&m.movers),
            Move::VolumeVector(_) | Move::VolumeOrtho(_) | Move::VolumeCubic(_) => vec![],
        }
    }

    /// Parse a move statement and the mover lines it owns
    pub fn parse(cursor: Cursor<'_>) -> Result<(Move, Cursor<'_>)> {
        let (line, rest) = cursor.next().ok_or_else(|| ControlError::MalformedMove {
            reason: "expected a move statement".into(),
            at: cursor.end_of_input(),
        })?;
        let lower = line.lowercase();
        let tokens: Vec<&str> = lower.split(' ').collect();
        if tokens[0] != "move" || tokens.len() < 2 {
            return Err(ControlError::MalformedMove {
                reason: "expected 'move <key> ...'".into(),
                at: line.clone(),
            });
        }
        let key = lookup(MOVE_KEYS, tokens[1])
            .ok_or_else(|| ControlError::UnrecognizedMove { at: line.clone() })?;
        let kind = match key {
            MoveKey::Volume => {
                let subkey = tokens.get(2).copied().unwrap_or("");
                *lookup(VOLUME_KEYS, subkey)
                    .ok_or_else(|| ControlError::UnrecognizedMove { at: line.clone() })?
            }
            MoveKey::Kind(kind) => *kind,
        };
        if !kind.is_supported() {
            return Err(ControlError::UnsupportedVariant {
                variant: format!("move '{}'", kind),
                at: line.clone(),
            });
        }
        tracing::trace!(line = line.number, %kind, "parsing move");

        if kind.family() == MoveFamily::Volume {
            let (_, sampling, probability) = control_parser::volume_move(&lower)
                .map_err(|e| malformed(line, format!(
                    "expected 'move volume <kind> [sampling] <probability>' ({})", e)))?;
            let volume = VolumeMove { probability, sampling };
            let mv = match kind {
                MoveKind::VolumeVector => Move::VolumeVector(volume),
                MoveKind::VolumeOrtho => Move::VolumeOrtho(volume),
                _ => Move::VolumeCubic(volume),
            };
            return Ok((mv, rest));
        }

        let header = control_parser::move_header(&lower)
            .map_err(|e| malformed(line, format!(
                "expected 'move <key> <count> <probability>{}' ({})",
                if kind.family() == MoveFamily::GrandCanonical { " <min-distance>" } else { "" }, e)))?;
        match (kind.family(), header.min_distance) {
            (MoveFamily::Plain, Some(_)) =>
                return Err(malformed(line, "unexpected minimum insertion distance".into())),
            (MoveFamily::GrandCanonical, None) =>
                return Err(malformed(line, "missing minimum insertion distance".into())),
            _ => {}
        }
        let (block, rest) = rest.take(header.count).ok_or_else(|| malformed(line, format!(
            "expected {} mover lines, found {}", header.count, rest.remaining())))?;

        let probability = header.probability;
        let mv = match kind {
            MoveKind::Atom => Move::Atom(McMove { probability, movers: parse_movers(block)? }),
            MoveKind::Molecule => Move::Molecule(McMove { probability, movers: parse_movers(block)? }),
            MoveKind::RotateMolecule =>
                Move::RotateMolecule(McMove { probability, movers: parse_movers(block)? }),
            MoveKind::SwapAtoms => Move::SwapAtoms(McMove { probability, movers: parse_movers(block)? }),
            MoveKind::SwapMolecules =>
                Move::SwapMolecules(McMove { probability, movers: parse_movers(block)? }),
            MoveKind::InsertAtom => Move::InsertAtom(GcMove {
                probability,
                min_distance: header.min_distance.unwrap_or_default(),
                movers: parse_movers(block)?,
            }),
            MoveKind::InsertMolecule => Move::InsertMolecule(GcMove {
                probability,
                min_distance: header.min_distance.unwrap_or_default(),
                movers: parse_movers(block)?,
            }),
            _ => return Err(ControlError::UnrecognizedMove { at: line.clone() }),
        };
        Ok((mv, rest))
    }

    /// Check what `Display` needs to produce re-readable text
    pub(crate) fn check(&self) -> Result<()> {
        fn check_all<M: MoverRecord>(movers: &[M]) -> Result<()> {
            movers.iter().try_for_each(check_record)
        }
        match self {
            Move::Atom(m) => check_all(&m.movers),
            Move::Molecule(m) | Move::RotateMolecule(m) => check_all(&m.movers),
            Move::SwapAtoms(m) => check_all(&m.movers),
            Move::SwapMolecules(m) => check_all(&m.movers),
            Move::InsertAtom(m) => check_all(&m.movers),
            Move::InsertMolecule(m) => check_all(&m.movers),
            Move::VolumeVector(m) | Move::VolumeOrtho(m) | Move::VolumeCubic(m) => {
                if let Some(sampling) = &m.sampling {
                    let words: Vec<&str> = sampling.split_whitespace().collect();
                    if words.is_empty() || words.len() > 2 || words.join(" ") != *sampling {
                        return Err(ControlError::invariant(format!(
                            "volume sampling must be one or two words, got {:?}", sampling)));
                    }
                    for word in words {
                        records::check_token("volume sampling tag", word)?;
                        if control_parser::int(word).is_ok() {
                            return Err(ControlError::invariant(format!(
                                "volume sampling tag {:?} would read as the probability", word)));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn malformed(line: &Line, reason: String) -> ControlError {
    ControlError::MalformedMove { reason, at: line.clone() }
}

fn parse_movers<M: MoverRecord>(block: &[Line]) -> Result<Vec<M>> {
    block.iter()
        .map(|line| M::parse(&line.text).map_err(|reason| malformed(line, reason)))
        .collect()
}

fn write_movers<M: Display>(f: &mut std::fmt::Formatter<'_>, movers: &[M]) -> std::fmt::Result {
    for mover in movers {
        write!(f, "\n{}", mover)?;
    }
    Ok(())
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.kind();
        match self {
            Move::VolumeVector(m) | Move::VolumeOrtho(m) | Move::VolumeCubic(m) => {
                match &m.sampling {
                    Some(sampling) => write!(f, "move volume {} {} {}", kind, sampling, m.probability),
                    None => write!(f, "move volume {} {}", kind, m.probability),
                }
            }
            Move::InsertAtom(m) => {
                write!(f, "move {} {} {} {}", kind, m.movers.len(), m.probability, Real(m.min_distance))?;
                write_movers(f, &m.movers)
            }
            Move::InsertMolecule(m) => {
                write!(f, "move {} {} {} {}", kind, m.movers.len(), m.probability, Real(m.min_distance))?;
                write_movers(f, &m.movers)
            }
            _ => {
                write!(f, "move {} {} {}", kind, self.mover_count(), self.probability())?;
                match self {
                    Move::Atom(m) => write_movers(f, &m.movers),
                    Move::Molecule(m) | Move::RotateMolecule(m) => write_movers(f, &m.movers),
                    Move::SwapAtoms(m) => write_movers(f, &m.movers),
                    Move::SwapMolecules(m) => write_movers(f, &m.movers),
                    _ => Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn lines(text: &str) -> Vec<Line> {
        normalize(text)
    }

    fn parse_one(text: &str) -> Result<Move> {
        let lines = lines(text);
        let (mv, rest) = Move::parse(Cursor::new(&lines))?;
        assert!(rest.is_empty(), "Move left {} lines unconsumed", rest.remaining());
        Ok(mv)
    }

    #[test]
    fn atom_move() {
        let mv = parse_one("move atom 2 50\nNa core\nCl core").expect("Cannot parse atom move");
        assert_eq!(mv, Move::Atom(McMove {
            probability: 50,
            movers: vec![AtomId::new("Na", "core"), AtomId::new("Cl", "core")],
        }));
        assert_eq!(mv.to_string(), "move atom 2 50\nNa core\nCl core");
    }

    #[test]
    fn abbreviations() {
        let mv = parse_one("MOVE atoms 1 10\nAr core").expect("Cannot parse abbreviated atom move");
        assert_eq!(mv.kind(), MoveKind::Atom);
        let mv = parse_one("move molecules 1 20\nwater").expect("Cannot parse molecule move");
        assert_eq!(mv.kind(), MoveKind::Molecule);
        let mv = parse_one("move rotatemolecule 1 20\nwater").expect("Cannot parse rotate move");
        assert_eq!(mv.kind(), MoveKind::RotateMolecule);
        assert_eq!(mv.to_string(), "move rotatemol 1 20\nwater");
    }

    #[test]
    fn mover_count_enforced() {
        let err = parse_one("move atom 2 10\nNa core").unwrap_err();
        assert!(matches!(err, ControlError::MalformedMove { .. }), "Got {:?}", err);
        let err = parse_one("move atom 1 10\nNa").unwrap_err();
        match err {
            ControlError::MalformedMove { at, .. } => assert_eq!(at.text, "Na"),
            other => panic!("Expected MalformedMove but got {:?}", other),
        }
        // Leftover lines belong to the caller
        let lines = lines("move atom 1 10\nNa core\nsteps 10");
        let (mv, rest) = Move::parse(Cursor::new(&lines)).unwrap();
        assert_eq!(mv.mover_count(), 1);
        assert_eq!(rest.peek().map(|l| l.text.as_str()), Some("steps 10"));
    }

    #[test]
    fn swap_moves() {
        let mv = parse_one("move swapatoms 1 5\nNa core K core").expect("Cannot parse atom swap");
        assert_eq!(mv.species().len(), 2);
        let mv = parse_one("move swapmols 1 5\nA B").expect("Cannot parse molecule swap");
        assert_eq!(mv.to_string(), "move swapmols 1 5\nA B");
    }

    #[test]
    fn grand_canonical_moves() {
        let mv = parse_one("move gcinsertatom 1 40 0.7\nAr core 0.02").expect("Cannot parse gc atom");
        assert_eq!(mv.family(), MoveFamily::GrandCanonical);
        assert_eq!(mv.activities(), vec![("Ar core".to_string(), 0.02)]);
        assert_eq!(mv.to_string(), "move gcinsertatom 1 40 0.7\nAr core 0.02");
        let mv = parse_one("move gcinsertmol 2 30 1.0\nco2 0.5\nch4 1e-2").expect("Cannot parse gc molecule");
        assert_eq!(mv.activities().len(), 2);
        let err = parse_one("move gcinsertmol 1 30\nco2 0.5").unwrap_err();
        assert!(matches!(err, ControlError::MalformedMove { .. }), "Missing distance not caught");
        let err = parse_one("move atom 1 30 0.5\nAr core").unwrap_err();
        assert!(matches!(err, ControlError::MalformedMove { .. }), "Extra distance not caught");
    }

    #[test]
    fn volume_moves() {
        let mv = parse_one("move volume cubic linear 5").expect("Cannot parse volume move");
        assert_eq!(mv, Move::VolumeCubic(VolumeMove { probability: 5, sampling: Some("linear".into()) }));
        assert_eq!(mv.to_string(), "move volume cubic linear 5");
        let mv = parse_one("move volume ortho 1").expect("Cannot parse plain volume move");
        assert_eq!(mv.to_string(), "move volume ortho 1");
        assert_eq!(mv.mover_count(), 0);
        let err = parse_one("move volume sphere 1").unwrap_err();
        assert!(matches!(err, ControlError::UnrecognizedMove { .. }), "Got {:?}", err);
    }

    #[test]
    fn unknown_and_unsupported() {
        let err = parse_one("move teleport 1 10\nNa core").unwrap_err();
        assert!(matches!(err, ControlError::UnrecognizedMove { .. }), "Got {:?}", err);
        for key in ["semiwidomatoms", "semigrandatoms", "semigrandmol"] {
            let err = parse_one(&format!("move {} 1 10\nNa core", key)).unwrap_err();
            assert!(matches!(err, ControlError::UnsupportedVariant { .. }),
                "Unsupported {} not reported, got {:?}", key, err);
        }
    }

    #[test]
    fn families() {
        let volume = MoveKind::iter().filter(|k| k.family() == MoveFamily::Volume).count();
        let gc = MoveKind::iter().filter(|k| k.family() == MoveFamily::GrandCanonical).count();
        assert_eq!((volume, gc), (3, 2));
        assert_eq!(MoveKind::iter().filter(|k| !k.is_supported()).count(), 3);
    }

    #[test]
    fn sampling_invariant() {
        let mv = Move::VolumeCubic(VolumeMove { probability: 1, sampling: Some("a b c".into()) });
        assert!(mv.check().is_err(), "Three word sampling not caught");
        let mv = Move::VolumeCubic(VolumeMove { probability: 1, sampling: Some("10".into()) });
        assert!(mv.check().is_err(), "Numeric sampling not caught");
        let mv = Move::VolumeCubic(VolumeMove { probability: 1, sampling: Some("log".into()) });
        assert!(mv.check().is_ok());
    }
}
