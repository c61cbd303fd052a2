//! Realistic CONTROL files through the public API

use dlmonte_control::control::*;
use dlmonte_control::parser::*;
use dlmonte_control::{parse, ControlError};

const EXAMPLE_RUN: &str = r#"Example run
use repexch 4 0.5 100
finish use-block
steps 1000
temperature 300.0
move atom 2 50
Na core
Cl core
start simulation
"#;

const LENNARD_JONES_NPT: &str = r#"NPT Lennard-Jones fluid   # tutorial 2
use seqmove
use rotquaternion

finish use-block
Temperature 1.4
pressure  0.1    # reduced units
steps 100000
equilibration 10000
print 1000
stack 1000
ewald precision 1d-6
nbrlist auto
maxnonbondnbrs 256
seeds 1 2 3 4
sample coords 10000
sample vol 100 0.05
move atom 1 100
LJ core
move volume cubic linear 1
start simulation
"#;

const GCMC_FED: &str = r#"GCMC with Wang-Landau
use fed generic 1
  fed method wl 1.0 0.5 1000 3 0 10 0.5
  fed order param com2 100 0.0 20.0
    com1 molecules 1
    com2 molecules 2 atoms 1 2
    com sampling correction 1
  fed order param done
fed done
use gaspressure
finish
temperature 273.0
steps 500000
move gcinsertatom 1 40 0.7
Ar core 0.02
move gcinsertmol 1 40 1.0
co2 0.5
move molecule 1 20
co2
start
"#;

const PHASE_SWITCH: &str = r#"Phase switch
use fed ps 1
  switchfreq 10
  initactive 1
  datafreq 100
  meltcheck
  meltthresh 10
  meltfreq 1000
ps done
fed method ee 1.0 1.0 1000000
fed order param psmc 2000 -1000 1000
fed done
finish
temperature 1.0
move atom 1 100
Ar core
start
"#;

fn round_trip(text: &str) -> ControlDocument {
    let doc = parse(text).expect("Cannot parse fixture");
    let written = doc.serialize().expect("Cannot serialize fixture");
    let reread = parse(&written).expect(&format!("Cannot re-read serialized fixture:\n{}", written));
    assert_eq!(reread, doc, "Round trip changed the document:\n{}", written);
    assert_eq!(reread.serialize().unwrap(), written, "Serialization is not stable");
    doc
}

#[test]
fn example_run() {
    let doc = round_trip(EXAMPLE_RUN);
    assert_eq!(doc.title, "Example run");
    let use_keys: Vec<_> = doc.use_block.statements.keys().copied().collect();
    assert_eq!(use_keys, vec![UseKey::ReplicaExchange]);
    assert_eq!(doc.use_block.replica_exchange(), Some(&ReplicaExchange { nrep: 4, deltat: 0.5, nstep: 100 }));
    assert!(doc.use_block.fed().is_none());
    let keys: Vec<_> = doc.main_block.statements.keys().cloned().collect();
    assert_eq!(keys, vec!["steps", "temperature"]);
    assert_eq!(doc.main_block.statement("steps"), Some(&StatementValue::Int(1000)));
    assert_eq!(doc.main_block.statement("temperature"), Some(&StatementValue::Float(300.0)));
    assert_eq!(doc.main_block.moves(), &[Move::Atom(McMove {
        probability: 50,
        movers: vec![AtomId::new("Na", "core"), AtomId::new("Cl", "core")],
    })]);
    assert_eq!(doc.ensemble(), Ensemble::Nvt);
    assert_eq!(doc.serialize().unwrap(), EXAMPLE_RUN.trim_end());
}

#[test]
fn npt_fixture() {
    let doc = round_trip(LENNARD_JONES_NPT);
    assert_eq!(doc.title, "NPT Lennard-Jones fluid");
    assert_eq!(doc.ensemble(), Ensemble::Npt);
    assert_eq!(doc.ensemble_parameters().unwrap(), EnsembleParameters::Npt { temperature: 1.4, pressure: 0.1 });
    assert_eq!(doc.main_block.statement(EWALD_PRECISION_KEY), Some(&StatementValue::Float(1e-6)));
    assert_eq!(doc.main_block.statement("nbrlist"), Some(&StatementValue::NeighbourList(NeighbourList::Auto)));
    assert_eq!(doc.main_block.samples().get(&SampleKind::Volume), Some(&Sample::Volume { mfreq: 100, deltav: 0.05 }));
    // Mover names keep their case
    assert_eq!(doc.main_block.moves()[0].species()[0].to_string(), "LJ core");
}

#[test]
fn gcmc_fed_fixture() {
    let doc = round_trip(GCMC_FED);
    assert_eq!(doc.ensemble(), Ensemble::MuVt);
    assert_eq!(doc.activities(), vec![("Ar core".to_string(), 0.02), ("co2".to_string(), 0.5)]);
    let fed = doc.use_block.fed().expect("Fed block missing");
    assert_eq!(fed.flavour, FedFlavour::Generic { nfreq: Some(1) });
    assert_eq!(fed.method.as_ref().and_then(|m| m.smoother()),
        Some(&BiasSmoother { n_itr: 3, i_beg: 0, i_end: 10, omega: 0.5 }));
    match &fed.order_parameter {
        Some(FedOrderParameter::CenterOfMass2(com)) => {
            assert_eq!(com.com2, "com2 molecules 2 atoms 1 2");
            assert_eq!(com.sampling_correction, Some(1));
        }
        other => panic!("Expected com2 order parameter but got {:?}", other),
    }
    // Use statements after the fed block are kept
    assert!(doc.use_block.contains(UseKey::GasPressure));
    let catalog = SpeciesSet::new().with_atom("Ar", "core").with_molecule("co2");
    assert!(doc.check_species(&catalog).is_ok());
}

#[test]
fn phase_switch_fixture() {
    let doc = round_trip(PHASE_SWITCH);
    let fed = doc.use_block.fed().expect("Fed block missing");
    match &fed.flavour {
        FedFlavour::PhaseSwitch(ps) => {
            assert_eq!(ps.settings.len(), 6);
            assert_eq!(ps.settings.get(&PhaseSwitchKey::MeltThreshold), Some(&PhaseSwitchValue::Real(10.0)));
        }
        other => panic!("Expected phase switch but got {:?}", other),
    }
    assert_eq!(fed.order_parameter.as_ref().map(|op| op.name()).as_deref(), Some("psmc"));
}

#[test]
fn fed_optionality() {
    let doc = parse("T\nuse fed gen\nfed done\nfinish\nstart").unwrap();
    let fed = doc.use_block.fed().expect("Fed block missing");
    assert!(fed.method.is_none() && fed.order_parameter.is_none());
}

#[test]
fn sample_rdf() {
    let doc = parse("T\nfinish\nsample rdf 200 12.0 500\nstart").unwrap();
    assert_eq!(doc.main_block.samples().get(&SampleKind::Rdfs),
        Some(&Sample::Rdfs { ngrid: 200, rcut: 12.0, nfreq: 500 }));
    let text = doc.serialize().unwrap();
    assert!(text.contains("\nsample rdfs 200 12.0 500\n"), "Unexpected output:\n{}", text);
}

#[test]
fn move_arity() {
    let err = parse("T\nfinish\nmove atom 2 10\nNa core\nstart").unwrap_err();
    assert!(matches!(err, ControlError::MalformedMove { .. }), "Got {:?}", err);
    let doc = parse("T\nfinish\nmove atom 2 10\nNa core\nCl core\nstart").unwrap();
    assert_eq!(doc.main_block.moves()[0].mover_count(), 2);
}

#[test]
fn error_kinds_carry_lines() {
    let test_set: Vec<(&str, fn(&ControlError) -> bool, usize)> = vec![
        ("T\nuse bogus\nfinish\nstart", |e| matches!(e, ControlError::UnknownUseKey { .. }), 2),
        ("T\nuse fed generic\nfed bogus\nfed done\nfinish\nstart",
            |e| matches!(e, ControlError::UnrecognizedFedKeyword { .. }), 3),
        ("T\nuse fed generic\nfed method wl 1.0\nfed done\nfinish\nstart",
            |e| matches!(e, ControlError::MalformedFed { .. }), 3),
        ("T\nuse fed generic\nfed method us 0 1 2\nfed method us 0 1 2\nfed done\nfinish\nstart",
            |e| matches!(e, ControlError::DuplicateSection { .. }), 4),
        ("T\nfinish\nmove bogus 1 10\nNa core\nstart", |e| matches!(e, ControlError::UnrecognizedMove { .. }), 3),
        ("T\nfinish\nmove atom 1 ten\nNa core\nstart", |e| matches!(e, ControlError::MalformedMove { .. }), 3),
        ("T\nfinish\nsteps many\nstart", |e| matches!(e, ControlError::MalformedStatement { .. }), 3),
        ("T\nfinish\nmove semigrandatoms 1 10\nNa core\nstart",
            |e| matches!(e, ControlError::UnsupportedVariant { .. }), 3),
        ("T\nuse fed generic\nfed order param density 1 0 1\nfed done\nfinish\nstart",
            |e| matches!(e, ControlError::UnsupportedVariant { .. }), 3),
        ("T\nsteps 10\nfinish\nstart", |e| matches!(e, ControlError::UnknownUseKey { .. }), 2),
        ("T\nuse fed generic\nfinish\nfed done\nfinish\nstart",
            |e| matches!(e, ControlError::MalformedDocument { .. }), 3),
    ];
    for (text, is_expected, line) in test_set {
        let err = parse(text).unwrap_err();
        assert!(is_expected(&err), "Wrong error for {:?}: {:?}", text, err);
        assert_eq!(err.line().map(|l| l.number), Some(line), "Wrong line for {:?}: {}", text, err);
    }
}

#[test]
fn interaction_records() {
    let lj: Interaction = "LJ 0.25 3.4".parse().expect("Cannot parse lj record");
    assert_eq!(lj.kind(), InteractionKind::LennardJones);
    assert_eq!(lj.to_string(), "lj 0.25 3.4");
    let err = "morse 1 2 3".parse::<Interaction>().unwrap_err();
    assert!(matches!(err, ControlError::UnsupportedVariant { .. }), "Got {:?}", err);
}

#[test]
fn hand_built_document() {
    let mut main_block = MainBlock::default();
    main_block.set_statement("temperature", StatementValue::Float(300.0));
    main_block.add_move(Move::InsertMolecule(GcMove {
        probability: 100,
        min_distance: 1.0,
        movers: vec![GcMolecule { molecule: MoleculeId::new("co2"), activity: 0.1 }],
    }));
    let doc = ControlDocument::new("Built", UseBlock::default(), main_block);
    let text = doc.serialize().expect("Cannot serialize hand-built document");
    assert_eq!(text, "Built\nfinish use-block\ntemperature 300.0\nmove gcinsertmol 1 100 1.0\nco2 0.1\nstart simulation");
    assert_eq!(parse(&text).unwrap(), doc);

    let mut broken = doc.clone();
    broken.main_block.add_move(Move::Molecule(McMove { probability: 1, movers: vec![MoleculeId::new("two words")] }));
    assert!(matches!(broken.serialize(), Err(ControlError::InvariantViolation { .. })),
        "Multi-word molecule name not caught");
    // Display writes without checking
    assert!(broken.to_string().ends_with("two words\nstart simulation"));

    let mut broken = doc.clone();
    broken.main_block.set_statement("steps", StatementValue::Float(1.5));
    assert!(matches!(broken.serialize(), Err(ControlError::InvariantViolation { .. })),
        "Real-valued steps not caught");
}

#[test]
fn json_form_keeps_order() {
    let doc = parse(LENNARD_JONES_NPT).unwrap();
    let json = serde_json::to_string(&doc).expect("Cannot write JSON");
    let back: ControlDocument = serde_json::from_str(&json).expect("Cannot read JSON");
    assert_eq!(back.serialize().unwrap(), doc.serialize().unwrap());
}
