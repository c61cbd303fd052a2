//! Leaf grammars for single CONTROL lines
//!
//! Rules operate on one normalized line (single spaces between tokens).
//! Keyword rules expect lower-case input; mover records keep their case.

use super::*;

peg::parser!{
    pub(crate) grammar control_parser() for str {

        // == Numeric literals ==

        /// Signed integer
        pub rule int() -> i64
            = s:$(['+'|'-']? ['0'..='9']+)
            {? s.parse::<i64>().or(Err("integer in range")) }

        /// Non-negative count
        pub rule count() -> usize
            = s:$("+"? ['0'..='9']+)
            {? s.parse::<usize>().or(Err("count in range")) }

        /// Real number (integers and Fortran `d` exponents are accepted)
        pub rule real() -> f64
            = ['n'|'N'] ['a'|'A'] ['n'|'N'] { f64::NAN }
            / sign:$(['+'|'-']?) ['i'|'I'] ['n'|'N'] ['f'|'F'] {
                if sign == "-" { f64::NEG_INFINITY } else { f64::INFINITY }
            }
            / s:$(['+'|'-']? (['0'..='9']+ ("." ['0'..='9']*)? / "." ['0'..='9']+)
                    (['e'|'E'|'d'|'D'] ['+'|'-']? ['0'..='9']+)?)
            {?
                s.replace(|c| c == 'd' || c == 'D', "e")
                    .parse::<f64>()
                    .or(Err("real number"))
            }

        // == Mover records ==

        /// `name type`, e.g. `Na core`
        pub rule atom_id() -> AtomId
            = name:word() __ kind:word() { AtomId::new(name, kind) }

        /// `name`
        pub rule molecule_id() -> MoleculeId
            = name:word() { MoleculeId::new(name) }

        /// `name1 type1 name2 type2`
        pub rule atom_swap() -> AtomSwap
            = first:atom_id() __ second:atom_id() { AtomSwap { first, second } }

        /// `name1 name2`
        pub rule molecule_swap() -> MoleculeSwap
            = first:molecule_id() __ second:molecule_id() { MoleculeSwap { first, second } }

        /// `name type activity`
        pub rule gc_atom() -> GcAtom
            = atom:atom_id() __ activity:real() { GcAtom { atom, activity } }

        /// `name activity`
        pub rule gc_molecule() -> GcMolecule
            = molecule:molecule_id() __ activity:real() { GcMolecule { molecule, activity } }

        // == Potential records ==

        pub rule interaction() -> Interaction
            = "lj" __ epsilon:real() __ sigma:real() {
                Interaction::LennardJones { epsilon, sigma }
            }
            / "nm" __ e0:real() __ n:int() __ m:int() __ r0:real() {
                Interaction::NM { e0, n, m, r0 }
            }
            / "12-6" __ a:real() __ b:real() {
                Interaction::TwelveSix { a, b }
            }
            / "buck" __ a:real() __ rho:real() __ c:real() {
                Interaction::Buckingham { a, rho, c }
            }
            / "hs" __ sigma:real() {
                Interaction::HardSphere { sigma }
            }

        // == Moves ==

        /// `move <key> <count> <probability> [<min-distance>]`
        pub rule move_header() -> MoveHeader
            = "move" __ key:word() __ count:count() __ probability:int()
                min_distance:(__ d:real() {d})?
            {
                MoveHeader { key: key.to_string(), count, probability, min_distance }
            }

        /// `move volume <kind> [tag [tag]] <probability>`
        pub rule volume_move() -> (&'input str, Option<String>, i64)
            = "move" __ "volume" __ kind:word() __ tags:(t:tag() __ {t})*<0,2> probability:int()
            {
                let sampling = if tags.is_empty() { None } else { Some(tags.join(" ")) };
                (kind, sampling, probability)
            }

        // == Use block ==

        /// `use fed <flavour> [nfreq]`
        pub rule use_fed() -> (&'input str, Option<i64>)
            = "use" __ "fed" __ flavour:word() nfreq:(__ n:int() {n})? { (flavour, nfreq) }

        /// Payload of `use repexch`
        pub rule replica_exchange() -> ReplicaExchange
            = nrep:int() __ deltat:real() __ nstep:int() { ReplicaExchange { nrep, deltat, nstep } }

        // == FED ==

        /// `n_itr i_beg i_end omega`
        pub rule bias_smoother() -> BiasSmoother
            = n_itr:int() __ i_beg:int() __ i_end:int() __ omega:real() {
                BiasSmoother { n_itr, i_beg, i_end, omega }
            }

        /// `fed method <tag> ...`
        pub rule fed_method() -> FedMethod
            = "fed" __ "method" __ method:(
                "us" __ x0:real() __ kf:real() __ n_upd:int() {
                    FedMethod::UmbrellaSampling(UmbrellaSampling { x0, kf, n_upd })
                }
                / "wl" __ delta0:real() __ c_upd:real() __ n_upd:int() smooth:smoother()? {
                    FedMethod::WangLandau(WangLandau { delta0, c_upd, n_upd, smooth })
                }
                / "ee" __ eta0:real() __ c_upd:real() __ n_upd:int() smooth:smoother()? {
                    FedMethod::ExpandedEnsemble(ExpandedEnsemble { eta0, c_upd, n_upd, smooth })
                }
                / "tm" __ nout:int() __ n_upd:int() mode:(__ m:tm_mode() {m})? {
                    FedMethod::TransitionMatrix(TransitionMatrix {
                        nout, n_upd, mode: mode.unwrap_or_default()
                    })
                }
            ) { method }

        rule smoother() -> BiasSmoother
            = __ s:bias_smoother() { s }

        rule tm_mode() -> TransitionMatrixMode
            = "new" { TransitionMatrixMode::New }
            / "resume" { TransitionMatrixMode::Resume }

        /// `fed order [param[eter]] <name> ngrid xmin xmax [npow]`
        pub rule order_header() -> OrderHeader
            = "fed" __ "order" (__ "param" ['a'..='z']*)? __ name:word() __
                ngrid:int() __ xmin:real() __ xmax:real() npow:(__ n:int() {n})?
            {
                OrderHeader { name: name.to_string(), ngrid, xmin, xmax, npow }
            }

        /// `com sampling correction <n>`
        pub rule sampling_correction() -> i64
            = "com" __ "sampling" __ "correction" __ n:int() { n }

        // == Main block payloads ==

        /// `alpha kmax1 kmax2 kmax3`
        pub rule ewald_sum() -> EwaldSum
            = alpha:real() __ kmax1:int() __ kmax2:int() __ kmax3:int() {
                EwaldSum { alpha, kmax1, kmax2, kmax3 }
            }

        /// Four integer seeds
        pub rule seeds() -> Seeds
            = a:int() __ b:int() __ c:int() __ d:int() { Seeds([a, b, c, d]) }

        // == General syntax elements ==

        /// Any run of non-space characters
        rule word() -> &'input str
            = $((!" " [_])+)

        /// A word that is not a number (volume sampling tags)
        rule tag() -> &'input str
            = !(int() (" " / ![_])) t:word() { t }

        rule __() -> ()
            = quiet!{(" "+) {}}
    }
}
