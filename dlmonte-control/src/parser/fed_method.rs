//! `fed method ...`: the bias update algorithm

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::error::{ControlError, Result};
use crate::utils::Real;

use super::{control_parser, Line};

/// Optional smoothing of the bias between updates, shared by WL and EE
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct BiasSmoother {
    /// Number of smoothing iterations (1-5)
    pub n_itr: i64,
    /// First grid point to smooth
    pub i_beg: i64,
    /// Last grid point to smooth
    pub i_end: i64,
    /// Weight of the central bin
    pub omega: f64,
}

impl Display for BiasSmoother {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.n_itr, self.i_beg, self.i_end, Real(self.omega))
    }
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct UmbrellaSampling {
    /// Centre of the harmonic bias
    pub x0: f64,
    /// Spring constant
    pub kf: f64,
    pub n_upd: i64,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct WangLandau {
    /// Initial bias increment
    pub delta0: f64,
    /// Scaling of the increment at each update
    pub c_upd: f64,
    pub n_upd: i64,
    pub smooth: Option<BiasSmoother>,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct ExpandedEnsemble {
    /// Initial damping
    pub eta0: f64,
    pub c_upd: f64,
    pub n_upd: i64,
    pub smooth: Option<BiasSmoother>,
}

/// Whether a transition matrix run starts afresh or continues from disk
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,StrumDisplay,EnumString,Serialize,Deserialize)]
pub enum TransitionMatrixMode {
    #[default]
    #[strum(serialize = "new")]
    New,
    #[strum(serialize = "resume")]
    Resume,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct TransitionMatrix {
    /// Output frequency
    pub nout: i64,
    pub n_upd: i64,
    pub mode: TransitionMatrixMode,
}

/// Bias update algorithm
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum FedMethod {
    UmbrellaSampling(UmbrellaSampling),
    WangLandau(WangLandau),
    ExpandedEnsemble(ExpandedEnsemble),
    TransitionMatrix(TransitionMatrix),
}

/// Tags accepted after `fed method`
pub const FED_METHOD_TAGS: [&str; 4] = ["us", "wl", "ee", "tm"];

impl FedMethod {
    pub fn tag(&self) -> &'static str {
        match self {
            FedMethod::UmbrellaSampling(_) => "us",
            FedMethod::WangLandau(_) => "wl",
            FedMethod::ExpandedEnsemble(_) => "ee",
            FedMethod::TransitionMatrix(_) => "tm",
        }
    }

    /// The smoother of a WL/EE method, if any
    pub fn smoother(&self) -> Option<&BiasSmoother> {
        match self {
            FedMethod::WangLandau(wl) => wl.smooth.as_ref(),
            FedMethod::ExpandedEnsemble(ee) => ee.smooth.as_ref(),
            _ => None,
        }
    }

    /// Parse a `fed method` line
    pub fn from_line(line: &Line) -> Result<Self> {
        let lower = line.lowercase();
        let tokens: Vec<&str> = lower.split(' ').collect();
        let tag = tokens.get(2).copied().unwrap_or("");
        if !FED_METHOD_TAGS.contains(&tag) {
            return Err(ControlError::UnrecognizedFedKeyword { at: line.clone() });
        }
        control_parser::fed_method(&lower).map_err(|e| ControlError::MalformedFed {
            reason: format!("bad 'fed method {}' line ({})", tag, e),
            at: line.clone(),
        })
    }
}

impl Display for FedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fed method {}", self.tag())?;
        match self {
            FedMethod::UmbrellaSampling(us) =>
                write!(f, " {} {} {}", Real(us.x0), Real(us.kf), us.n_upd)?,
            FedMethod::WangLandau(wl) =>
                write!(f, " {} {} {}", Real(wl.delta0), Real(wl.c_upd), wl.n_upd)?,
            FedMethod::ExpandedEnsemble(ee) =>
                write!(f, " {} {} {}", Real(ee.eta0), Real(ee.c_upd), ee.n_upd)?,
            FedMethod::TransitionMatrix(tm) =>
                write!(f, " {} {} {}", tm.nout, tm.n_upd, tm.mode)?,
        }
        if let Some(smooth) = self.smoother() {
            write!(f, " {}", smooth)?;
        }
        Ok(())
    }
}
