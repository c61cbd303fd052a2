//! Statistical ensemble implied by the move set

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

use crate::error::{ControlError, Result};
use crate::parser::{ControlDocument, MoveFamily, PRESSURE_KEY};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,EnumIter,StrumDisplay,Serialize,Deserialize)]
pub enum Ensemble {
    /// Canonical
    #[strum(serialize = "NVT")]
    Nvt,
    /// Isothermal-isobaric (volume moves)
    #[strum(serialize = "NPT")]
    Npt,
    /// Grand canonical (insertion moves)
    #[strum(serialize = "muVT")]
    MuVt,
}

/// The thermodynamic parameters that define a run's ensemble
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum EnsembleParameters {
    Nvt { temperature: f64 },
    Npt { temperature: f64, pressure: f64 },
    /// Activities of the movers of the first grand-canonical move
    MuVt { temperature: f64, activities: Vec<(String, f64)> },
}

impl EnsembleParameters {
    pub fn ensemble(&self) -> Ensemble {
        match self {
            EnsembleParameters::Nvt { .. } => Ensemble::Nvt,
            EnsembleParameters::Npt { .. } => Ensemble::Npt,
            EnsembleParameters::MuVt { .. } => Ensemble::MuVt,
        }
    }

    pub fn temperature(&self) -> f64 {
        match self {
            EnsembleParameters::Nvt { temperature }
            | EnsembleParameters::Npt { temperature, .. }
            | EnsembleParameters::MuVt { temperature, .. } => *temperature,
        }
    }
}

impl ControlDocument {
    /// Classify the run: volume moves make it NPT, insertion moves muVT.
    /// If both are present the grand-canonical classification wins.
    pub fn ensemble(&self) -> Ensemble {
        let has = |family: MoveFamily| self.main_block.moves.iter().any(|mv| mv.family() == family);
        let volume = has(MoveFamily::Volume);
        let grand_canonical = has(MoveFamily::GrandCanonical);
        if volume && grand_canonical {
            tracing::warn!("both volume and grand-canonical moves present, classifying as muVT");
        }
        if grand_canonical {
            Ensemble::MuVt
        }
        else if volume {
            Ensemble::Npt
        }
        else {
            Ensemble::Nvt
        }
    }

    /// Temperature plus the parameter the ensemble adds to it
    pub fn ensemble_parameters(&self) -> Result<EnsembleParameters> {
        let main = &self.main_block;
        let temperature = main.temperature()
            .ok_or_else(|| ControlError::MissingStatement { keyword: "temperature".into() })?;
        Ok(match self.ensemble() {
            Ensemble::Nvt => EnsembleParameters::Nvt { temperature },
            Ensemble::Npt => {
                let pressure = main.pressure()
                    .ok_or_else(|| ControlError::MissingStatement { keyword: PRESSURE_KEY.into() })?;
                EnsembleParameters::Npt { temperature, pressure }
            }
            Ensemble::MuVt => {
                let activities = main.moves.iter()
                    .find(|mv| mv.family() == MoveFamily::GrandCanonical)
                    .map(|mv| mv.activities())
                    .unwrap_or_default();
                EnsembleParameters::MuVt { temperature, activities }
            }
        })
    }
}
