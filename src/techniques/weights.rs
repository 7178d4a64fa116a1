use anyhow::Result;
use itertools::Itertools;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    simulation_error::SimulationError,
    spn_objects::{
        alignments::Alignments, augmented_net::AugmentedNet, event_log::EventLog,
        stochastic_petri_net::StochasticPetriNet, weight_table::WeightTable,
    },
    techniques::{
        frequency_weights::FrequencyWeights, manual_weights::ManualWeights,
        uniform_weights::UniformWeights,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum WeightMode {
    #[strum(to_string = "uniform", serialize = "equal")]
    Uniform,
    #[strum(to_string = "frequency")]
    Frequency,
    #[strum(to_string = "manual", serialize = "manually")]
    Manual,
}

impl WeightMode {
    pub fn parse(value: &str) -> Result<Self> {
        WeightMode::from_str(value.trim()).map_err(|_| {
            SimulationError::Configuration(format!(
                "unsupported weight mode `{}`; expected one of {}",
                value,
                WeightMode::iter().join(", ")
            ))
            .into()
        })
    }
}

/// Selects how firing weights are obtained, together with the inputs that mode needs.
#[derive(Clone, Debug)]
pub struct WeightConfiguration {
    pub mode: WeightMode,
    pub reference_log: Option<EventLog>,
    pub alignments: Option<Alignments>,
    pub manual_weights: Option<WeightTable>,
}

impl WeightConfiguration {
    pub fn uniform() -> Self {
        Self {
            mode: WeightMode::Uniform,
            reference_log: None,
            alignments: None,
            manual_weights: None,
        }
    }

    pub fn frequency(reference_log: EventLog, alignments: Alignments) -> Self {
        Self {
            mode: WeightMode::Frequency,
            reference_log: Some(reference_log),
            alignments: Some(alignments),
            manual_weights: None,
        }
    }

    pub fn manual(manual_weights: WeightTable) -> Self {
        Self {
            mode: WeightMode::Manual,
            reference_log: None,
            alignments: None,
            manual_weights: Some(manual_weights),
        }
    }
}

pub trait AssignWeights {
    fn assign_weights(&self, configuration: &WeightConfiguration) -> Result<StochasticPetriNet>;
}

impl AssignWeights for AugmentedNet {
    fn assign_weights(&self, configuration: &WeightConfiguration) -> Result<StochasticPetriNet> {
        match configuration.mode {
            WeightMode::Uniform => Ok(self.assign_uniform_weights()),
            WeightMode::Frequency => {
                match (&configuration.reference_log, &configuration.alignments) {
                    (Some(log), Some(alignments)) => self.assign_frequency_weights(log, alignments),
                    (None, _) => Err(SimulationError::Configuration(
                        "frequency weights require a reference log".to_string(),
                    )
                    .into()),
                    (_, None) => Err(SimulationError::Configuration(
                        "frequency weights require the alignments of the reference log".to_string(),
                    )
                    .into()),
                }
            }
            WeightMode::Manual => match &configuration.manual_weights {
                Some(table) => self.assign_manual_weights(table),
                None => Err(SimulationError::Configuration(
                    "manual weights require a weight for every transition".to_string(),
                )
                .into()),
            },
        }
    }
}
