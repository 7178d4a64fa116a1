use anyhow::Result;
use std::fmt;

use crate::{
    simulation_error::SimulationError,
    spn_framework::{exportable::Exportable, infoable::Infoable},
    spn_objects::{augmented_net::AugmentedNet, weight_table::WeightTable},
    spn_traits::semantics::TransitionIndex,
};

/// An augmented net together with a firing weight for each of its transitions.
///
/// Weights are relative: they need not sum to one. Once constructed, neither the net nor the weights change.
#[derive(Clone, Debug)]
pub struct StochasticPetriNet {
    pub(crate) net: AugmentedNet,
    pub(crate) weights: Vec<f64>,
}

impl StochasticPetriNet {
    pub fn new(net: AugmentedNet, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != net.get_number_of_transitions() {
            return Err(SimulationError::Configuration(format!(
                "{} weights were given for a net with {} transitions",
                weights.len(),
                net.get_number_of_transitions()
            ))
            .into());
        }
        if let Some(transition) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(SimulationError::Configuration(format!(
                "transition `{}` has weight {}, while weights must be non-negative numbers",
                net.get_net().get_transition_id(transition),
                weights[transition]
            ))
            .into());
        }
        Ok(Self { net, weights })
    }

    pub fn get_net(&self) -> &AugmentedNet {
        &self.net
    }

    pub fn get_weight(&self, transition: TransitionIndex) -> f64 {
        self.weights[transition]
    }

    pub fn get_weights(&self) -> &[f64] {
        &self.weights
    }

    /**
     * The weight of the transition with the given id, if it exists.
     */
    pub fn get_weight_by_id(&self, id: &str) -> Option<f64> {
        self.net
            .get_net()
            .get_transition_index(id)
            .map(|transition| self.weights[transition])
    }

    /**
     * The weights keyed by transition id, in the form that manual weight assignment reads.
     */
    pub fn to_weight_table(&self) -> WeightTable {
        let net = self.net.get_net();
        self.weights
            .iter()
            .enumerate()
            .map(|(transition, weight)| (net.get_transition_id(transition), *weight))
            .collect()
    }
}

impl Exportable for StochasticPetriNet {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for StochasticPetriNet {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        self.net.info(f)?;
        writeln!(f, "Total weight\t\t\t{}", self.weights.iter().sum::<f64>())?;
        writeln!(
            f,
            "Zero-weight transitions\t\t{}",
            self.weights.iter().filter(|w| **w == 0.0).count()
        )?;
        Ok(write!(f, "")?)
    }
}

impl fmt::Display for StochasticPetriNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let net = self.net.get_net();
        writeln!(f, "transition\tlabel\tweight")?;
        for (transition, weight) in self.weights.iter().enumerate() {
            writeln!(
                f,
                "{}\t{}\t{}",
                net.get_transition_id(transition),
                net.get_transition_label_str(transition).unwrap_or("(silent)"),
                weight
            )?;
        }
        write!(f, "")
    }
}
