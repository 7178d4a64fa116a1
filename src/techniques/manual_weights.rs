use anyhow::Result;
use itertools::Itertools;

use crate::{
    simulation_error::SimulationError,
    spn_objects::{
        augmented_net::AugmentedNet, stochastic_petri_net::StochasticPetriNet,
        weight_table::WeightTable,
    },
};

pub trait ManualWeights {
    /**
     * Takes the weight of each transition from the table. A transition is looked up by its id; the sentinel
     * transitions may also be given by their labels `<START>` and `<END>`.
     */
    fn assign_manual_weights(&self, table: &WeightTable) -> Result<StochasticPetriNet>;
}

impl ManualWeights for AugmentedNet {
    fn assign_manual_weights(&self, table: &WeightTable) -> Result<StochasticPetriNet> {
        let net = self.get_net();

        let mut weights = Vec::with_capacity(net.get_number_of_transitions());
        let mut missing = vec![];
        for transition in 0..net.get_number_of_transitions() {
            let id = net.get_transition_id(transition);
            let weight = table.get(id).or_else(|| {
                if self.is_sentinel(transition) {
                    net.get_transition_label_str(transition)
                        .and_then(|label| table.get(label))
                } else {
                    None
                }
            });

            match weight {
                Some(weight) if weight.is_finite() && weight >= 0.0 => weights.push(weight),
                Some(weight) => {
                    return Err(SimulationError::Configuration(format!(
                        "transition `{}` has weight {}, while weights must be non-negative numbers",
                        id, weight
                    ))
                    .into());
                }
                None => missing.push(id),
            }
        }

        if !missing.is_empty() {
            return Err(SimulationError::Configuration(format!(
                "no weight was given for transition(s) {}",
                missing.iter().map(|id| format!("`{}`", id)).join(", ")
            ))
            .into());
        }

        for key in table.keys() {
            let is_sentinel_label = [self.get_start_transition(), self.get_end_transition()]
                .iter()
                .any(|sentinel| net.get_transition_label_str(*sentinel) == Some(key));
            if net.get_transition_index(key).is_none() && !is_sentinel_label {
                log::warn!("weight given for `{}`, which is not a transition of the net", key);
            }
        }

        log::info!("assigned manual weights to {} transitions", weights.len());

        StochasticPetriNet::new(self.clone(), weights)
    }
}
