use crate::spn_objects::{augmented_net::AugmentedNet, stochastic_petri_net::StochasticPetriNet};

pub trait UniformWeights {
    /**
     * Gives every transition, including the sentinels, weight 1.
     */
    fn assign_uniform_weights(&self) -> StochasticPetriNet;
}

impl UniformWeights for AugmentedNet {
    fn assign_uniform_weights(&self) -> StochasticPetriNet {
        log::info!("assign uniform weights");
        StochasticPetriNet {
            net: self.clone(),
            weights: vec![1.0; self.get_number_of_transitions()],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        spn_objects::petri_net::PetriNet,
        techniques::augmentation::Augment,
    };

    use super::UniformWeights;

    #[test]
    fn all_ones() {
        let fin = fs::read_to_string("testfiles/choice.pn").unwrap();
        let augmented = fin.parse::<PetriNet>().unwrap().augment().unwrap();
        let snet = augmented.assign_uniform_weights();

        assert_eq!(snet.get_weights().len(), 7);
        assert!(snet.get_weights().iter().all(|w| *w == 1.0));
        assert_eq!(snet.get_weight(augmented.get_start_transition()), 1.0);
        assert_eq!(snet.get_weight(augmented.get_end_transition()), 1.0);
    }
}
