use anyhow::Context;
use itertools::Itertools;

use crate::{
    marking::Marking,
    simulation_error::SimulationError,
    spn_framework::activity_key::Activity,
    spn_objects::stochastic_petri_net::StochasticPetriNet,
    spn_traits::semantics::{Semantics, StochasticSemantics, TransitionIndex},
};

impl Semantics for StochasticPetriNet {
    type SemState = Marking;

    fn get_initial_state(&self) -> Marking {
        self.net.get_net().get_initial_marking().clone()
    }

    fn is_final_state(&self, state: &Marking) -> bool {
        state.has_same_places(self.net.get_net().get_final_marking())
    }

    fn get_enabled_transitions(&self, state: &Marking) -> Vec<TransitionIndex> {
        let net = self.net.get_net();
        (0..net.get_number_of_transitions())
            .filter(|transition| {
                net.get_input_places(*transition)
                    .iter()
                    .all(|place| state.has_token(*place))
            })
            .collect()
    }

    fn execute_transition(
        &self,
        state: &mut Marking,
        transition: TransitionIndex,
    ) -> anyhow::Result<()> {
        let net = self.net.get_net();
        let input_places = net.get_input_places(transition);

        //enabling only asks for presence, so repeated in-arcs may ask for more tokens than there are
        for (place, needed) in input_places.iter().counts() {
            let available = state.get_place2token().get(*place).copied().unwrap_or(0);
            if available < needed as u64 {
                return Err(SimulationError::InsufficientTokens {
                    transition: self.describe_transition(transition),
                    place: net.get_place_id(*place).to_string(),
                    marking: net.marking_to_string(state),
                }
                .into());
            }
        }

        for place in input_places {
            state.decrease(place, 1)?;
        }

        for place in net.get_output_places(transition) {
            state
                .increase(place, 1)
                .with_context(|| format!("when firing transition `{}`", net.get_transition_id(transition)))?;
        }

        Ok(())
    }

    fn get_transition_activity(&self, transition: TransitionIndex) -> Option<Activity> {
        if self.net.is_transition_observable(transition) {
            self.net.get_net().get_transition_label(transition)
        } else {
            None
        }
    }

    fn describe_state(&self, state: &Marking) -> String {
        self.net.get_net().marking_to_string(state)
    }

    fn describe_transition(&self, transition: TransitionIndex) -> String {
        let net = self.net.get_net();
        match net.get_transition_label_str(transition) {
            Some(label) => format!("{} ({})", net.get_transition_id(transition), label),
            None => net.get_transition_id(transition).to_string(),
        }
    }
}

impl StochasticSemantics for StochasticPetriNet {
    fn get_transition_weight(&self, _state: &Marking, transition: TransitionIndex) -> f64 {
        self.weights[transition]
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        simulation_error::SimulationError,
        spn_objects::petri_net::PetriNet,
        spn_traits::semantics::Semantics,
        techniques::{augmentation::Augment, uniform_weights::UniformWeights},
    };

    #[test]
    fn conservation() {
        let fin = fs::read_to_string("testfiles/parallel.pn").unwrap();
        let snet = fin
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap()
            .assign_uniform_weights();
        let net = snet.get_net().get_net();

        let mut state = snet.get_initial_state();
        while !snet.is_final_state(&state) {
            let transition = snet.get_enabled_transitions(&state)[0];
            let before = state.number_of_tokens() as i64;
            snet.execute_transition(&mut state, transition).unwrap();
            let after = state.number_of_tokens() as i64;

            assert_eq!(
                after - before,
                net.get_output_places(transition).len() as i64
                    - net.get_input_places(transition).len() as i64
            );
        }
    }

    #[test]
    fn presence_enabling() {
        let mut net = PetriNet::new();
        let p = net.add_place("p").unwrap();
        let q = net.add_place("q").unwrap();
        let r = net.add_place("r").unwrap();
        let a = net.add_transition("a", Some("a")).unwrap();
        let t = net.add_transition("t", Some("double")).unwrap();
        net.add_place_transition_arc(p, a).unwrap();
        net.add_transition_place_arc(a, q).unwrap();
        net.add_place_transition_arc(q, t).unwrap();
        net.add_place_transition_arc(q, t).unwrap();
        net.add_transition_place_arc(t, r).unwrap();
        net.get_initial_marking_mut().increase(p, 1).unwrap();
        net.get_final_marking_mut().increase(r, 1).unwrap();

        let snet = net.augment().unwrap().assign_uniform_weights();
        let mut state = snet.get_initial_state();
        snet.execute_transition(&mut state, snet.get_net().get_start_transition())
            .unwrap();
        snet.execute_transition(&mut state, a).unwrap();

        //a single token in q enables t, even though t has two in-arcs from q
        assert_eq!(snet.get_enabled_transitions(&state), vec![t]);

        //but firing it needs two tokens, and leaves the marking as it was
        let before = state.clone();
        let err = snet.execute_transition(&mut state, t).unwrap_err();
        match err.downcast_ref::<SimulationError>() {
            Some(SimulationError::InsufficientTokens { transition, place, .. }) => {
                assert_eq!(transition, "t (double)");
                assert_eq!(place, "q");
            }
            _ => panic!("expected insufficient tokens, got {}", err),
        }
        assert_eq!(state, before);
    }

    #[test]
    fn sentinels_are_not_observable() {
        let fin = fs::read_to_string("testfiles/choice.pn").unwrap();
        let snet = fin
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap()
            .assign_uniform_weights();
        let augmented = snet.get_net();

        assert!(snet.get_transition_activity(augmented.get_start_transition()).is_none());
        assert!(snet.get_transition_activity(augmented.get_end_transition()).is_none());
        let tau = augmented.get_net().get_transition_index("tau").unwrap();
        assert!(snet.get_transition_activity(tau).is_none());
        let t_a = augmented.get_net().get_transition_index("t_a").unwrap();
        assert!(snet.get_transition_activity(t_a).is_some());
    }
}
