use anyhow::Result;
use itertools::Itertools;

use crate::{
    marking::Marking,
    simulation_error::SimulationError,
    spn_objects::{
        augmented_net::{AugmentedNet, END_LABEL, START_LABEL},
        petri_net::{Arc, PetriNet},
    },
};

pub trait Augment {
    /**
     * Wraps the net such that every run starts with a `<START>` transition and ends with an `<END>` transition.
     * The net itself is left untouched.
     */
    fn augment(&self) -> Result<AugmentedNet>;
}

impl Augment for PetriNet {
    fn augment(&self) -> Result<AugmentedNet> {
        let initial_places = self.get_initial_marking().marked_places();
        let final_places = self.get_final_marking().marked_places();

        if initial_places.is_empty() {
            return Err(SimulationError::Structural(
                "the initial marking is empty, so there is nothing to attach <START> to".to_string(),
            )
            .into());
        }
        if final_places.is_empty() {
            return Err(SimulationError::Structural(
                "the final marking is empty, so there is nothing to attach <END> to".to_string(),
            )
            .into());
        }
        for (marking, places) in [("initial", &initial_places), ("final", &final_places)] {
            if let Some(place) = places.iter().find(|place| !self.place_has_arcs(**place)) {
                return Err(SimulationError::Structural(format!(
                    "place `{}` of the {} marking is not connected to any transition",
                    self.get_place_id(*place),
                    marking
                ))
                .into());
            }
        }

        let mut net = self.clone();

        let start = net.add_transition(fresh_id(&net), Some(START_LABEL))?;
        let end = net.add_transition(fresh_id(&net), Some(END_LABEL))?;
        let pre = net.add_place(fresh_id(&net))?;
        let post = net.add_place(fresh_id(&net))?;

        //detach the successors of the initial places
        let mut first_transitions = vec![];
        for place in &initial_places {
            for transition in net.get_output_transitions(*place) {
                net.remove_arc(&Arc::PlaceTransition(*place, transition));
                first_transitions.push(transition);
            }
            net.add_place_transition_arc(*place, start)?;
        }

        //detach the predecessors of the final places
        let mut last_transitions = vec![];
        for place in &final_places {
            for transition in net.get_input_transitions(*place) {
                net.remove_arc(&Arc::TransitionPlace(transition, *place));
                last_transitions.push(transition);
            }
            net.add_transition_place_arc(end, *place)?;
        }

        net.add_transition_place_arc(start, pre)?;
        net.add_place_transition_arc(post, end)?;

        //a transition that consumed from several initial places consumes from pre only once
        let first_transitions = first_transitions.into_iter().unique().collect::<Vec<_>>();
        let last_transitions = last_transitions.into_iter().unique().collect::<Vec<_>>();
        for transition in &first_transitions {
            net.add_place_transition_arc(pre, *transition)?;
        }
        for transition in &last_transitions {
            net.add_transition_place_arc(*transition, post)?;
        }

        //<START> consumes exactly one token from each initial place
        let mut initial_marking = Marking::new(net.get_number_of_places());
        for place in &initial_places {
            initial_marking.increase(*place, 1)?;
        }
        net.initial_marking = initial_marking;

        log::debug!(
            "augmented the net with <START> ({} first transitions) and <END> ({} last transitions)",
            first_transitions.len(),
            last_transitions.len()
        );

        Ok(AugmentedNet {
            net,
            start,
            end,
            pre,
            post,
        })
    }
}

/**
 * Allocates an id of the form `n<N>` that is used by neither a place nor a transition.
 */
fn fresh_id(net: &PetriNet) -> String {
    let mut n = net.get_number_of_places() + net.get_number_of_transitions() + 1;
    loop {
        let id = format!("n{}", n);
        if net.get_place_index(&id).is_none() && net.get_transition_index(&id).is_none() {
            return id;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, fs};

    use crate::{
        simulation_error::SimulationError,
        spn_objects::{augmented_net::{END_LABEL, START_LABEL}, petri_net::PetriNet},
        spn_traits::semantics::Semantics,
        techniques::uniform_weights::UniformWeights,
    };

    use super::Augment;

    fn structural(net: &PetriNet) -> bool {
        let err = net.augment().unwrap_err();
        matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Structural(_))
        )
    }

    #[test]
    fn augment_sequence() {
        let fin = fs::read_to_string("testfiles/a-b.pn").unwrap();
        let net = fin.parse::<PetriNet>().unwrap();
        let augmented = net.augment().unwrap();
        let anet = augmented.get_net();

        let p0 = anet.get_place_index("p0").unwrap();
        let p2 = anet.get_place_index("p2").unwrap();
        let t_a = anet.get_transition_index("t_a").unwrap();
        let t_b = anet.get_transition_index("t_b").unwrap();
        let start = augmented.get_start_transition();
        let end = augmented.get_end_transition();
        let pre = augmented.get_pre_place();
        let post = augmented.get_post_place();

        assert_eq!(anet.get_transition_label_str(start), Some(START_LABEL));
        assert_eq!(anet.get_transition_label_str(end), Some(END_LABEL));
        assert_eq!(anet.get_input_places(start), vec![p0]);
        assert_eq!(anet.get_output_places(start), vec![pre]);
        assert_eq!(anet.get_input_places(t_a), vec![pre]);
        assert_eq!(anet.get_output_places(t_b), vec![post]);
        assert_eq!(anet.get_input_places(end), vec![post]);
        assert_eq!(anet.get_output_places(end), vec![p2]);
        assert_eq!(anet.get_output_transitions(p0), vec![start]);

        //the input net is not modified
        assert_eq!(net.get_number_of_transitions(), 2);
        assert_eq!(net.get_input_places(0), vec![0]);
        assert_eq!(net.get_arcs().len(), 4);
    }

    #[test]
    fn start_reaches_pre() {
        let fin = fs::read_to_string("testfiles/choice.pn").unwrap();
        let snet = fin
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap()
            .assign_uniform_weights();

        let mut state = snet.get_initial_state();
        let start = snet.get_net().get_start_transition();
        assert_eq!(snet.get_enabled_transitions(&state), vec![start]);

        snet.execute_transition(&mut state, start).unwrap();
        let pre = snet.get_net().get_pre_place();
        assert_eq!(state.marked_places().into_iter().collect::<Vec<_>>(), vec![pre]);
        assert_eq!(state.number_of_tokens(), 1);
    }

    #[test]
    fn end_requires_post() {
        let fin = fs::read_to_string("testfiles/parallel.pn").unwrap();
        let augmented = fin.parse::<PetriNet>().unwrap().augment().unwrap();
        let anet = augmented.get_net();

        assert_eq!(
            anet.get_input_places(augmented.get_end_transition()),
            vec![augmented.get_post_place()]
        );
        let join = anet.get_transition_index("join").unwrap();
        assert_eq!(anet.get_output_places(join), vec![augmented.get_post_place()]);
    }

    #[test]
    fn fresh_ids_do_not_collide() {
        let mut net = PetriNet::new();
        let p = net.add_place("n4").unwrap();
        let q = net.add_place("n5").unwrap();
        let t = net.add_transition("n6", Some("a")).unwrap();
        net.add_place_transition_arc(p, t).unwrap();
        net.add_transition_place_arc(t, q).unwrap();
        net.get_initial_marking_mut().increase(p, 1).unwrap();
        net.get_final_marking_mut().increase(q, 1).unwrap();

        let augmented = net.augment().unwrap();
        let anet = augmented.get_net();
        let mut ids = HashSet::new();
        for place in 0..anet.get_number_of_places() {
            assert!(ids.insert(anet.get_place_id(place).to_string()));
        }
        for transition in 0..anet.get_number_of_transitions() {
            assert!(ids.insert(anet.get_transition_id(transition).to_string()));
        }
    }

    #[test]
    fn shared_first_transition_consumes_pre_once() {
        let mut net = PetriNet::new();
        let p = net.add_place("p").unwrap();
        let q = net.add_place("q").unwrap();
        let o = net.add_place("o").unwrap();
        let t = net.add_transition("t", Some("sync")).unwrap();
        net.add_place_transition_arc(p, t).unwrap();
        net.add_place_transition_arc(q, t).unwrap();
        net.add_transition_place_arc(t, o).unwrap();
        net.get_initial_marking_mut().increase(p, 2).unwrap();
        net.get_initial_marking_mut().increase(q, 1).unwrap();
        net.get_final_marking_mut().increase(o, 1).unwrap();

        let augmented = net.augment().unwrap();
        let anet = augmented.get_net();

        assert_eq!(anet.get_input_places(t), vec![augmented.get_pre_place()]);
        assert_eq!(anet.get_input_places(augmented.get_start_transition()), vec![p, q]);
        assert_eq!(anet.get_initial_marking().get_place2token()[p], 1);
    }

    #[test]
    fn empty_markings() {
        let fin = fs::read_to_string("testfiles/a-b.pn").unwrap();
        let net = fin.parse::<PetriNet>().unwrap();

        let mut no_initial = net.clone();
        no_initial.get_initial_marking_mut().decrease(0, 1).unwrap();
        assert!(structural(&no_initial));

        let mut no_final = net.clone();
        no_final.get_final_marking_mut().decrease(2, 1).unwrap();
        assert!(structural(&no_final));
    }

    #[test]
    fn isolated_final_place() {
        let fin = fs::read_to_string("testfiles/isolated.pn").unwrap();
        let net = fin.parse::<PetriNet>().unwrap();
        assert!(structural(&net));
    }
}
