use anyhow::Result;

use crate::{
    simulation_error::SimulationError,
    spn_objects::{
        alignments::Alignments, augmented_net::AugmentedNet, event_log::EventLog,
        stochastic_petri_net::StochasticPetriNet,
    },
};

pub trait FrequencyWeights {
    /**
     * Weighs each transition by the number of alignment moves, over the whole reference log, that are
     * matched to it. The sentinels always get at least weight 1.
     */
    fn assign_frequency_weights(
        &self,
        log: &EventLog,
        alignments: &Alignments,
    ) -> Result<StochasticPetriNet>;
}

impl FrequencyWeights for AugmentedNet {
    fn assign_frequency_weights(
        &self,
        log: &EventLog,
        alignments: &Alignments,
    ) -> Result<StochasticPetriNet> {
        if log.is_empty() {
            return Err(SimulationError::Configuration(
                "frequency weights require a non-empty reference log".to_string(),
            )
            .into());
        }
        if log.len() != alignments.len() {
            return Err(SimulationError::Configuration(format!(
                "the reference log has {} traces, but {} alignments were given",
                log.len(),
                alignments.len()
            ))
            .into());
        }

        let net = self.get_net();
        let mut counts = vec![0u64; net.get_number_of_transitions()];

        for (trace_index, (trace, moves)) in log.iter().zip(alignments.iter()).enumerate() {
            let trace = log.get_activity_key().deprocess_trace(trace);
            if alignments.get_log_projection(trace_index).as_ref() != Some(&trace) {
                return Err(SimulationError::Configuration(format!(
                    "alignment {} does not cover the events of trace {} of the reference log",
                    trace_index, trace_index
                ))
                .into());
            }

            for transition_id in moves.iter().filter_map(|movee| movee.get_transition_id()) {
                let transition = net.get_transition_index(transition_id).ok_or_else(|| {
                    SimulationError::Configuration(format!(
                        "alignment {} refers to transition `{}`, which is not in the net",
                        trace_index, transition_id
                    ))
                })?;
                counts[transition] += 1;
            }
        }

        let mut weights = counts.into_iter().map(|count| count as f64).collect::<Vec<_>>();
        for sentinel in [self.get_start_transition(), self.get_end_transition()] {
            weights[sentinel] = weights[sentinel].max(1.0);
        }

        log::info!(
            "assigned frequency weights from {} aligned traces; {} transitions were never observed",
            log.len(),
            weights.iter().filter(|w| **w == 0.0).count()
        );

        StochasticPetriNet::new(self.clone(), weights)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        simulation_error::SimulationError,
        spn_framework::activity_key::ActivityKey,
        spn_objects::{
            alignments::{Alignments, Move},
            event_log::EventLog,
            petri_net::PetriNet,
        },
        techniques::augmentation::Augment,
    };

    use super::FrequencyWeights;

    fn is_configuration_error(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Configuration(_))
        )
    }

    #[test]
    fn occurrence_counts() {
        let augmented = fs::read_to_string("testfiles/choice.pn")
            .unwrap()
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap();
        let log = fs::read_to_string("testfiles/choice.log")
            .unwrap()
            .parse::<EventLog>()
            .unwrap();
        let alignments = fs::read_to_string("testfiles/choice.ali")
            .unwrap()
            .parse::<Alignments>()
            .unwrap();

        let snet = augmented.assign_frequency_weights(&log, &alignments).unwrap();

        assert_eq!(snet.get_weight_by_id("t_a"), Some(3.0));
        assert_eq!(snet.get_weight_by_id("t_b"), Some(1.0));
        assert_eq!(snet.get_weight_by_id("tau"), Some(3.0));
        assert_eq!(snet.get_weight_by_id("t_d"), Some(1.0));
        assert_eq!(snet.get_weight_by_id("t_c"), Some(4.0));

        //never aligned, but the sentinels must be able to fire
        assert_eq!(snet.get_weight(augmented.get_start_transition()), 1.0);
        assert_eq!(snet.get_weight(augmented.get_end_transition()), 1.0);
    }

    #[test]
    fn unobserved_transition_gets_zero() {
        let augmented = fs::read_to_string("testfiles/choice.pn")
            .unwrap()
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap();
        let mut log = EventLog::new();
        log.push_trace(&["a", "c"]);

        let mut alignments = Alignments::new(ActivityKey::new());
        let a = alignments.get_activity_key_mut().process_activity("a");
        let c = alignments.get_activity_key_mut().process_activity("c");
        let start = augmented.get_net().get_transition_id(augmented.get_start_transition()).to_string();
        alignments.push(vec![
            Move::ModelMove(start.clone()),
            Move::SynchronousMove(a, "t_a".to_string()),
            Move::ModelMove("tau".to_string()),
            Move::SynchronousMove(c, "t_c".to_string()),
        ]);

        let snet = augmented.assign_frequency_weights(&log, &alignments).unwrap();
        assert_eq!(snet.get_weight_by_id("t_b"), Some(0.0));
        assert_eq!(snet.get_weight_by_id("t_d"), Some(0.0));
        assert_eq!(snet.get_weight_by_id(&start), Some(1.0));
    }

    #[test]
    fn empty_reference_log() {
        let augmented = fs::read_to_string("testfiles/a-b.pn")
            .unwrap()
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap();

        let err = augmented
            .assign_frequency_weights(&EventLog::new(), &Alignments::default())
            .unwrap_err();
        assert!(is_configuration_error(&err));
    }

    #[test]
    fn unknown_transition() {
        let augmented = fs::read_to_string("testfiles/a-b.pn")
            .unwrap()
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap();
        let mut log = EventLog::new();
        log.push_trace(&["a"]);
        let mut alignments = Alignments::new(ActivityKey::new());
        let a = alignments.get_activity_key_mut().process_activity("a");
        alignments.push(vec![Move::SynchronousMove(a, "t_nope".to_string())]);

        let err = augmented.assign_frequency_weights(&log, &alignments).unwrap_err();
        assert!(is_configuration_error(&err));
    }

    #[test]
    fn alignment_of_another_trace() {
        let augmented = fs::read_to_string("testfiles/a-b.pn")
            .unwrap()
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap();
        let mut log = EventLog::new();
        log.push_trace(&["b"]);
        let mut alignments = Alignments::new(ActivityKey::new());
        let a = alignments.get_activity_key_mut().process_activity("a");
        alignments.push(vec![Move::SynchronousMove(a, "t_a".to_string())]);

        let err = augmented.assign_frequency_weights(&log, &alignments).unwrap_err();
        assert!(is_configuration_error(&err));
    }
}
