use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    simulation_error::SimulationError,
    spn_objects::{simulated_log::SimulatedLog, stochastic_petri_net::StochasticPetriNet},
    techniques::token_game::{DEFAULT_MAX_STEPS, TokenGame},
};

#[derive(Clone, Debug)]
pub struct SimulationParameters {
    pub number_of_traces: usize,
    /// Without a seed, a fresh one is drawn for every batch.
    pub seed: Option<u64>,
    pub max_steps: usize,
    pub show_progress: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            number_of_traces: 1,
            seed: None,
            max_steps: DEFAULT_MAX_STEPS,
            show_progress: false,
        }
    }
}

pub trait TraceSampler {
    /**
     * Plays the token game `number_of_traces` times and collects the traces in case order.
     * If an instance fails, the batch fails with the first failing case (in case order), and reports how
     * many of all the cases succeeded.
     */
    fn simulate(&self, parameters: &SimulationParameters) -> Result<SimulatedLog>;
}

impl TraceSampler for StochasticPetriNet {
    fn simulate(&self, parameters: &SimulationParameters) -> Result<SimulatedLog> {
        let seed = parameters
            .seed
            .unwrap_or_else(|| rand::thread_rng().r#gen::<u64>());
        log::info!(
            "simulate {} traces with seed {}",
            parameters.number_of_traces,
            seed
        );

        let progress_bar = get_progress_bar(parameters.number_of_traces, parameters.show_progress);

        //each case has its own random stream, so the result does not depend on the scheduling of the threads
        let results = (0..parameters.number_of_traces)
            .into_par_iter()
            .map(|case_index| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(case_index as u64);
                let result = self.simulate_one_instance(&mut rng, parameters.max_steps);
                progress_bar.inc(1);
                result
            })
            .collect::<Vec<_>>();

        progress_bar.finish_and_clear();

        //every case has run by now, also the ones after the first failure
        let succeeded = results.iter().filter(|result| result.is_ok()).count();

        let mut traces = Vec::with_capacity(succeeded);
        for (case_index, result) in results.into_iter().enumerate() {
            match result {
                Ok(trace) => traces.push(trace),
                Err(err) => {
                    let case_id = SimulatedLog::get_case_id(case_index);
                    return match err.downcast::<SimulationError>() {
                        Ok(source) => Err(SimulationError::CaseFailed {
                            case_id,
                            succeeded,
                            requested: parameters.number_of_traces,
                            source: Box::new(source),
                        }
                        .into()),
                        Err(err) => Err(err.context(format!(
                            "case {} failed; {} of {} traces were generated successfully",
                            case_id, succeeded, parameters.number_of_traces
                        ))),
                    };
                }
            }
        }

        let result = SimulatedLog::new(self.get_net().get_net().get_activity_key().clone(), traces);
        log::info!(
            "simulated {} traces with {} events",
            result.number_of_cases(),
            result.get_number_of_events()
        );
        Ok(result)
    }
}

pub fn get_progress_bar(total_ticks: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total_ticks as u64);
    if let Ok(style) = ProgressStyle::with_template("[{wide_bar:.cyan/blue}] {pos:>7}/{len:7}") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_position(0);
    pb
}

/**
 * Simulates with the given parameters, and adds the seed to the error, so that a failing batch can be replayed.
 */
pub fn simulate_reproducibly(
    net: &StochasticPetriNet,
    parameters: &SimulationParameters,
) -> Result<SimulatedLog> {
    let seed = parameters
        .seed
        .unwrap_or_else(|| rand::thread_rng().r#gen::<u64>());
    let parameters = SimulationParameters {
        seed: Some(seed),
        ..parameters.clone()
    };
    net.simulate(&parameters)
        .with_context(|| format!("simulation with seed {} failed", seed))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ntest::timeout;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::{
        simulation_error::SimulationError,
        spn_objects::{petri_net::PetriNet, stochastic_petri_net::StochasticPetriNet},
        techniques::{
            augmentation::Augment, token_game::TokenGame, uniform_weights::UniformWeights,
        },
    };

    use super::{SimulationParameters, TraceSampler, simulate_reproducibly};

    fn uniform(file: &str) -> StochasticPetriNet {
        fs::read_to_string(format!("testfiles/{}", file))
            .unwrap()
            .parse::<PetriNet>()
            .unwrap()
            .augment()
            .unwrap()
            .assign_uniform_weights()
    }

    #[test]
    #[timeout(10000)]
    fn sequence_batch() {
        let snet = uniform("a-b.pn");
        let parameters = SimulationParameters {
            number_of_traces: 3,
            seed: Some(1),
            ..Default::default()
        };

        let log = snet.simulate(&parameters).unwrap();
        assert_eq!(log.number_of_cases(), 3);

        let events = log.get_events();
        let rows = events
            .iter()
            .map(|event| (event.case_id.as_str(), event.activity.as_str(), event.position))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                ("1", "a", 0),
                ("1", "b", 1),
                ("2", "a", 2),
                ("2", "b", 3),
                ("3", "a", 4),
                ("3", "b", 5)
            ]
        );
    }

    #[test]
    #[timeout(20000)]
    fn fixed_seed_fixed_log() {
        let snet = uniform("choice.pn");
        let parameters = SimulationParameters {
            number_of_traces: 200,
            seed: Some(2024),
            ..Default::default()
        };

        let log1 = snet.simulate(&parameters).unwrap();
        let log2 = snet.simulate(&parameters).unwrap();
        assert_eq!(log1.get_traces(), log2.get_traces());
        assert_eq!(log1.to_string(), log2.to_string());
    }

    #[test]
    fn no_traces() {
        let snet = uniform("a-b.pn");
        let parameters = SimulationParameters {
            number_of_traces: 0,
            ..Default::default()
        };

        let log = snet.simulate(&parameters).unwrap();
        assert_eq!(log.number_of_cases(), 0);
        assert!(log.get_events().is_empty());
    }

    #[test]
    #[timeout(10000)]
    fn failing_case_aborts_batch() {
        let snet = uniform("deadlock.pn");
        let parameters = SimulationParameters {
            number_of_traces: 5,
            seed: Some(1),
            ..Default::default()
        };

        let err = snet.simulate(&parameters).unwrap_err();
        let failure = err.downcast_ref::<SimulationError>().unwrap();
        match failure {
            SimulationError::CaseFailed {
                case_id,
                succeeded,
                requested,
                ..
            } => {
                assert_eq!(case_id, "1");
                assert_eq!(*succeeded, 0);
                assert_eq!(*requested, 5);
            }
            _ => panic!("expected a failed case, got {}", failure),
        }
        assert!(matches!(failure.root(), SimulationError::Deadlock { .. }));
    }

    #[test]
    #[timeout(10000)]
    fn seed_in_error() {
        let snet = uniform("deadlock.pn");
        let parameters = SimulationParameters {
            number_of_traces: 1,
            seed: Some(99),
            ..Default::default()
        };

        let err = simulate_reproducibly(&snet, &parameters).unwrap_err();
        assert!(format!("{:#}", err).contains("seed 99"));
        assert!(err.downcast_ref::<SimulationError>().is_some());
    }

    #[test]
    #[timeout(20000)]
    fn failure_counts_all_cases() {
        let snet = uniform("trap.pn");
        let parameters = SimulationParameters {
            number_of_traces: 20,
            seed: Some(1),
            max_steps: 50,
            show_progress: false,
        };

        //replay every case on its own stream
        let outcomes = (0..20)
            .map(|case_index| {
                let mut rng = ChaCha8Rng::seed_from_u64(1);
                rng.set_stream(case_index as u64);
                snet.simulate_one_instance(&mut rng, 50).is_ok()
            })
            .collect::<Vec<_>>();
        let first_failure = outcomes.iter().position(|ok| !ok).unwrap();
        let expected = outcomes.iter().filter(|ok| **ok).count();
        assert!(outcomes[first_failure..].iter().any(|ok| *ok));

        let err = snet.simulate(&parameters).unwrap_err();
        let failure = err.downcast_ref::<SimulationError>().unwrap();
        match failure {
            SimulationError::CaseFailed {
                case_id,
                succeeded,
                requested,
                ..
            } => {
                assert_eq!(case_id, &(first_failure + 1).to_string());
                assert_eq!(*succeeded, expected);
                assert!(*succeeded > first_failure);
                assert_eq!(*requested, 20);
            }
            _ => panic!("expected a failed case, got {}", failure),
        }
        assert!(matches!(
            failure.root(),
            SimulationError::StepLimitExceeded { max_steps: 50, .. }
        ));
    }

    #[test]
    #[timeout(10000)]
    fn missing_tokens_fail_the_case() {
        let snet = uniform("double-arc.pn");
        let parameters = SimulationParameters {
            number_of_traces: 3,
            seed: Some(1),
            ..Default::default()
        };

        let err = snet.simulate(&parameters).unwrap_err();
        let failure = err.downcast_ref::<SimulationError>().unwrap();
        assert!(matches!(
            failure,
            SimulationError::CaseFailed { succeeded: 0, requested: 3, .. }
        ));
        match failure.root() {
            SimulationError::InsufficientTokens { place, .. } => assert_eq!(place, "p1"),
            other => panic!("expected insufficient tokens, got {}", other),
        }
    }
}
