use anyhow::Result;
use itertools::Itertools;
use rand::Rng;

use crate::{
    simulation_error::SimulationError,
    spn_framework::activity_key::Activity,
    spn_traits::semantics::{StochasticSemantics, TransitionIndex},
};

pub const DEFAULT_MAX_STEPS: usize = 100_000;

pub trait TokenGame {
    type State;

    /**
     * Plays the token game once: fires transitions until the final marking is reached, and returns the
     * observable activities in firing order. At least one transition fires, even if the initial state
     * already satisfies the final state.
     */
    fn simulate_one_instance<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<Vec<Activity>>;

    /**
     * Draws one of the enabled transitions, with probability proportional to its weight.
     * Enabled transitions are walked in the given order, so a fixed random source gives a fixed choice.
     */
    fn choose_transition<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        enabled_transitions: &[TransitionIndex],
        rng: &mut R,
    ) -> Result<TransitionIndex>;
}

impl<T> TokenGame for T
where
    T: StochasticSemantics + ?Sized,
{
    type State = T::SemState;

    fn simulate_one_instance<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<Vec<Activity>> {
        let mut state = self.get_initial_state();
        let mut trace = vec![];
        let mut steps = 0;

        loop {
            if steps >= max_steps {
                return Err(SimulationError::StepLimitExceeded {
                    max_steps,
                    marking: self.describe_state(&state),
                }
                .into());
            }

            let enabled_transitions = self.get_enabled_transitions(&state);
            if enabled_transitions.is_empty() {
                return Err(SimulationError::Deadlock {
                    marking: self.describe_state(&state),
                }
                .into());
            }

            let transition = self.choose_transition(&state, &enabled_transitions, rng)?;
            self.execute_transition(&mut state, transition)?;
            steps += 1;

            if let Some(activity) = self.get_transition_activity(transition) {
                trace.push(activity);
            }

            if self.is_final_state(&state) {
                break;
            }
        }

        log::trace!("instance finished after {} steps with {} events", steps, trace.len());

        Ok(trace)
    }

    fn choose_transition<R: Rng + ?Sized>(
        &self,
        state: &T::SemState,
        enabled_transitions: &[TransitionIndex],
        rng: &mut R,
    ) -> Result<TransitionIndex> {
        let weights = enabled_transitions
            .iter()
            .map(|transition| self.get_transition_weight(state, *transition))
            .collect::<Vec<_>>();
        let total_weight: f64 = weights.iter().sum();

        if !(total_weight > 0.0 && total_weight.is_finite()) {
            return Err(SimulationError::DegenerateWeights {
                marking: self.describe_state(state),
                enabled: enabled_transitions
                    .iter()
                    .map(|transition| self.describe_transition(*transition))
                    .join(", "),
            }
            .into());
        }

        let draw = rng.gen_range(0.0..total_weight);
        let mut cumulative = 0.0;
        for (transition, weight) in enabled_transitions.iter().zip(weights.iter()) {
            cumulative += weight;
            if cumulative > draw {
                return Ok(*transition);
            }
        }

        //rounding may leave the draw just above the last sum; take the last transition that can fire
        let last = enabled_transitions
            .iter()
            .zip(weights.iter())
            .rev()
            .find(|(_, weight)| **weight > 0.0)
            .map(|(transition, _)| *transition);
        last.ok_or_else(|| {
            SimulationError::DegenerateWeights {
                marking: self.describe_state(state),
                enabled: enabled_transitions
                    .iter()
                    .map(|transition| self.describe_transition(*transition))
                    .join(", "),
            }
            .into()
        })
    }
}
