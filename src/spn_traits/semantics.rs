use anyhow::Result;

use crate::spn_framework::activity_key::Activity;

pub type TransitionIndex = usize;

pub trait Semantics {
    type SemState: Clone;

    /**
     * (Re)creates the state at which every run starts.
     */
    fn get_initial_state(&self) -> Self::SemState;

    fn is_final_state(&self, state: &Self::SemState) -> bool;

    /**
     * Returns the enabled transitions in a fixed order, which does not depend on the state's history.
     */
    fn get_enabled_transitions(&self, state: &Self::SemState) -> Vec<TransitionIndex>;

    fn execute_transition(
        &self,
        state: &mut Self::SemState,
        transition: TransitionIndex,
    ) -> Result<()>;

    /**
     * The activity to record when the transition fires, or None if the firing is not observable.
     */
    fn get_transition_activity(&self, transition: TransitionIndex) -> Option<Activity>;

    fn describe_state(&self, state: &Self::SemState) -> String;

    fn describe_transition(&self, transition: TransitionIndex) -> String;
}

pub trait StochasticSemantics: Semantics {
    fn get_transition_weight(&self, state: &Self::SemState, transition: TransitionIndex) -> f64;
}
