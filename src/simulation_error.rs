use thiserror::Error;

/// The ways in which setting up or running a simulation can fail.
///
/// Configuration and structural errors are raised before any instance runs and abort the whole batch.
/// The other kinds are raised while playing the token game of a single instance.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("structural error: {0}")]
    Structural(String),

    #[error("deadlock: no transition is enabled in the non-final marking {marking}")]
    Deadlock { marking: String },

    #[error("degenerate weights: the enabled transitions {enabled} all have weight zero in marking {marking}")]
    DegenerateWeights { marking: String, enabled: String },

    #[error("transition {transition} consumes more tokens from place `{place}` than the marking {marking} holds")]
    InsufficientTokens {
        transition: String,
        place: String,
        marking: String,
    },

    #[error("the final marking was not reached within {max_steps} steps; stopped in marking {marking}")]
    StepLimitExceeded { max_steps: usize, marking: String },

    #[error("case {case_id} failed; {succeeded} of {requested} traces were generated successfully")]
    CaseFailed {
        case_id: String,
        succeeded: usize,
        requested: usize,
        #[source]
        source: Box<SimulationError>,
    },
}

impl SimulationError {
    /**
     * For a failed case, returns the error of the instance itself.
     */
    pub fn root(&self) -> &SimulationError {
        match self {
            SimulationError::CaseFailed { source, .. } => source.root(),
            _ => self,
        }
    }
}
