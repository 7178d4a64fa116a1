use anyhow::Result;
use std::fmt;

use crate::{
    spn_framework::{exportable::Exportable, infoable::Infoable},
    spn_objects::petri_net::{PetriNet, PlaceIndex},
    spn_traits::semantics::TransitionIndex,
};

pub const START_LABEL: &str = "<START>";
pub const END_LABEL: &str = "<END>";

/// A Petri net in which every run starts by firing `<START>` and ends by firing `<END>`.
///
/// The initial marking holds one token on each place that feeds `<START>`; the final marking is the final
/// marking of the net the augmentation started from.
#[derive(Clone, Debug)]
pub struct AugmentedNet {
    pub(crate) net: PetriNet,
    pub(crate) start: TransitionIndex,
    pub(crate) end: TransitionIndex,
    pub(crate) pre: PlaceIndex,
    pub(crate) post: PlaceIndex,
}

impl AugmentedNet {
    pub fn get_net(&self) -> &PetriNet {
        &self.net
    }

    pub fn get_start_transition(&self) -> TransitionIndex {
        self.start
    }

    pub fn get_end_transition(&self) -> TransitionIndex {
        self.end
    }

    pub fn get_pre_place(&self) -> PlaceIndex {
        self.pre
    }

    pub fn get_post_place(&self) -> PlaceIndex {
        self.post
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.net.get_number_of_transitions()
    }

    pub fn is_sentinel(&self, transition: TransitionIndex) -> bool {
        transition == self.start || transition == self.end
    }

    /**
     * Whether firing the transition is recorded: it must carry a non-empty label that is not a sentinel literal.
     */
    pub fn is_transition_observable(&self, transition: TransitionIndex) -> bool {
        match self.net.get_transition_label_str(transition) {
            Some(label) => !label.is_empty() && label != START_LABEL && label != END_LABEL,
            None => false,
        }
    }
}

impl Exportable for AugmentedNet {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        self.net.export(f)
    }
}

impl Infoable for AugmentedNet {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        self.net.info(f)?;
        writeln!(f, "Start transition\t\t{}", self.net.get_transition_id(self.start))?;
        writeln!(f, "End transition\t\t\t{}", self.net.get_transition_id(self.end))?;
        Ok(write!(f, "")?)
    }
}

impl fmt::Display for AugmentedNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}
