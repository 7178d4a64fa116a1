use anyhow::{Context, Error, Result, anyhow};
use std::{
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use crate::{
    line_reader::LineReader,
    marking::Marking,
    spn_framework::{
        activity_key::{Activity, ActivityKey},
        exportable::Exportable,
        importable::Importable,
        infoable::Infoable,
    },
    spn_traits::semantics::TransitionIndex,
};

pub const HEADER: &str = "petri net";

pub type PlaceIndex = usize;

/// A directed arc. The variants make a net bipartite by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arc {
    PlaceTransition(PlaceIndex, TransitionIndex),
    TransitionPlace(TransitionIndex, PlaceIndex),
}

/// A labelled Petri net with an initial and a final marking.
///
/// Places and transitions are identified by their index; each also carries an id that is unique in the net.
/// Adjacency is never cached: every query scans the current arc list, so arcs can be removed and added
/// freely without invalidating anything.
#[derive(Clone, Debug)]
pub struct PetriNet {
    pub(crate) activity_key: ActivityKey,
    pub(crate) place_ids: Vec<String>,
    pub(crate) transition_ids: Vec<String>,
    pub(crate) labels: Vec<Option<Activity>>,
    pub(crate) arcs: Vec<Arc>,
    pub(crate) initial_marking: Marking,
    pub(crate) final_marking: Marking,
}

impl PetriNet {
    pub fn new() -> Self {
        Self {
            activity_key: ActivityKey::new(),
            place_ids: vec![],
            transition_ids: vec![],
            labels: vec![],
            arcs: vec![],
            initial_marking: Marking::new(0),
            final_marking: Marking::new(0),
        }
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place_ids.len()
    }

    pub fn get_number_of_transitions(&self) -> usize {
        self.transition_ids.len()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_activity_key_mut(&mut self) -> &mut ActivityKey {
        &mut self.activity_key
    }

    pub fn get_initial_marking(&self) -> &Marking {
        &self.initial_marking
    }

    pub fn get_initial_marking_mut(&mut self) -> &mut Marking {
        &mut self.initial_marking
    }

    pub fn get_final_marking(&self) -> &Marking {
        &self.final_marking
    }

    pub fn get_final_marking_mut(&mut self) -> &mut Marking {
        &mut self.final_marking
    }

    pub fn add_place(&mut self, id: impl Into<String>) -> Result<PlaceIndex> {
        let id = id.into();
        if self.get_place_index(&id).is_some() {
            return Err(anyhow!("there is already a place with id `{}`", id));
        }
        self.place_ids.push(id);
        self.initial_marking.add_place();
        self.final_marking.add_place();
        Ok(self.get_number_of_places() - 1)
    }

    pub fn add_transition(
        &mut self,
        id: impl Into<String>,
        label: Option<&str>,
    ) -> Result<TransitionIndex> {
        let id = id.into();
        if self.get_transition_index(&id).is_some() {
            return Err(anyhow!("there is already a transition with id `{}`", id));
        }
        let label = label.map(|label| self.activity_key.process_activity(label));
        self.transition_ids.push(id);
        self.labels.push(label);
        Ok(self.get_number_of_transitions() - 1)
    }

    pub fn add_place_transition_arc(
        &mut self,
        from_place: PlaceIndex,
        to_transition: TransitionIndex,
    ) -> Result<()> {
        self.check_place(from_place)?;
        self.check_transition(to_transition)?;
        self.arcs.push(Arc::PlaceTransition(from_place, to_transition));
        Ok(())
    }

    pub fn add_transition_place_arc(
        &mut self,
        from_transition: TransitionIndex,
        to_place: PlaceIndex,
    ) -> Result<()> {
        self.check_transition(from_transition)?;
        self.check_place(to_place)?;
        self.arcs.push(Arc::TransitionPlace(from_transition, to_place));
        Ok(())
    }

    /**
     * Removes one occurrence of the given arc. Returns whether the arc was present.
     */
    pub fn remove_arc(&mut self, arc: &Arc) -> bool {
        if let Some(pos) = self.arcs.iter().position(|a| a == arc) {
            self.arcs.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn get_arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn get_place_id(&self, place: PlaceIndex) -> &str {
        &self.place_ids[place]
    }

    pub fn get_transition_id(&self, transition: TransitionIndex) -> &str {
        &self.transition_ids[transition]
    }

    pub fn get_place_index(&self, id: &str) -> Option<PlaceIndex> {
        self.place_ids.iter().position(|p| p == id)
    }

    pub fn get_transition_index(&self, id: &str) -> Option<TransitionIndex> {
        self.transition_ids.iter().position(|t| t == id)
    }

    pub fn get_transition_label(&self, transition: TransitionIndex) -> Option<Activity> {
        self.labels[transition]
    }

    pub fn get_transition_label_str(&self, transition: TransitionIndex) -> Option<&str> {
        self.labels[transition]
            .as_ref()
            .map(|activity| self.activity_key.get_activity_label(activity))
    }

    pub fn is_transition_silent(&self, transition: TransitionIndex) -> bool {
        self.labels[transition].is_none()
    }

    /**
     * The source places of the in-arcs of the transition; a place occurs once for every arc.
     */
    pub fn get_input_places(&self, transition: TransitionIndex) -> Vec<PlaceIndex> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc {
                Arc::PlaceTransition(p, t) if *t == transition => Some(*p),
                _ => None,
            })
            .collect()
    }

    /**
     * The target places of the out-arcs of the transition; a place occurs once for every arc.
     */
    pub fn get_output_places(&self, transition: TransitionIndex) -> Vec<PlaceIndex> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc {
                Arc::TransitionPlace(t, p) if *t == transition => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn get_output_transitions(&self, place: PlaceIndex) -> Vec<TransitionIndex> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc {
                Arc::PlaceTransition(p, t) if *p == place => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn get_input_transitions(&self, place: PlaceIndex) -> Vec<TransitionIndex> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc {
                Arc::TransitionPlace(t, p) if *p == place => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn place_has_arcs(&self, place: PlaceIndex) -> bool {
        self.arcs.iter().any(|arc| match arc {
            Arc::PlaceTransition(p, _) | Arc::TransitionPlace(_, p) => *p == place,
        })
    }

    /**
     * Renders a marking using place ids, e.g. `[p1, p3:2]`.
     */
    pub fn marking_to_string(&self, marking: &Marking) -> String {
        let places = marking
            .get_place2token()
            .iter()
            .enumerate()
            .filter(|(_, tokens)| **tokens > 0)
            .map(|(place, tokens)| {
                let id = self.place_ids.get(place).map_or("?", |id| id.as_str());
                if *tokens > 1 {
                    format!("{}:{}", id, tokens)
                } else {
                    id.to_string()
                }
            })
            .collect::<Vec<_>>();
        format!("[{}]", places.join(", "))
    }

    fn check_place(&self, place: PlaceIndex) -> Result<()> {
        if place >= self.get_number_of_places() {
            return Err(anyhow!(
                "non-existing place {} referenced, while there are {}",
                place,
                self.get_number_of_places()
            ));
        }
        Ok(())
    }

    fn check_transition(&self, transition: TransitionIndex) -> Result<()> {
        if transition >= self.get_number_of_transitions() {
            return Err(anyhow!(
                "non-existing transition {} referenced, while there are {}",
                transition,
                self.get_number_of_transitions()
            ));
        }
        Ok(())
    }
}

impl Default for PetriNet {
    fn default() -> Self {
        Self::new()
    }
}

impl Exportable for PetriNet {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for PetriNet {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of places\t\t{}", self.get_number_of_places())?;
        writeln!(f, "Number of transitions\t\t{}", self.get_number_of_transitions())?;
        writeln!(f, "Number of arcs\t\t\t{}", self.arcs.len())?;
        writeln!(f, "Number of activities\t\t{}", self.activity_key.get_number_of_activities())?;
        writeln!(
            f,
            "Number of silent transitions\t{}",
            (0..self.get_number_of_transitions())
                .filter(|transition| self.is_transition_silent(*transition))
                .count()
        )?;
        writeln!(f, "Initial marking\t\t\t{}", self.marking_to_string(&self.initial_marking))?;
        writeln!(f, "Final marking\t\t\t{}", self.marking_to_string(&self.final_marking))?;

        Ok(write!(f, "")?)
    }
}

impl fmt::Display for PetriNet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of places\n{}", self.get_number_of_places())?;
        for (place, id) in self.place_ids.iter().enumerate() {
            writeln!(f, "# place {}\n{}", place, id)?;
        }

        writeln!(f, "# initial marking")?;
        for tokens in self.initial_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# final marking")?;
        for tokens in self.final_marking.get_place2token() {
            writeln!(f, "{}", tokens)?;
        }

        writeln!(f, "# number of transitions\n{}", self.get_number_of_transitions())?;
        for transition in 0..self.get_number_of_transitions() {
            writeln!(f, "# transition {}", transition)?;
            writeln!(f, "id {}", self.transition_ids[transition])?;

            if let Some(label) = self.get_transition_label_str(transition) {
                writeln!(f, "label {}", label)?;
            } else {
                writeln!(f, "silent")?;
            }

            let input_places = self.get_input_places(transition);
            writeln!(f, "# number of input places\n{}", input_places.len())?;
            for place in input_places {
                writeln!(f, "{}", place)?;
            }

            let output_places = self.get_output_places(transition);
            writeln!(f, "# number of output places\n{}", output_places.len())?;
            for place in output_places {
                writeln!(f, "{}", place)?;
            }
        }

        write!(f, "")
    }
}

impl FromStr for PetriNet {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Importable for PetriNet {
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lreader = LineReader::new(reader);

        let head = lreader
            .next_line_string()
            .with_context(|| format!("failed to read header, which should be {}", HEADER))?;
        if head != HEADER {
            return Err(anyhow!(
                "first line should be exactly `{}`, but found `{}` on line `{}`",
                HEADER,
                lreader.get_last_line(),
                lreader.get_last_line_number()
            ));
        }

        let mut result = PetriNet::new();

        //read places
        let number_of_places = lreader
            .next_line_index()
            .context("failed to read number of places")?;
        for place in 0..number_of_places {
            let id = lreader
                .next_line_string()
                .with_context(|| format!("failed to read id of place {}", place))?;
            let id = id.trim();
            if id.is_empty() {
                return Err(anyhow!(
                    "place {} has an empty id at line {}",
                    place,
                    lreader.get_last_line_number()
                ));
            }
            result
                .add_place(id)
                .with_context(|| format!("at line {}", lreader.get_last_line_number()))?;
        }

        //read markings
        for place in 0..number_of_places {
            let tokens = lreader
                .next_line_natural()
                .with_context(|| format!("failed to read initial marking of place {}", place))?;
            result.initial_marking.increase(place, tokens)?;
        }
        for place in 0..number_of_places {
            let tokens = lreader
                .next_line_natural()
                .with_context(|| format!("failed to read final marking of place {}", place))?;
            result.final_marking.increase(place, tokens)?;
        }

        //read transitions
        let number_of_transitions = lreader
            .next_line_index()
            .context("failed to read number of transitions")?;
        for transition in 0..number_of_transitions {
            let id = lreader
                .next_line_prefixed("id")
                .with_context(|| format!("failed to read id of transition {}", transition))?;

            let label_line = lreader
                .next_line_string()
                .with_context(|| format!("failed to read label of transition {}", transition))?;
            let label = if let Some(label) = label_line.trim_start().strip_prefix("label ") {
                Some(label.to_string())
            } else if label_line.trim() == "silent" {
                None
            } else {
                return Err(anyhow!(
                    "expected `label ...` or `silent` for transition {} at line {}; found `{}`",
                    transition,
                    lreader.get_last_line_number(),
                    lreader.get_last_line()
                ));
            };

            result
                .add_transition(id.trim(), label.as_deref())
                .with_context(|| format!("at line {}", lreader.get_last_line_number()))?;

            //read input places
            let number_of_input_places = lreader.next_line_index().with_context(|| {
                format!("failed to read number of input places of transition {}", transition)
            })?;
            for p in 0..number_of_input_places {
                let place = lreader.next_line_index().with_context(|| {
                    format!("failed to read input place number {} of transition {}", p, transition)
                })?;
                result.add_place_transition_arc(place, transition).with_context(|| {
                    format!(
                        "non-existing place referenced for transition {}, input place number {}, at line {}",
                        transition,
                        p,
                        lreader.get_last_line_number()
                    )
                })?;
            }

            //read output places
            let number_of_output_places = lreader.next_line_index().with_context(|| {
                format!("failed to read number of output places of transition {}", transition)
            })?;
            for p in 0..number_of_output_places {
                let place = lreader.next_line_index().with_context(|| {
                    format!("failed to read output place number {} of transition {}", p, transition)
                })?;
                result.add_transition_place_arc(transition, place).with_context(|| {
                    format!(
                        "non-existing place referenced for transition {}, output place number {}, at line {}",
                        transition,
                        p,
                        lreader.get_last_line_number()
                    )
                })?;
            }
        }

        Ok(result)
    }
}
