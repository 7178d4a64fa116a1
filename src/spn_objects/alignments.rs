use anyhow::{Context, Error, Result, anyhow};
use std::{
    fmt::{self, Display},
    io::{self, BufRead},
    str::FromStr,
};

use crate::{
    line_reader::LineReader,
    spn_framework::{
        activity_key::{Activity, ActivityKey},
        exportable::Exportable,
        importable::Importable,
        infoable::Infoable,
    },
};

pub const HEADER: &str = "alignments";

/// One step of an alignment between a trace and a model. Transitions are referred to by their id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    SynchronousMove(Activity, String),
    LogMove(Activity),
    ModelMove(String),
}

impl Move {
    /**
     * The transition the move is matched to; a log move has none.
     */
    pub fn get_transition_id(&self) -> Option<&str> {
        match self {
            Move::SynchronousMove(_, transition) | Move::ModelMove(transition) => {
                Some(transition.as_str())
            }
            Move::LogMove(_) => None,
        }
    }

    /**
     * The event of the trace the move covers; a model move has none.
     */
    pub fn get_activity(&self) -> Option<Activity> {
        match self {
            Move::SynchronousMove(activity, _) | Move::LogMove(activity) => Some(*activity),
            Move::ModelMove(_) => None,
        }
    }
}

/// Optimal alignments of a reference log, one per trace and in the order of the log.
/// These are computed elsewhere; the simulator only consumes them.
#[derive(Clone, Debug, Default)]
pub struct Alignments {
    activity_key: ActivityKey,
    alignments: Vec<Vec<Move>>,
}

impl Alignments {
    pub fn new(activity_key: ActivityKey) -> Self {
        Self {
            activity_key: activity_key,
            alignments: vec![],
        }
    }

    pub fn push(&mut self, alignment: Vec<Move>) {
        self.alignments.push(alignment);
    }

    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Vec<Move>> {
        self.alignments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<Move>> {
        self.alignments.iter()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_activity_key_mut(&mut self) -> &mut ActivityKey {
        &mut self.activity_key
    }

    /**
     * The events of the trace that the alignment covers, in order.
     */
    pub fn get_log_projection(&self, index: usize) -> Option<Vec<&str>> {
        self.alignments.get(index).map(|moves| {
            moves
                .iter()
                .filter_map(|movee| movee.get_activity())
                .map(|activity| self.activity_key.get_activity_label(&activity))
                .collect()
        })
    }
}

impl Exportable for Alignments {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for Alignments {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of alignments\t{}", self.len())?;
        writeln!(
            f,
            "Number of moves\t\t{}",
            self.alignments.iter().map(|moves| moves.len()).sum::<usize>()
        )?;
        writeln!(
            f,
            "Number of log moves\t{}",
            self.alignments
                .iter()
                .flatten()
                .filter(|movee| matches!(movee, Move::LogMove(_)))
                .count()
        )?;
        Ok(write!(f, "")?)
    }
}

impl Display for Alignments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of alignments\n{}", self.alignments.len())?;

        for (i, moves) in self.alignments.iter().enumerate() {
            writeln!(f, "# alignment {}", i)?;
            writeln!(f, "# number of moves\n{}", moves.len())?;

            for (j, movee) in moves.iter().enumerate() {
                writeln!(f, "# move {}", j)?;

                match movee {
                    Move::SynchronousMove(activity, transition) => {
                        writeln!(f, "synchronous move")?;
                        writeln!(f, "label {}", self.activity_key.get_activity_label(activity))?;
                        writeln!(f, "{}", transition)?;
                    }
                    Move::LogMove(activity) => {
                        writeln!(f, "log move")?;
                        writeln!(f, "label {}", self.activity_key.get_activity_label(activity))?;
                    }
                    Move::ModelMove(transition) => {
                        writeln!(f, "model move")?;
                        writeln!(f, "{}", transition)?;
                    }
                };
            }
        }

        write!(f, "")
    }
}

impl FromStr for Alignments {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Importable for Alignments {
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

        let mut result = Alignments::new(ActivityKey::new());
        let number_of_alignments = lreader
            .next_line_index()
            .context("failed to read number of alignments")?;

        for i in 0..number_of_alignments {
            let number_of_moves = lreader
                .next_line_index()
                .with_context(|| format!("failed to read number of moves of alignment {}", i))?;

            let mut moves = Vec::with_capacity(number_of_moves);
            for j in 0..number_of_moves {
                let kind = lreader
                    .next_line_string()
                    .with_context(|| format!("failed to read type of move {} of alignment {}", j, i))?;

                let movee = match kind.trim() {
                    "synchronous move" => {
                        let label = lreader.next_line_prefixed("label").with_context(|| {
                            format!("failed to read label of move {} of alignment {}", j, i)
                        })?;
                        let transition = Self::read_transition(&mut lreader, i, j)?;
                        Move::SynchronousMove(result.activity_key.process_activity(&label), transition)
                    }
                    "log move" => {
                        let label = lreader.next_line_prefixed("label").with_context(|| {
                            format!("failed to read label of move {} of alignment {}", j, i)
                        })?;
                        Move::LogMove(result.activity_key.process_activity(&label))
                    }
                    "model move" => Move::ModelMove(Self::read_transition(&mut lreader, i, j)?),
                    _ => {
                        return Err(anyhow!(
                            "unknown type of move `{}` at line {}; expected `synchronous move`, `log move` or `model move`",
                            lreader.get_last_line(),
                            lreader.get_last_line_number()
                        ));
                    }
                };
                moves.push(movee);
            }
            result.alignments.push(moves);
        }

        Ok(result)
    }
}

impl Alignments {
    fn read_transition(lreader: &mut LineReader, alignment: usize, movee: usize) -> Result<String> {
        let transition = lreader.next_line_string().with_context(|| {
            format!("failed to read transition of move {} of alignment {}", movee, alignment)
        })?;
        let transition = transition.trim();
        if transition.is_empty() {
            return Err(anyhow!(
                "empty transition id at line {}",
                lreader.get_last_line_number()
            ));
        }
        Ok(transition.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{Alignments, Move};

    #[test]
    fn import_alignments() {
        let fin = fs::read_to_string("testfiles/choice.ali").unwrap();
        let alignments = fin.parse::<Alignments>().unwrap();

        assert_eq!(alignments.len(), 4);
        assert_eq!(alignments.get_log_projection(3).unwrap(), vec!["a", "x", "c"]);

        let moves = alignments.get(3).unwrap();
        assert!(matches!(moves[1], Move::LogMove(_)));
        assert_eq!(moves[1].get_transition_id(), None);
        assert_eq!(moves[2], Move::ModelMove("tau".to_string()));
    }

    #[test]
    fn display_round_trip() {
        let fin = fs::read_to_string("testfiles/choice.ali").unwrap();
        let alignments = fin.parse::<Alignments>().unwrap();
        let alignments2 = alignments.to_string().parse::<Alignments>().unwrap();

        assert_eq!(alignments.to_string(), alignments2.to_string());
    }

    #[test]
    fn unknown_move() {
        assert!("alignments\n1\n1\nstrange move\n".parse::<Alignments>().is_err());
    }
}
