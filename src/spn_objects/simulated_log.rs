use anyhow::{Context, Error, Result, anyhow};
use serde::Serialize;
use std::{
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use crate::spn_framework::{
    activity_key::{Activity, ActivityKey},
    exportable::Exportable,
    importable::Importable,
    infoable::Infoable,
};

pub const HEADER: &str = "case:concept:name\tconcept:name\tposition";

/// One row of a simulated log: an activity of a case, at a position in the total order over all events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulatedEvent {
    #[serde(rename = "case:concept:name")]
    pub case_id: String,
    #[serde(rename = "concept:name")]
    pub activity: String,
    pub position: usize,
}

/// The traces of a batch of simulated instances. Case `i` (counting from 0) has case id `i + 1`.
#[derive(Clone, Debug, Default)]
pub struct SimulatedLog {
    activity_key: ActivityKey,
    traces: Vec<Vec<Activity>>,
}

impl SimulatedLog {
    pub fn new(activity_key: ActivityKey, traces: Vec<Vec<Activity>>) -> Self {
        Self {
            activity_key,
            traces,
        }
    }

    pub fn get_case_id(case_index: usize) -> String {
        (case_index + 1).to_string()
    }

    pub fn number_of_cases(&self) -> usize {
        self.traces.len()
    }

    pub fn get_number_of_events(&self) -> usize {
        self.traces.iter().map(|trace| trace.len()).sum()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_trace(&self, case_index: usize) -> Option<Vec<&str>> {
        self.traces
            .get(case_index)
            .map(|trace| self.activity_key.deprocess_trace(trace))
    }

    pub fn get_traces(&self) -> Vec<Vec<&str>> {
        self.traces
            .iter()
            .map(|trace| self.activity_key.deprocess_trace(trace))
            .collect()
    }

    /**
     * Flattens the traces in case order. Positions count up from 0 over the whole log, not per case.
     */
    pub fn get_events(&self) -> Vec<SimulatedEvent> {
        self.traces
            .iter()
            .enumerate()
            .flat_map(|(case_index, trace)| {
                trace.iter().map(move |activity| (case_index, activity))
            })
            .enumerate()
            .map(|(position, (case_index, activity))| SimulatedEvent {
                case_id: Self::get_case_id(case_index),
                activity: self.activity_key.get_activity_label(activity).to_string(),
                position,
            })
            .collect()
    }

    pub fn export_json(&self, f: &mut dyn std::io::Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *f, &self.get_events())
            .context("failed to serialise the simulated log")?;
        Ok(writeln!(f)?)
    }
}

impl Exportable for SimulatedLog {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for SimulatedLog {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of cases\t\t{}", self.number_of_cases())?;
        writeln!(f, "Number of events\t{}", self.get_number_of_events())?;
        writeln!(
            f,
            "Number of activities\t{}",
            self.activity_key.get_number_of_activities()
        )?;
        writeln!(
            f,
            "Empty traces\t\t{}",
            self.traces.iter().filter(|trace| trace.is_empty()).count()
        )?;
        if let Some(longest) = self.traces.iter().map(|trace| trace.len()).max() {
            writeln!(f, "Longest trace\t\t{}", longest)?;
        }
        Ok(write!(f, "")?)
    }
}

impl fmt::Display for SimulatedLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        for event in self.get_events() {
            writeln!(f, "{}\t{}\t{}", event.case_id, event.activity, event.position)?;
        }
        write!(f, "")
    }
}

impl FromStr for SimulatedLog {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Importable for SimulatedLog {
    /**
     * Reads the tab-separated table. Cases without events have no rows; they are restored from the gaps
     * between case ids, except for empty cases at the very end.
     */
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let mut lines = reader.lines().enumerate();

        match lines.next() {
            Some((_, Ok(line))) if line.trim_end() == HEADER => {}
            Some((_, line)) => {
                return Err(anyhow!(
                    "first line should be exactly `{}`, but found `{}`",
                    HEADER.escape_debug(),
                    line?.escape_debug()
                ));
            }
            None => return Err(anyhow!("premature end of file")),
        }

        let mut result = SimulatedLog::default();
        let mut last_position = None;
        for (line_no, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.trim_end_matches('\r').split('\t');
            let (case_id, activity, position) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(case_id), Some(activity), Some(position), None) => (case_id, activity, position),
                _ => {
                    return Err(anyhow!(
                        "line {} should have three tab-separated fields; found `{}`",
                        line_no + 1,
                        line
                    ));
                }
            };

            let case_index = case_id
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|id| id.checked_sub(1))
                .with_context(|| format!("line {} has an invalid case id `{}`", line_no + 1, case_id))?;
            let position = position
                .trim()
                .parse::<usize>()
                .with_context(|| format!("line {} has an invalid position `{}`", line_no + 1, position))?;

            if last_position.is_some_and(|last| last >= position) {
                return Err(anyhow!("line {} does not increase the position", line_no + 1));
            }
            if case_index + 1 < result.traces.len() {
                return Err(anyhow!(
                    "line {} returns to case {}, which was already closed",
                    line_no + 1,
                    case_id
                ));
            }
            last_position = Some(position);

            while result.traces.len() <= case_index {
                result.traces.push(vec![]);
            }
            let activity = result.activity_key.process_activity(activity);
            result.traces[case_index].push(activity);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::spn_framework::{activity_key::ActivityKey, exportable::Exportable};

    use super::{SimulatedEvent, SimulatedLog};

    fn log() -> SimulatedLog {
        let mut key = ActivityKey::new();
        let a = key.process_activity("a");
        let b = key.process_activity("b");
        SimulatedLog::new(key, vec![vec![a, b], vec![], vec![b]])
    }

    #[test]
    fn positions_are_global() {
        let events = log().get_events();

        assert_eq!(
            events,
            vec![
                SimulatedEvent {
                    case_id: "1".to_string(),
                    activity: "a".to_string(),
                    position: 0
                },
                SimulatedEvent {
                    case_id: "1".to_string(),
                    activity: "b".to_string(),
                    position: 1
                },
                SimulatedEvent {
                    case_id: "3".to_string(),
                    activity: "b".to_string(),
                    position: 2
                },
            ]
        );
    }

    #[test]
    fn table_round_trip() {
        let log = log();
        let table = log.to_string();
        assert_eq!(
            table,
            "case:concept:name\tconcept:name\tposition\n1\ta\t0\n1\tb\t1\n3\tb\t2\n"
        );

        let log2 = table.parse::<SimulatedLog>().unwrap();
        assert_eq!(log2.get_traces(), log.get_traces());
    }

    #[test]
    fn json_columns() {
        let mut out = vec![];
        log().export_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json[2]["case:concept:name"], "3");
        assert_eq!(json[2]["concept:name"], "b");
        assert_eq!(json[2]["position"], 2);
    }

    #[test]
    fn rejects_reopened_case() {
        let table = "case:concept:name\tconcept:name\tposition\n1\ta\t0\n2\tb\t1\n1\tb\t2\n";
        assert!(table.parse::<SimulatedLog>().is_err());
        assert!(log().export_to_string().unwrap().parse::<SimulatedLog>().is_ok());
    }
}
