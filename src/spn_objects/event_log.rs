use anyhow::{Context, Error, Result, anyhow};
use std::{
    fmt,
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

pub const HEADER: &str = "event log";

/// An ordered collection of traces, each an ordered sequence of activities.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    activity_key: ActivityKey,
    traces: Vec<Vec<Activity>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            activity_key: ActivityKey::new(),
            traces: vec![],
        }
    }

    pub fn push_trace(&mut self, trace: &[&str]) {
        let trace = trace
            .iter()
            .map(|label| self.activity_key.process_activity(label))
            .collect();
        self.traces.push(trace);
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn get_trace(&self, trace_index: usize) -> Option<&Vec<Activity>> {
        self.traces.get(trace_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<Activity>> {
        self.traces.iter()
    }

    pub fn get_activity_key(&self) -> &ActivityKey {
        &self.activity_key
    }

    pub fn get_number_of_events(&self) -> usize {
        self.traces.iter().map(|trace| trace.len()).sum()
    }
}

impl Exportable for EventLog {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for EventLog {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of traces\t{}", self.len())?;
        writeln!(f, "Number of events\t{}", self.get_number_of_events())?;
        writeln!(f, "Number of activities\t{}", self.activity_key.get_number_of_activities())?;
        Ok(write!(f, "")?)
    }
}

impl fmt::Display for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "# number of traces\n{}", self.traces.len())?;

        for (i, trace) in self.traces.iter().enumerate() {
            writeln!(f, "# trace {}", i)?;
            writeln!(f, "# number of events\n{}", trace.len())?;
            for activity in trace {
                writeln!(f, "label {}", self.activity_key.get_activity_label(activity))?;
            }
        }

        write!(f, "")
    }
}

impl FromStr for EventLog {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Importable for EventLog {
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

        let mut result = EventLog::new();
        let number_of_traces = lreader
            .next_line_index()
            .context("failed to read number of traces")?;

        for trace_index in 0..number_of_traces {
            let number_of_events = lreader.next_line_index().with_context(|| {
                format!("failed to read number of events of trace {}", trace_index)
            })?;

            let mut trace = Vec::with_capacity(number_of_events);
            for event in 0..number_of_events {
                let label = lreader.next_line_prefixed("label").with_context(|| {
                    format!("failed to read event {} of trace {}", event, trace_index)
                })?;
                trace.push(result.activity_key.process_activity(&label));
            }
            result.traces.push(trace);
        }

        Ok(result)
    }
}
