use anyhow::{Context, Error, Result};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt,
    io::{self, BufRead},
    str::FromStr,
};

use crate::{
    json,
    spn_framework::{exportable::Exportable, importable::Importable, infoable::Infoable},
};

/// Caller-supplied firing weights, keyed by transition id.
///
/// The file format is a JSON object with a `weights` field, e.g. `{"weights": {"t1": 2, "t2": 0.5}}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightTable {
    weights: BTreeMap<String, f64>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, transition_id: impl Into<String>, weight: f64) {
        self.weights.insert(transition_id.into(), weight);
    }

    pub fn get(&self, transition_id: &str) -> Option<f64> {
        self.weights.get(transition_id).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(|key| key.as_str())
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for WeightTable {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self {
            weights: iter
                .into_iter()
                .map(|(key, weight)| (key.into(), weight))
                .collect(),
        }
    }
}

impl Importable for WeightTable {
    fn import(reader: &mut dyn BufRead) -> Result<Self> {
        let json: Value = serde_json::from_reader(reader).context("failed to parse JSON")?;
        let weights = json::read_field_object(&json, "weights")?;

        let mut result = WeightTable::new();
        for (transition_id, value) in weights {
            let weight = json::read_weight(value)
                .with_context(|| format!("failed to read the weight of transition `{}`", transition_id))?;
            result.insert(transition_id.clone(), weight);
        }
        Ok(result)
    }
}

impl FromStr for WeightTable {
    type Err = Error;

    fn from_str(s: &str) -> std::prelude::v1::Result<Self, Self::Err> {
        let mut reader = io::Cursor::new(s);
        Self::import(&mut reader)
    }
}

impl Exportable for WeightTable {
    fn export(&self, f: &mut dyn std::io::Write) -> Result<()> {
        Ok(write!(f, "{}", self)?)
    }
}

impl Infoable for WeightTable {
    fn info(&self, f: &mut impl std::io::Write) -> Result<()> {
        writeln!(f, "Number of weights\t{}", self.len())?;
        writeln!(f, "Total weight\t\t{}", self.weights.values().sum::<f64>())?;
        Ok(write!(f, "")?)
    }
}

impl fmt::Display for WeightTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::json!({ "weights": self.weights });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => Err(fmt::Error),
        }
    }
}
