use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    io::{self, Read},
    path::Path,
};
use strum_macros::{Display, EnumIter};

use crate::{
    simulation_error::SimulationError,
    spn_framework::{exportable::Exportable, infoable::Infoable},
    spn_objects::{
        alignments::Alignments, augmented_net::AugmentedNet, event_log::EventLog,
        petri_net::PetriNet, simulated_log::SimulatedLog,
        stochastic_petri_net::StochasticPetriNet, weight_table::WeightTable,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum SpnObjectType {
    #[strum(to_string = "Petri net")]
    PetriNet,
    #[strum(to_string = "augmented Petri net")]
    AugmentedNet,
    #[strum(to_string = "stochastic Petri net")]
    StochasticPetriNet,
    #[strum(to_string = "event log")]
    EventLog,
    #[strum(to_string = "list of alignments")]
    Alignments,
    #[strum(to_string = "weight table")]
    WeightTable,
    #[strum(to_string = "simulated log")]
    SimulatedLog,
}

impl SpnObjectType {
    pub fn get_article(&self) -> &str {
        match self {
            SpnObjectType::AugmentedNet | SpnObjectType::EventLog => "an",
            _ => "a",
        }
    }
}

#[derive(Clone, Debug)]
pub enum SpnObject {
    PetriNet(PetriNet),
    AugmentedNet(AugmentedNet),
    StochasticPetriNet(StochasticPetriNet),
    EventLog(EventLog),
    Alignments(Alignments),
    WeightTable(WeightTable),
    SimulatedLog(SimulatedLog),
}

impl SpnObject {
    pub fn get_type(&self) -> SpnObjectType {
        match self {
            SpnObject::PetriNet(_) => SpnObjectType::PetriNet,
            SpnObject::AugmentedNet(_) => SpnObjectType::AugmentedNet,
            SpnObject::StochasticPetriNet(_) => SpnObjectType::StochasticPetriNet,
            SpnObject::EventLog(_) => SpnObjectType::EventLog,
            SpnObject::Alignments(_) => SpnObjectType::Alignments,
            SpnObject::WeightTable(_) => SpnObjectType::WeightTable,
            SpnObject::SimulatedLog(_) => SpnObjectType::SimulatedLog,
        }
    }

    /**
     * Attempts each of the file formats in turn. Augmented and stochastic nets are stored as plain nets,
     * so they are recognised as such.
     */
    pub fn parse_any(content: &str) -> Result<Self> {
        if let Ok(net) = content.parse::<PetriNet>() {
            return Ok(SpnObject::PetriNet(net));
        }
        if let Ok(log) = content.parse::<EventLog>() {
            return Ok(SpnObject::EventLog(log));
        }
        if let Ok(alignments) = content.parse::<Alignments>() {
            return Ok(SpnObject::Alignments(alignments));
        }
        if let Ok(log) = content.parse::<SimulatedLog>() {
            return Ok(SpnObject::SimulatedLog(log));
        }
        if let Ok(table) = content.parse::<WeightTable>() {
            return Ok(SpnObject::WeightTable(table));
        }
        Err(anyhow!(
            "file could not be recognised as a Petri net, an event log, a list of alignments, a simulated log or a weight table"
        ))
    }

    /**
     * Writes the object as JSON, for the object types that have a JSON form.
     */
    pub fn export_json(&self, f: &mut dyn io::Write) -> Result<()> {
        match self {
            SpnObject::SimulatedLog(log) => log.export_json(f),
            SpnObject::WeightTable(table) => table.export(f),
            SpnObject::StochasticPetriNet(net) => net.to_weight_table().export(f),
            _ => Err(SimulationError::Configuration(format!(
                "{} {} cannot be written as JSON",
                self.get_type().get_article(),
                self.get_type()
            ))
            .into()),
        }
    }
}

impl Exportable for SpnObject {
    fn export(&self, f: &mut dyn io::Write) -> Result<()> {
        match self {
            SpnObject::PetriNet(object) => object.export(f),
            SpnObject::AugmentedNet(object) => object.export(f),
            SpnObject::StochasticPetriNet(object) => object.export(f),
            SpnObject::EventLog(object) => object.export(f),
            SpnObject::Alignments(object) => object.export(f),
            SpnObject::WeightTable(object) => object.export(f),
            SpnObject::SimulatedLog(object) => object.export(f),
        }
    }
}

impl Infoable for SpnObject {
    fn info(&self, f: &mut impl io::Write) -> Result<()> {
        match self {
            SpnObject::PetriNet(object) => object.info(f),
            SpnObject::AugmentedNet(object) => object.info(f),
            SpnObject::StochasticPetriNet(object) => object.info(f),
            SpnObject::EventLog(object) => object.info(f),
            SpnObject::Alignments(object) => object.info(f),
            SpnObject::WeightTable(object) => object.info(f),
            SpnObject::SimulatedLog(object) => object.info(f),
        }
    }
}

/**
 * Reads a whole input file; `-` reads standard input.
 */
pub fn read_input(from_file: &Path) -> Result<String> {
    if from_file.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("could not read standard input")?;
        Ok(content)
    } else {
        fs::read_to_string(from_file)
            .with_context(|| format!("could not read file `{}`", from_file.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{SpnObject, SpnObjectType};

    #[test]
    fn recognise_files() {
        let cases = [
            ("testfiles/choice.pn", SpnObjectType::PetriNet),
            ("testfiles/choice.log", SpnObjectType::EventLog),
            ("testfiles/choice.ali", SpnObjectType::Alignments),
            ("testfiles/choice-weights.json", SpnObjectType::WeightTable),
        ];
        for (file, object_type) in cases {
            let content = fs::read_to_string(file).unwrap();
            let object = SpnObject::parse_any(&content).unwrap();
            assert_eq!(object.get_type(), object_type, "{}", file);
        }

        assert!(SpnObject::parse_any("nothing useful").is_err());
    }

    #[test]
    fn json_only_where_supported() {
        let content = fs::read_to_string("testfiles/a-b.pn").unwrap();
        let object = SpnObject::parse_any(&content).unwrap();
        let mut out = vec![];
        assert!(object.export_json(&mut out).is_err());
    }
}
