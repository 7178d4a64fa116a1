use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::PossibleValuesParser, value_parser};
use itertools::Itertools;
use std::path::PathBuf;
use strum::IntoEnumIterator;

use crate::{
    spn_framework::{
        importable::Importable,
        spn_command::{SpnCommand, SpnInputType, SpnOutput},
        spn_object::SpnObject,
    },
    spn_objects::{alignments::Alignments, event_log::EventLog, weight_table::WeightTable},
    techniques::{
        augmentation::Augment,
        weights::{AssignWeights, WeightConfiguration, WeightMode},
    },
};

pub const ARG_ID_WEIGHTS: &str = "weights";
pub const ARG_ID_LOG: &str = "log";
pub const ARG_ID_ALIGNMENTS: &str = "alignments";
pub const ARG_ID_MANUAL: &str = "manual";

pub const SPN_WEIGHTS: SpnCommand = SpnCommand::Command {
    name_short: "wei",
    name_long: Some("weights"),
    explanation_short: "Augment a Petri net and show the firing weight of each transition.",
    explanation_long: Some(
        "Augment a Petri net and show the firing weight of each transition. Written to a .json file, the weights can be edited and passed back with --manual.",
    ),
    cli_command: Some(cli_weights),
    input_types: &[SpnInputType::PetriNet],
    input_names: &["NET"],
    input_helps: &["The Petri net, with an initial and a final marking."],
    execute: |mut inputs, cli_matches| {
        let net = inputs.remove(0).to_petri_net()?;
        let configuration = read_weight_configuration(cli_matches)?;
        let augmented = net.augment().context("Augmenting the net.")?;
        let snet = augmented
            .assign_weights(&configuration)
            .with_context(|| format!("Assigning {} weights.", configuration.mode))?;
        Ok(SpnOutput::Object(SpnObject::StochasticPetriNet(snet)))
    },
};

/**
 * Adds the arguments that select and feed a weight mode.
 */
pub fn cli_weights(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ID_WEIGHTS)
                .action(ArgAction::Set)
                .value_name("MODE")
                .short('w')
                .long("weights")
                .help(format!(
                    "How firing weights are obtained: one of {}.",
                    WeightMode::iter().join(", ")
                ))
                .default_value(WeightMode::Uniform.to_string())
                .value_parser(PossibleValuesParser::new([
                    "uniform",
                    "equal",
                    "frequency",
                    "manual",
                    "manually",
                ]))
                .required(false),
        )
        .arg(
            Arg::new(ARG_ID_LOG)
                .action(ArgAction::Set)
                .value_name("FILE")
                .short('l')
                .long("log")
                .help("The reference event log, for frequency weights.")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
        .arg(
            Arg::new(ARG_ID_ALIGNMENTS)
                .action(ArgAction::Set)
                .value_name("FILE")
                .short('a')
                .long("alignments")
                .help("The alignments of the reference event log to the net, for frequency weights.")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
        .arg(
            Arg::new(ARG_ID_MANUAL)
                .action(ArgAction::Set)
                .value_name("FILE")
                .short('m')
                .long("manual")
                .help("A JSON file with a weight for each transition id, for manual weights.")
                .value_parser(value_parser!(PathBuf))
                .required(false),
        )
}

/**
 * Reads the weight mode and the files it needs. Whether the inputs are complete is checked when the weights are assigned.
 */
pub fn read_weight_configuration(cli_matches: &ArgMatches) -> Result<WeightConfiguration> {
    let mode = match cli_matches.get_one::<String>(ARG_ID_WEIGHTS) {
        Some(mode) => WeightMode::parse(mode)?,
        None => WeightMode::Uniform,
    };

    let mut configuration = WeightConfiguration::uniform();
    configuration.mode = mode;

    if let Some(path) = cli_matches.get_one::<PathBuf>(ARG_ID_LOG) {
        log::info!("Reading reference log");
        configuration.reference_log = Some(EventLog::import_from_file(path)?);
    }
    if let Some(path) = cli_matches.get_one::<PathBuf>(ARG_ID_ALIGNMENTS) {
        log::info!("Reading alignments");
        configuration.alignments = Some(Alignments::import_from_file(path)?);
    }
    if let Some(path) = cli_matches.get_one::<PathBuf>(ARG_ID_MANUAL) {
        log::info!("Reading manual weights");
        configuration.manual_weights = Some(WeightTable::import_from_file(path)?);
    }

    if mode != WeightMode::Frequency
        && (configuration.reference_log.is_some() || configuration.alignments.is_some())
    {
        log::warn!("the reference log and alignments are only used for frequency weights");
    }
    if mode != WeightMode::Manual && configuration.manual_weights.is_some() {
        log::warn!("the manual weights are only used in manual mode");
    }

    Ok(configuration)
}

#[cfg(test)]
mod tests {
    use clap::Command;

    use crate::techniques::weights::WeightMode;

    use super::{cli_weights, read_weight_configuration};

    #[test]
    fn frequency_configuration() {
        let matches = cli_weights(Command::new("test"))
            .try_get_matches_from([
                "test",
                "--weights",
                "frequency",
                "--log",
                "testfiles/choice.log",
                "--alignments",
                "testfiles/choice.ali",
            ])
            .unwrap();

        let configuration = read_weight_configuration(&matches).unwrap();
        assert_eq!(configuration.mode, WeightMode::Frequency);
        assert_eq!(configuration.reference_log.unwrap().len(), 4);
        assert_eq!(configuration.alignments.unwrap().len(), 4);
        assert!(configuration.manual_weights.is_none());
    }

    #[test]
    fn default_is_uniform() {
        let matches = cli_weights(Command::new("test"))
            .try_get_matches_from(["test"])
            .unwrap();
        let configuration = read_weight_configuration(&matches).unwrap();
        assert_eq!(configuration.mode, WeightMode::Uniform);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(
            cli_weights(Command::new("test"))
                .try_get_matches_from(["test", "--weights", "random"])
                .is_err()
        );
    }
}
