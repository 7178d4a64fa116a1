use anyhow::Context;
use clap::{Arg, ArgAction, Command, value_parser};

use crate::{
    spn_commands::spn_command_weights::{cli_weights, read_weight_configuration},
    spn_framework::{
        spn_command::{SpnCommand, SpnInputType, SpnOutput},
        spn_object::SpnObject,
    },
    techniques::{
        augmentation::Augment,
        sample::{SimulationParameters, simulate_reproducibly},
        token_game::DEFAULT_MAX_STEPS,
        weights::AssignWeights,
    },
};

pub const ARG_ID_SEED: &str = "seed";
pub const ARG_ID_MAX_STEPS: &str = "max-steps";

pub const SPN_SIMULATE: SpnCommand = SpnCommand::Command {
    name_short: "sim",
    name_long: Some("simulate"),
    explanation_short: "Generate a log by playing the token game on a Petri net.",
    explanation_long: Some(
        "Generate a log by playing the token game on a Petri net. The net is augmented with <START> and <END> transitions, each transition gets a firing weight, and every trace is a run from the initial to the final marking. Each row of the result is a case id, an activity and a position in the total order of all events.",
    ),
    cli_command: Some(|command| cli_max_steps(cli_seed(cli_weights(command)))),
    input_types: &[SpnInputType::PetriNet, SpnInputType::Usize],
    input_names: &["NET", "NUMBER_OF_TRACES"],
    input_helps: &[
        "The Petri net, with an initial and a final marking.",
        "The number of traces to generate.",
    ],
    execute: |mut inputs, cli_matches| {
        let net = inputs.remove(0).to_petri_net()?;
        let number_of_traces = inputs.remove(0).to_usize()?;
        let configuration = read_weight_configuration(cli_matches)?;

        let augmented = net.augment().context("Augmenting the net.")?;
        let snet = augmented
            .assign_weights(&configuration)
            .with_context(|| format!("Assigning {} weights.", configuration.mode))?;

        let parameters = SimulationParameters {
            number_of_traces,
            seed: cli_matches.get_one::<u64>(ARG_ID_SEED).copied(),
            max_steps: cli_matches
                .get_one::<usize>(ARG_ID_MAX_STEPS)
                .copied()
                .unwrap_or(DEFAULT_MAX_STEPS),
            show_progress: true,
        };
        let log = simulate_reproducibly(&snet, &parameters)?;

        Ok(SpnOutput::Object(SpnObject::SimulatedLog(log)))
    },
};

pub fn cli_seed(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_ID_SEED)
            .action(ArgAction::Set)
            .value_name("NUMBER")
            .short('s')
            .long("seed")
            .help("Seed the random source; a fixed seed gives a fixed log.")
            .value_parser(value_parser!(u64))
            .required(false),
    )
}

pub fn cli_max_steps(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_ID_MAX_STEPS)
            .action(ArgAction::Set)
            .value_name("NUMBER")
            .long("max-steps")
            .help("Give up on a trace that has not reached the final marking after this many firings.")
            .default_value(DEFAULT_MAX_STEPS.to_string())
            .value_parser(value_parser!(usize))
            .required(false),
    )
}
