use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::{
    fmt::{Debug, Display},
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    spn_commands::{
        spn_command_augment, spn_command_info, spn_command_simulate, spn_command_weights,
    },
    spn_framework::{
        exportable::Exportable,
        spn_object::{self, SpnObject},
    },
    spn_objects::petri_net::PetriNet,
};

pub const SPN_COMMANDS: SpnCommand = SpnCommand::Group {
    name_short: "spn",
    name_long: None,
    explanation_short: "Generates synthetic event logs by simulating stochastic Petri nets.",
    explanation_long: None,
    children: &[
        &spn_command_augment::SPN_AUGMENT,
        &spn_command_info::SPN_INFO,
        &spn_command_simulate::SPN_SIMULATE,
        &spn_command_weights::SPN_WEIGHTS,
    ],
};

pub const ARG_SHORT_OUTPUT: char = 'o';
pub const ARG_ID_OUTPUT: &str = "output";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpnInputType {
    PetriNet,
    AnyObject,
    Usize,
}

pub enum SpnInput {
    PetriNet(PetriNet),
    Object(SpnObject),
    Usize(usize),
}

impl SpnInput {
    pub fn to_petri_net(self) -> Result<PetriNet> {
        match self {
            SpnInput::PetriNet(net) => Ok(net),
            _ => Err(anyhow!("input is not a Petri net")),
        }
    }

    pub fn to_object(self) -> Result<SpnObject> {
        match self {
            SpnInput::Object(object) => Ok(object),
            SpnInput::PetriNet(net) => Ok(SpnObject::PetriNet(net)),
            SpnInput::Usize(_) => Err(anyhow!("input is not an object")),
        }
    }

    pub fn to_usize(self) -> Result<usize> {
        match self {
            SpnInput::Usize(value) => Ok(value),
            _ => Err(anyhow!("input is not a number")),
        }
    }
}

pub enum SpnOutput {
    String(String),
    Object(SpnObject),
}

pub enum SpnCommand {
    Group {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        children: &'static [&'static SpnCommand],
    },
    Command {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        cli_command: Option<fn(command: Command) -> Command>, //an output -o argument is always added

        input_types: &'static [SpnInputType], //one per fixed-position input parameter
        input_names: &'static [&'static str],
        input_helps: &'static [&'static str],

        execute: fn(inputs: Vec<SpnInput>, cli_matches: &ArgMatches) -> Result<SpnOutput>,
    },
}

impl SpnCommand {
    pub fn build_cli(&self) -> Command {
        let mut command;
        match self {
            SpnCommand::Group {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                children,
            } => {
                let name = if let Some(x) = name_long { x } else { name_short };
                command = Command::new(name)
                    .about(explanation_short)
                    .subcommand_required(true)
                    .allow_external_subcommands(false);

                if name_long.is_some() {
                    command = command.alias(name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(l);
                }

                for child in children.iter() {
                    command = command.subcommand(child.build_cli());
                }
            }
            SpnCommand::Command {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                cli_command,
                input_types,
                input_names,
                input_helps,
                ..
            } => {
                let name = if let Some(x) = name_long { x } else { name_short };
                command = Command::new(name).about(explanation_short);

                if name_long.is_some() {
                    command = command.alias(name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(l);
                }

                for (i, (input_name, (input_type, input_help))) in input_names
                    .iter()
                    .zip(input_types.iter().zip(input_helps.iter()))
                    .enumerate()
                {
                    let arg = Arg::new(format!("{}x{}", input_name, i))
                        .action(ArgAction::Set)
                        .value_name(input_name)
                        .help(input_help)
                        .required(true);
                    let arg = match input_type {
                        SpnInputType::Usize => arg.value_parser(value_parser!(usize)),
                        SpnInputType::PetriNet | SpnInputType::AnyObject => {
                            arg.value_parser(value_parser!(PathBuf))
                        }
                    };

                    command = command.arg(arg);
                }

                if let Some(f) = cli_command {
                    command = (f)(command);
                }

                command = command.arg(
                    Arg::new(ARG_ID_OUTPUT)
                        .short(ARG_SHORT_OUTPUT)
                        .long(ARG_ID_OUTPUT)
                        .action(ArgAction::Set)
                        .value_name("FILE")
                        .help("Saves the result to a file; a file ending in .json is written as JSON.")
                        .required(false)
                        .value_parser(value_parser!(PathBuf)),
                );
            }
        };
        command
    }

    pub fn long_name(&self) -> &str {
        match self {
            SpnCommand::Group {
                name_short,
                name_long,
                ..
            }
            | SpnCommand::Command {
                name_short,
                name_long,
                ..
            } => match name_long {
                Some(x) => x,
                None => name_short,
            },
        }
    }

    pub fn execute(&self, cli_matches: &ArgMatches) -> Result<()> {
        match self {
            SpnCommand::Group { children, .. } => {
                for child in children.iter() {
                    if let Some(sub_matches) = cli_matches.subcommand_matches(child.long_name()) {
                        return child.execute(sub_matches);
                    }
                }
            }
            SpnCommand::Command {
                input_types,
                input_names,
                execute,
                ..
            } => {
                //read the inputs
                let mut inputs = vec![];
                for (i, (input_type, input_name)) in
                    input_types.iter().zip(input_names.iter()).enumerate()
                {
                    let cli_id = format!("{}x{}", input_name, i);
                    log::info!("Reading {}", input_name);
                    let input = Self::read_input(input_type, cli_matches, &cli_id)
                        .with_context(|| format!("Reading parameter {}.", input_name))?;
                    inputs.push(input);
                }

                log::info!("Starting {}", self.long_name());

                let result = (execute)(inputs, cli_matches)?;

                if let Some(to_file) = cli_matches.get_one::<PathBuf>(ARG_ID_OUTPUT) {
                    log::info!("Writing result to {:?}", to_file);
                    export_to_file(&result, to_file)?;
                } else {
                    let mut out = std::io::stdout().lock();
                    match result {
                        SpnOutput::String(string) => string.export(&mut out)?,
                        SpnOutput::Object(object) => object.export(&mut out)?,
                    }
                    out.flush()?;
                }

                return Ok(());
            }
        }
        Err(anyhow!("command not recognised"))
    }

    fn read_input(
        input_type: &SpnInputType,
        cli_matches: &ArgMatches,
        cli_id: &str,
    ) -> Result<SpnInput> {
        match input_type {
            SpnInputType::Usize => match cli_matches.get_one::<usize>(cli_id) {
                Some(value) => Ok(SpnInput::Usize(*value)),
                None => Err(anyhow!("argument was not given")),
            },
            SpnInputType::PetriNet => {
                let path = get_path(cli_matches, cli_id)?;
                let content = spn_object::read_input(path)?;
                let net = content
                    .parse::<PetriNet>()
                    .with_context(|| format!("Parsing `{}` as a Petri net.", path.display()))?;
                Ok(SpnInput::PetriNet(net))
            }
            SpnInputType::AnyObject => {
                let path = get_path(cli_matches, cli_id)?;
                let content = spn_object::read_input(path)?;
                Ok(SpnInput::Object(SpnObject::parse_any(&content)?))
            }
        }
    }
}

pub fn get_path<'a>(cli_matches: &'a ArgMatches, cli_id: &str) -> Result<&'a PathBuf> {
    cli_matches
        .try_get_one::<PathBuf>(cli_id)?
        .ok_or_else(|| anyhow!("No argument given, or it could not be parsed as a path."))
}

pub fn export_to_file(result: &SpnOutput, to_file: &Path) -> Result<()> {
    let file = File::create(to_file)
        .with_context(|| format!("could not create `{}`", to_file.display()))?;
    let mut writer = BufWriter::new(file);
    let as_json = to_file
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    match result {
        SpnOutput::String(string) => string.export(&mut writer)?,
        SpnOutput::Object(object) if as_json => object.export_json(&mut writer)?,
        SpnOutput::Object(object) => object.export(&mut writer)?,
    }
    Ok(writer.flush()?)
}

impl Display for SpnCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

impl Debug for SpnCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group {
                name_short,
                name_long,
                ..
            } => f
                .debug_struct("Group")
                .field("name_short", name_short)
                .field("name_long", name_long)
                .finish(),
            Self::Command {
                name_short,
                name_long,
                ..
            } => f
                .debug_struct("Command")
                .field("name_short", name_short)
                .field("name_long", name_long)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SPN_COMMANDS;

    #[test]
    fn cli_is_consistent() {
        SPN_COMMANDS.build_cli().debug_assert();
    }

    #[test]
    fn simulate_arguments() {
        let matches = SPN_COMMANDS
            .build_cli()
            .try_get_matches_from([
                "spn",
                "simulate",
                "testfiles/a-b.pn",
                "10",
                "--weights",
                "uniform",
                "--seed",
                "3",
            ])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "simulate");
        assert_eq!(sub_matches.get_one::<usize>("NUMBER_OF_TRACESx1"), Some(&10));
        assert_eq!(sub_matches.get_one::<u64>("seed"), Some(&3));
    }
}
