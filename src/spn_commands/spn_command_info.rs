use std::io::Write;

use crate::spn_framework::{
    infoable::Infoable,
    spn_command::{SpnCommand, SpnInputType, SpnOutput},
};

pub const SPN_INFO: SpnCommand = SpnCommand::Command {
    name_short: "info",
    name_long: Some("information"),
    explanation_short: "Show information about a file.",
    explanation_long: None,
    cli_command: None,
    input_types: &[SpnInputType::AnyObject],
    input_names: &["FILE"],
    input_helps: &[
        "A Petri net, an event log, a list of alignments, a weight table or a simulated log.",
    ],
    execute: |mut inputs, _| {
        let object = inputs.remove(0).to_object()?;
        let mut f = vec![];

        writeln!(
            f,
            "Object was recognised as {} {}.",
            object.get_type().get_article(),
            object.get_type()
        )?;
        object.info(&mut f)?;

        Ok(SpnOutput::String(String::from_utf8(f)?))
    },
};
