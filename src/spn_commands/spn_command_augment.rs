use anyhow::Context;

use crate::{
    spn_framework::{
        spn_command::{SpnCommand, SpnInputType, SpnOutput},
        spn_object::SpnObject,
    },
    techniques::augmentation::Augment,
};

pub const SPN_AUGMENT: SpnCommand = SpnCommand::Command {
    name_short: "aug",
    name_long: Some("augment"),
    explanation_short: "Add the <START> and <END> transitions to a Petri net.",
    explanation_long: Some(
        "Add the <START> and <END> transitions to a Petri net, such that every run starts by firing <START> and ends by firing <END>. The result is a Petri net again.",
    ),
    cli_command: None,
    input_types: &[SpnInputType::PetriNet],
    input_names: &["NET"],
    input_helps: &["The Petri net, with an initial and a final marking."],
    execute: |mut inputs, _| {
        let net = inputs.remove(0).to_petri_net()?;
        let augmented = net.augment().context("Augmenting the net.")?;
        Ok(SpnOutput::Object(SpnObject::AugmentedNet(augmented)))
    },
};
