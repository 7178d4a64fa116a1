use anyhow::{Context, Result};
use clap::{Args, FromArgMatches, crate_version};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use env_logger::Builder;

use spn_simulator::spn_framework::spn_command::SPN_COMMANDS;

pub fn main() -> Result<()> {
    let command = SPN_COMMANDS.build_cli();
    let command = Verbosity::<InfoLevel>::augment_args(command.version(crate_version!()));
    let cli_matches = command.get_matches();

    let verbosity = Verbosity::<InfoLevel>::from_arg_matches(&cli_matches)?;
    Builder::new()
        .filter_level(verbosity.log_level_filter())
        .init();

    log::info!("spn_simulator starting");

    SPN_COMMANDS
        .execute(&cli_matches)
        .context("Executing spn_simulator")
}
