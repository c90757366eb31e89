//! CLI module graph and dispatch.

pub mod command;
pub mod config;
pub mod order;
pub mod output;
pub mod product;
pub mod run;

use std::path::Path;

use command::{Cli, ColorChoice, Commands};

use crate::domain::PageRequest;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::config::settings::Config;

/// Apply global flags and run the selected command.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&cli.config, &args).await,
        Commands::Product(command) => product::execute(&cli.config, command).await,
        Commands::Order(command) => order::execute(&cli.config, command).await,
        Commands::Config(command) => config::execute(&cli.config, &command),
    }
}

/// Load the configuration and wire services for a one-shot command.
pub(crate) fn open(config_path: &Path) -> Result<(Config, Services)> {
    let config = Config::load_or_default(config_path)?;
    let services = Services::build(&config)?;
    Ok((config, services))
}

pub(crate) fn page_request(page: command::PageArgs) -> Result<PageRequest> {
    Ok(PageRequest::new(page.page, page.limit)?)
}
