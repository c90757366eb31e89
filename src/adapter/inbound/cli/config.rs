//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use super::command::ConfigCommand;
use super::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../stockflow.toml.example");

pub fn execute(path: &Path, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init { force } => execute_init(path, *force),
        ConfigCommand::Show => execute_show(path),
        ConfigCommand::Validate => execute_validate(path),
    }
}

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::hint(&format!(
        "run {} to check it",
        output::highlight(format!("stockflow -c {} config validate", path.display()))
    ));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load_or_default(path)?;

    if output::record("config", &config) {
        return Ok(());
    }

    if !path.exists() {
        output::hint(&format!("{} not found, showing defaults", path.display()));
    }
    output::section("Effective Configuration");
    output::lines(&config.to_toml()?);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    Config::load(path)?;
    output::success(&format!("{} is valid", path.display()));
    Ok(())
}
