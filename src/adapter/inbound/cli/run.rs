//! Handler for the `run` command.

use std::path::Path;

use tracing::info;

use super::command::RunArgs;
use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime;

/// Execute the run command.
pub async fn execute(config_path: &Path, args: &RunArgs) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    apply_run_overrides(&mut config, args, output::is_json());
    config.init_logging();

    print_startup_config(&config, args);
    let services = Services::build(&config)?;

    if args.once {
        let mut reconciler = services.reconciler().await?;
        let report = reconciler.poll_once().await?;
        if !output::record("reconcile", &serde_json::json!({
            "records": report.records,
            "applied": report.applied,
            "duplicates": report.duplicates,
            "failed": report.failed,
            "skipped": report.skipped,
        })) {
            output::success(&format!(
                "Processed {} records ({} applied, {} failed)",
                report.records, report.applied, report.failed
            ));
        }
        return Ok(());
    }

    info!(group = %config.events.consumer_group, "stockflow starting");
    runtime::run(&services).await?;
    info!("stockflow stopped");
    Ok(())
}

fn apply_run_overrides(config: &mut Config, args: &RunArgs, force_json_logs: bool) {
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs || force_json_logs {
        config.logging.format = "json".to_string();
    }
}

fn print_startup_config(config: &Config, args: &RunArgs) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Storage", format!("{:?}", config.storage).to_lowercase());
    if output::verbosity() > 0 {
        output::field("Database", &config.database);
    }
    output::field("Topic", &config.events.topic);
    output::field(
        "Member",
        format!(
            "{} of {} in {}",
            config.events.member_index + 1,
            config.events.members,
            config.events.consumer_group
        ),
    );
    output::field(
        "Idempotent",
        if config.reconciler.idempotent { "yes" } else { "no" },
    );

    if !config.reconciler.invalidate_cache && config.cache.enabled {
        output::warning("Cached products are not invalidated after stock changes");
    }
    if !args.once {
        output::hint(&format!("press {} to stop", output::highlight("Ctrl+C")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_logging_settings() {
        let mut config = Config::default();
        let args = RunArgs {
            once: false,
            log_level: Some("debug".into()),
            json_logs: false,
        };
        apply_run_overrides(&mut config, &args, true);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }
}
