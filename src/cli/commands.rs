//! Command dispatch

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{ReportOptions, ReportOutput, ReportService};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::render_forest;
use crate::infrastructure::{InfraError, RealRecordSource};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                let settings = load_settings(cli, false)?;
                output::info(&settings.to_toml()?);
                Ok(())
            }
            ConfigCommands::Path => {
                let path = global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?;
                output::info(&path.display());
                Ok(())
            }
        },
        Some(Commands::Tree) => {
            let settings = load_settings(cli, false)?;
            _tree(&settings)
        }
        Some(Commands::Report {
            pretty,
            timing,
            output,
        }) => {
            let settings = load_settings(cli, *pretty)?;
            _report(&settings, *timing, output.as_deref())
        }
        None => {
            let settings = load_settings(cli, false)?;
            _report(&settings, false, None)
        }
    }
}

fn load_settings(cli: &Cli, pretty: bool) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.companies.clone(),
        cli.travels.clone(),
        pretty,
    );
    settings.validate()?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn run_report(settings: &Settings) -> CliResult<ReportOutput> {
    let source = RealRecordSource::new(Duration::from_secs(settings.timeout_secs))?;
    let service = ReportService::new(Arc::new(source), ReportOptions::from(settings));
    let report = service.build()?;

    if report.stats.companies_rejected > 0 || report.stats.travels_rejected > 0 {
        output::warning(&format!(
            "skipped {} malformed company and {} malformed travel records",
            report.stats.companies_rejected, report.stats.travels_rejected
        ));
    }
    Ok(report)
}

#[instrument(skip(settings))]
fn _report(settings: &Settings, timing: bool, output_path: Option<&Path>) -> CliResult<()> {
    let report = run_report(settings)?;

    let json = if settings.pretty {
        serde_json::to_string_pretty(&report.roots)
    } else {
        serde_json::to_string(&report.roots)
    }
    .map_err(|e| InfraError::io("serialize report", io::Error::other(e)))?;

    match output_path {
        Some(path) => std::fs::write(path, format!("{json}\n"))
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?,
        None => output::info(&json),
    }

    if timing {
        output::timing(report.stats.elapsed);
    }
    fail_on_cycle(report)
}

#[instrument(skip(settings))]
fn _tree(settings: &Settings) -> CliResult<()> {
    let report = run_report(settings)?;
    output::header(&format!(
        "{} companies, {} roots, total cost {}",
        report.stats.companies,
        report.stats.roots,
        report.stats.total_cost.normalize()
    ));
    output::info(render_forest(&report.roots).trim_end());
    fail_on_cycle(report)
}

/// The reachable forest is printed first; a detached cycle still fails the run.
fn fail_on_cycle(report: ReportOutput) -> CliResult<()> {
    match report.cycle {
        Some(cycle) => Err(ApplicationError::Domain(cycle).into()),
        None => Ok(()),
    }
}
