use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use bulk_transform::{
    Cause, Cli, Command, Config, ConfigManager, DiagnosticListener, HRef, LoggingReporter,
    ReportingConfig, ResourceClient, SourceLocator, StrictReporter, VerbosityLevel, parse_document,
};

fn main() -> Result<ExitCode> {
    // Logging to stderr, stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulk_transform=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();
    let config = ConfigManager::load_config(&cli).context("Failed to load configuration")?;

    match &cli.command {
        Command::Href {
            reference,
            base,
            check,
        } => run_href(&config, reference, base.as_deref(), *check),
        Command::Check { files } => run_check(&config, files),
    }
}

fn run_href(config: &Config, reference: &str, base: Option<&str>, check: bool) -> Result<ExitCode> {
    let href = HRef::new(reference);
    let show = |part: Option<String>| part.unwrap_or_else(|| "(none)".to_string());

    println!("path: {}", show(href.path()));
    println!("name: {}", show(href.name()));
    println!("anchor: {}", show(href.anchor()));

    if check {
        let context = match base {
            Some(base) => Url::parse(base).with_context(|| format!("Invalid base URL: {base}"))?,
            None => {
                let cwd = std::env::current_dir().context("Cannot determine working directory")?;
                Url::from_directory_path(&cwd)
                    .map_err(|_| anyhow!("Cannot express {} as a URL", cwd.display()))?
            }
        };
        let client = ResourceClient::new((&config.network).into());
        let exists = href.open_stream_in_with(&context, &client).is_ok();
        println!("exists: {exists}");
    }

    Ok(ExitCode::SUCCESS)
}

fn run_check(config: &Config, files: &[PathBuf]) -> Result<ExitCode> {
    let mut reporter = reporter_for(&config.reporting)?;
    let verbose = config.reporting.verbosity >= VerbosityLevel::Verbose;
    let mut failures = 0usize;

    for file in files {
        let system_id = system_id_for(file);
        let checked = std::fs::read_to_string(file)
            .map_err(|e| {
                Cause::from_error(&e).with_locator(SourceLocator::new().with_system_id(&system_id))
            })
            .and_then(|text| parse_document(&text, Some(&system_id)).map(|_| ()));

        match checked {
            Ok(()) => {
                tracing::debug!(file = %file.display(), "well-formed");
                if verbose {
                    println!("{}: ok", file.display());
                }
            }
            Err(cause) => {
                failures += 1;
                if reporter.error(&cause)?.is_abort() {
                    break;
                }
            }
        }
    }

    if verbose {
        println!("{} checked, {} failed", files.len(), failures);
    }
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logging reporter appending to the log file when one is configured
fn reporter_for(reporting: &ReportingConfig) -> Result<Box<dyn DiagnosticListener>> {
    match &reporting.log_file {
        Some(path) => {
            let log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            Ok(Box::new(
                LoggingReporter::new(log).with_verbosity(reporting.verbosity),
            ))
        }
        None => Ok(Box::new(
            StrictReporter::console().with_verbosity(reporting.verbosity),
        )),
    }
}

fn system_id_for(file: &Path) -> String {
    std::path::absolute(file)
        .ok()
        .and_then(|path| Url::from_file_path(path).ok())
        .map(String::from)
        .unwrap_or_else(|| file.display().to_string())
}
