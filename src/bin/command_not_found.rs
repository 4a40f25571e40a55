//! Shell hook entry point.
//!
//! Invoked by the shell's `command_not_found_handle` with the name it could
//! not resolve. Runnable commands replace this process; anything else is
//! reported on stdout and the process exits 127.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use command_not_found::config::{Settings, parse_seconds};
use command_not_found::i18n::{MSG_EXEC_FAILED, MSG_TOO_LONG, Translator};
use command_not_found::{
    Backend, EXIT_FAILURE, ExecPlan, HostProber, InputError, Outcome, Pipeline, exit_code,
    render_json, render_text,
};
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CNF_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "command-not-found",
    version,
    about = "Suggest a fix or a package for a command the shell could not find"
)]
struct Cli {
    /// Package metadata source.
    #[arg(long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Metadata snapshot location.
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Regenerate the snapshot when it is older than this.
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    max_age: Option<Duration>,

    /// Number of similar packages to list.
    #[arg(long, value_name = "N")]
    max_results: Option<usize>,

    /// Regenerate the snapshot and exit.
    #[arg(long)]
    rebuild_cache: bool,

    /// Print the outcome as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Report what would run instead of running it.
    #[arg(long)]
    no_exec: bool,

    /// Command the shell could not resolve.
    #[arg(required_unless_present = "rebuild_cache")]
    command: Option<OsString>,
}

fn parse_backend(raw: &str) -> Result<Backend> {
    Backend::try_from(raw)
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging();

    let settings = apply_overrides(Settings::from_env(), &cli);
    let tr = settings.translator();
    let store = settings.store();

    if cli.rebuild_cache {
        store.rebuild().context("rebuilding package metadata cache")?;
        tracing::info!(path = %store.cache().path().display(), "rebuilt metadata cache");
        return Ok(0);
    }

    // Names that are not UTF-8 are looked up in their lossy form.
    let raw = cli
        .command
        .as_deref()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    let prober = HostProber::from_env();
    let pipeline = Pipeline::new(&prober, &store, settings.policy, settings.max_results);

    let outcome = match pipeline.resolve(&raw) {
        Ok(outcome) => outcome,
        Err(err @ InputError::TooLong { .. }) => {
            tracing::debug!("{err}");
            eprintln!("{}", tr.tr(MSG_TOO_LONG));
            return Ok(EXIT_FAILURE);
        }
        Err(err) => {
            eprintln!("{err}");
            return Ok(EXIT_FAILURE);
        }
    };

    print_outcome(&outcome, tr.as_ref(), &settings, cli.json)?;

    match outcome {
        Outcome::Execute(plan) if !cli.no_exec => exec(&plan, tr.as_ref()),
        other => Ok(exit_code(&other)),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    if let Some(cache) = &cli.cache {
        settings.cache_path = Some(cache.clone());
    }
    if let Some(max_age) = cli.max_age {
        settings.max_age = max_age;
    }
    if let Some(max_results) = cli.max_results {
        settings.max_results = max_results;
    }
    settings
}

fn print_outcome(
    outcome: &Outcome,
    tr: &dyn Translator,
    settings: &Settings,
    json: bool,
) -> Result<()> {
    let text = if json {
        let mut rendered = render_json(outcome)?;
        rendered.push('\n');
        rendered
    } else {
        render_text(outcome, tr, &settings.hints)
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Replace this process with `plan`; only returns on failure.
fn exec(plan: &ExecPlan, tr: &dyn Translator) -> Result<i32> {
    tracing::debug!(command = %plan.command, "exec");
    let err = Command::new(&plan.program).exec();
    Err(anyhow!(err).context(format!("{}: {}", tr.tr(MSG_EXEC_FAILED), plan.command)))
}
