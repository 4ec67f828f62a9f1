use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod config;
mod host;

use cli::Cli;
use config::{ConfigError, FileDefaults};
use host::IndicatifHost;
use pb_scheduler::{Scheduler, SchedulerConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("parabatch: {e:#}");
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(args: Cli) -> Result<()> {
    if !args.source.exists() {
        return Err(ConfigError::MissingSource(args.source.clone()).into());
    }

    let defaults = FileDefaults::load().context("loading .parabatch.toml")?;

    let destination = args
        .destination
        .clone()
        .unwrap_or_else(|| config::default_destination(&args.source));

    let shell = match args.shell.clone().or(defaults.shell) {
        Some(shell) => config::resolve_shell(shell)?,
        None => config::default_shell()?,
    };

    let processes = args.processes.or(defaults.processes).unwrap_or_else(config::default_processes);
    let retries = args.retries.or(defaults.retries).unwrap_or(0);
    let recreate = args.recreate() || defaults.recreate.unwrap_or(false);
    let stdin = args.stdin().unwrap_or_else(|| !args.command.contains("{}"));

    let items = pb_enumerate::work_items_from_path(&args.source).context("enumerating source")?;

    let scheduler_config = SchedulerConfig {
        destination,
        shell,
        command: args.command.clone(),
        processes,
        retries,
        recreate,
        stdin,
        wait_timeout: Duration::from_secs_f64(1.0),
        rng_seed: None,
    };

    let host = IndicatifHost::new(items.len() as u64);
    let mut scheduler = Scheduler::new(items, scheduler_config, host)?;
    scheduler.clear_queue()?;
    scheduler.host_mut().finish();

    Ok(())
}
