// ABOUTME: CLI entrypoint for the tasks-dump command
// ABOUTME: Sets up logging, loads config, dispatches and maps errors to exit codes

use chrono::Local;
use clap::Parser;
use std::time::Duration;
use tasks_collector::{
    api::ApiClient,
    cli::{reflection_mode, Cli, Commands},
    config::{Config, Overrides},
    dump::{
        events::dump_events,
        observations::dump_observations,
        reflections::{
            default_thread, dump_reflection, missing_reflections, reflection_bounds,
            ReflectionRequest,
        },
    },
    filter::{ObservationFilter, Status},
    habits::list_habits,
    storage::OutputDir,
    Result,
};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("tasks-dump: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn client(cli: &Cli, config: &Config) -> Result<ApiClient> {
    let mut client = ApiClient::from_config(config)?;

    if cli.no_throttle {
        client = client.disable_throttle();
    } else if let Some((min, max)) = cli.throttle_ms {
        client = client.with_throttle(min, max);
    }
    Ok(client)
}

fn output_dir(path: Option<std::path::PathBuf>, force: bool) -> Result<Option<OutputDir>> {
    path.map(|p| OutputDir::open(p, force)).transpose()
}

fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        url: cli.url.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
    };
    let mut config = Config::load(cli.config.as_deref(), overrides)?;
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    let client = client(&cli, &config)?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Observations {
            path,
            range,
            pk,
            stream,
            force,
            open,
            closed,
        } => {
            let status = Status::from_flags(open, closed);
            let filter = ObservationFilter::new(range.range()?, pk, stream, status);
            let output = OutputDir::open(path, force)?;
            let summary = dump_observations(&client, &filter, &output)?;
            println!("{}", summary);
        }
        Commands::Events {
            path,
            range,
            thread,
            force,
        } => {
            let (from, to) = range.range()?.bounded(today);
            let thread = thread.unwrap_or_else(|| config.default_thread.clone());
            let output = output_dir(path, force)?;
            let summary = dump_events(&client, from, to, &thread, output.as_ref())?;
            if output.is_some() {
                println!("{}", summary);
            }
        }
        Commands::Reflection {
            path,
            range,
            week,
            month,
            thread,
            skip_journals,
            missing,
            force,
        } => {
            let mode = reflection_mode(week, month);
            let (from, to) = reflection_bounds(mode, &range.range()?, today);
            let thread = thread.unwrap_or_else(|| default_thread(mode, &config).to_string());

            if missing {
                for date in missing_reflections(&client, from, to, &thread)? {
                    println!("{}", date);
                }
                return Ok(());
            }

            let request = ReflectionRequest {
                from,
                to,
                mode,
                thread,
                skip_journals,
            };
            let output = output_dir(path, force)?;
            let summary = dump_reflection(&client, &request, output.as_ref())?;
            if output.is_some() {
                println!("{}", summary);
            }
        }
        Commands::Habits { output } => {
            list_habits(&client, &config.ignore_habits, &output)?;
        }
    }

    Ok(())
}
