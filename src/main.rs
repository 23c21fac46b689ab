//! restbreak - A break reminder for the terminal
//!
//! Keeps three independent countdowns running:
//! - a short eye-rest break every 20 minutes
//! - a stretch break every hour
//! - an end-of-day break after 8 hours

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tracing::info;

use restbreak::cli::{Cli, Commands, ConfigCommand, ConsoleCommand, Display, RunArgs};
use restbreak::config::{AppConfig, ConfigStore};
use restbreak::daemon::{BreakManager, SchedulerRegistry, Ticker, TICK_PERIOD};
use restbreak::hooks::{ChannelNotifier, CommandHookInvoker, HookDispatcher};
use restbreak::types::BreakProgress;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            let store = open_store(cli.config.as_deref())?;
            run(store, args).await?;
        }
        Some(Commands::Status) => {
            let store = open_store(cli.config.as_deref())?;
            let configs = store.load_break_configs()?;
            Display::show_status(&configs, store.path());
        }
        Some(Commands::Config { action }) => {
            let store = open_store(cli.config.as_deref())?;
            execute_config(&store, action)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // Show help if no command is given
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn open_store(path: Option<&Path>) -> Result<ConfigStore> {
    match path {
        Some(path) => Ok(ConfigStore::new(path)),
        None => ConfigStore::open_default().map_err(|e| anyhow!("{} ({})", e, e.suggestion())),
    }
}

/// Executes a `config` subcommand.
fn execute_config(store: &ConfigStore, action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show => {
            let app = store.load()?;
            app.break_configs()?;
            app.active_hours()?;
            println!("{}", serde_json::to_string_pretty(&app)?);
        }
        ConfigCommand::Init { force } => {
            if store.exists() && !force {
                Display::show_config_exists(store.path());
            } else {
                store.save(&AppConfig::default())?;
                Display::show_config_written(store.path());
            }
        }
        ConfigCommand::Path => {
            println!("{}", store.path().display());
        }
        ConfigCommand::Enable { category } => {
            let config = store.set_break_enabled(category, true)?;
            Display::show_config_updated(&config);
        }
        ConfigCommand::Disable { category } => {
            let config = store.set_break_enabled(category, false)?;
            Display::show_config_updated(&config);
        }
        ConfigCommand::Set(args) => {
            let current = store.load()?.break_config(args.category)?;
            let config = args.apply_to(&current)?;
            store.save_break_config(&config)?;
            Display::show_config_updated(&config);
        }
    }
    Ok(())
}

/// Runs the scheduler until Ctrl-C or the tick limit.
async fn run(store: ConfigStore, args: RunArgs) -> Result<()> {
    let app = store.load()?;
    let configs = app.break_configs()?;
    let active_hours = app.active_hours()?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let registry = SchedulerRegistry::new();
    let scheduler = Arc::new(
        registry
            .create(configs.into_iter().map(BreakProgress::new), event_tx)?
            .with_active_hours(active_hours),
    );

    // Break notices are printed on their own thread, like a UI would
    let (notifier, notice_rx) = ChannelNotifier::channel();
    let printer = thread::Builder::new()
        .name("notices".to_string())
        .spawn(move || {
            for notice in notice_rx {
                Display::show_notice(&notice);
            }
        })
        .context("Failed to start notice thread")?;

    spawn_console(BreakManager::new(store, Arc::clone(&scheduler)))?;

    let mut dispatcher = HookDispatcher::new(
        CommandHookInvoker::new(app.hook_timeout_seconds),
        notifier,
        event_rx,
    );
    let period = Duration::from_millis(args.tick_millis);
    let ticker = if period == TICK_PERIOD {
        Ticker::new(Arc::clone(&scheduler))
    } else {
        Ticker::with_period(Arc::clone(&scheduler), period)
    };

    Display::show_run_started(args.ticks);
    tokio::select! {
        count = ticker.run(args.ticks) => {
            info!(count, "Tick limit reached");
        }
        _ = dispatcher.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
        }
    }

    scheduler.set_stopped(true);
    dispatcher.drain().await;
    drop(dispatcher);

    printer
        .join()
        .map_err(|_| anyhow!("Notice thread panicked"))?;
    Ok(())
}

/// Reads console commands from stdin on a background thread.
fn spawn_console(manager: BreakManager) -> Result<()> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line
                    .parse::<ConsoleCommand>()
                    .and_then(|command| command.execute(&manager))
                {
                    Ok(reply) => println!("{reply}"),
                    Err(e) => Display::show_error(&format!("{e:#}")),
                }
            }
        })
        .context("Failed to start console thread")?;
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
