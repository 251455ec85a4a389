//! Command-line host for the weekly intention core.
//!
//! # Responsibility
//! - Open the store and mirror from configuration and run one command.
//! - Act as the main context: every save and reconciliation runs here.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use weekly_intention_core::{
    init_logging, AppConfig, Clock, IntentionApp, LogRefreshSignal, ManualClock, SystemClock,
    WeekStart,
};

const DEFAULT_DIR_NAME: &str = ".weekly_intention";

#[derive(Debug, Parser)]
#[command(name = "weekly-intention", version, about = "One intention per week")]
struct Cli {
    /// Data directory (overrides WEEKLY_INTENTION_HOME).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save the intention for a week; empty text clears it.
    Set {
        /// Any date inside the target week. Defaults to the current week.
        #[arg(long)]
        week: Option<NaiveDate>,
        text: Vec<String>,
    },
    /// Print the intention for a week.
    Show {
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// List past intentions, newest first, optionally filtered.
    Recall { query: Option<String> },
    /// Run the foreground-resume reconciliation pass.
    Foreground,
    /// Print what the companion surface would display.
    Widget,
    /// Print the mirrored snapshot as the companion process sees it.
    ///
    /// Sync status is not shown: a one-shot process never observes a
    /// reachability transition.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging(&config.log_level, &config.log_dir().to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let clock: Arc<dyn Clock> = match cli.today {
        Some(today) => Arc::new(ManualClock::on_day(today)),
        None => Arc::new(SystemClock),
    };
    let app = match IntentionApp::open(&config, clock, Arc::new(LogRefreshSignal)) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("fatal: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&app, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    let default_dir = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_DIR_NAME);
    let mut config = AppConfig::from_env(default_dir).map_err(|err| err.to_string())?;

    if let Some(dir) = &cli.data_dir {
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            std::env::current_dir()
                .map_err(|err| err.to_string())?
                .join(dir)
        };
        let overrides = AppConfig::new(dir).map_err(|err| err.to_string())?;
        config.data_dir = overrides.data_dir;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = weekly_intention_core::logging::normalize_level(level)?.to_string();
    }
    Ok(config)
}

fn run(app: &IntentionApp, command: Command) -> Result<(), String> {
    let pick_week = |date: Option<NaiveDate>| {
        date.map(WeekStart::containing)
            .unwrap_or_else(|| app.current_week())
    };

    match command {
        Command::Set { week, text } => {
            let week = pick_week(week);
            let text = text.join(" ");
            app.save(week, &text).map_err(|err| err.to_string())?;
            let saved = app.intention(week).map_err(|err| err.to_string())?;
            if saved.is_empty() {
                println!("{week}: cleared");
            } else {
                println!("{week}: {saved}");
            }
        }
        Command::Show { week } => {
            let week = pick_week(week);
            let text = app.intention(week).map_err(|err| err.to_string())?;
            println!(
                "Week {} ({} – {}): {}",
                week.iso_week_number(),
                week.date().format("%b %-d"),
                week.end().format("%b %-d"),
                if text.is_empty() {
                    "Set intention"
                } else {
                    text.as_str()
                }
            );
        }
        Command::Recall { query } => {
            let records = app
                .recall(query.as_deref().unwrap_or_default())
                .map_err(|err| err.to_string())?;
            if records.is_empty() {
                println!("No matching intentions");
            }
            for record in records {
                println!("{}  {}", record.week_start, record.text);
            }
        }
        Command::Foreground => {
            let outcome = app.resume_foreground();
            println!("reconcile: {outcome:?}");
        }
        Command::Widget => {
            println!("{}", app.companion().timeline().display_text());
        }
        Command::Status => {
            let snapshot = app.mirror().read();
            if !app.mirror().is_available() {
                warn!("event=cli_status module=cli status=skip reason=medium_unavailable");
            }
            println!(
                "mirror: week={} text={:?} updated_at={}",
                snapshot.week_start,
                snapshot.text,
                snapshot
                    .updated_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string())
            );
        }
    }
    Ok(())
}
