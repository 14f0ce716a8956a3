use std::{io, path::PathBuf};

use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{error, info};

use crate::{
    app,
    config::Config,
    constants::HISTORY_SETTINGS,
    domain::Records,
    error::TrackerError,
    storage,
    time_format::{format_date, format_span, parse_span},
};

#[derive(Parser, Debug)]
#[command(name = "studytime")]
#[command(about = "Study time tracker with a live readout and daily history", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Record log path for this run")]
    file: Option<PathBuf>,

    #[arg(long, global = true, value_name = "H:MM:SS", help = "Daily target for this run")]
    target: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Run the live readout (default)")]
    Ui,

    #[command(about = "Show the average tracked time per calendar day")]
    Average,

    #[command(about = "Show daily totals")]
    History {
        #[arg(long, help = "Only show the most recent days")]
        days: Option<usize>,
    },

    #[command(about = "Show today's session, total and remaining time")]
    Status,

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

/// Loads the config file, creating it on first use, and applies command
/// line overrides for this run only.
fn resolve_config(cli: &Cli) -> Result<Config, TrackerError> {
    let config_path = cli.config.clone().unwrap_or_else(storage::get_config_path);
    let mut config = Config::load_or_init(&config_path)?;

    if let Some(file) = &cli.file {
        config.record_file = std::env::current_dir()?.join(file);
    }
    if let Some(target) = &cli.target {
        parse_span(target)?;
        config.expected_span = target.clone();
    }
    Ok(config)
}

fn load_records(config: &Config) -> Result<Records, TrackerError> {
    let tracker = config.tracker(&storage::get_data_dir())?;
    Records::load(tracker, Local::now().naive_local())
}

pub fn run_ui(config: &Config) -> Result<(), TrackerError> {
    let records = load_records(config)?;
    info!(path = %records.config().log_path.display(), "starting ui");
    app::run_ui(records, config)
}

pub fn print_average(config: &Config) -> Result<(), TrackerError> {
    let records = load_records(config)?;
    let average = records.daily_average(Local::now().naive_local())?;
    println!("{}", average);
    Ok(())
}

pub fn print_history(config: &Config, days: Option<usize>) -> Result<(), TrackerError> {
    let records = load_records(config)?;
    let max_seconds = records.max_total().num_seconds().max(0) as u64;
    let skip = days.map_or(0, |days| records.day_count().saturating_sub(days));

    for record in records.iter().skip(skip) {
        println!(
            "{}  {:>9}  {}",
            format_date(record.date()),
            format_span(record.total()),
            text_bar(record.total_seconds(), max_seconds, HISTORY_SETTINGS.text_bar_width)
        );
    }
    println!("{}", "-".repeat(40));
    println!("{:10}  {:>9}", "MAX", records.format_max_span());
    Ok(())
}

pub fn print_status(config: &Config) -> Result<(), TrackerError> {
    let records = load_records(config)?;
    let [session, total, left] = records.formatted_spans();
    println!("{:10} {:>9}", "session", session);
    println!("{:10} {:>9}", "total", total);
    println!("{:10} {:>9}", "remaining", left);
    Ok(())
}

/// A bar of `#` proportional to `seconds / max_seconds`.
fn text_bar(seconds: u64, max_seconds: u64, width: usize) -> String {
    if max_seconds == 0 {
        return String::new();
    }
    let filled = (seconds.min(max_seconds) as u128 * width as u128 / max_seconds as u128) as usize;
    "#".repeat(filled)
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    };
    clap_complete::generate(shell, &mut Cli::command(), "studytime", &mut io::stdout());
    Ok(())
}

fn exit_on_error<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn run_cli() {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = &cli.command {
        exit_on_error(print_completions(shell));
        return;
    }

    let result = resolve_config(&cli).and_then(|config| match &cli.command {
        None | Some(Command::Ui) => run_ui(&config),
        Some(Command::Average) => print_average(&config),
        Some(Command::History { days }) => print_history(&config, *days),
        Some(Command::Status) => print_status(&config),
        Some(Command::Completions { .. }) => Ok(()),
    });
    exit_on_error(result);
}
