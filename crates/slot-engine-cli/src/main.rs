//! `slots` CLI -- inspect what a room's availability rules actually offer.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a rules file exported from the reservation API
//! slots check -i room-12.json
//!
//! # Day statuses for a month grid
//! slots --now 2026-03-10T08:00 dates --from 2026-03-01 --to 2026-03-31 -i room-12.json
//!
//! # Start times for a date (default marked with *)
//! cat room-12.json | slots starts --date 2026-03-16
//!
//! # End times for a chosen start, as JSON
//! slots ends --date 2026-03-16 --start 09:00 --json -i room-12.json
//! ```
//!
//! `--timezone` (or `SLOTS_TIMEZONE`) sets the portal timezone. It gives the
//! default "now" and the local date of rule dates sent as UTC timestamps.
//! `--now` (or `SLOTS_NOW`) pins "now" instead.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_engine::rule::{self, AvailabilityRule};
use slot_engine::{clock, DayStatus};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Availability and slot engine CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// IANA timezone of the portal
    #[arg(long, global = true, env = "SLOTS_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// Local "now" as YYYY-MM-DDTHH:MM (defaults to the wall clock)
    #[arg(long, global = true, env = "SLOTS_NOW")]
    now: Option<String>,
}

#[derive(Args)]
struct RulesInput {
    /// Rules JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every rule strictly
    Check {
        #[command(flatten)]
        rules: RulesInput,
    },
    /// Print the status of each date in a range
    Dates {
        #[command(flatten)]
        rules: RulesInput,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the bookable start times for a date
    Starts {
        #[command(flatten)]
        rules: RulesInput,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the valid end times for a start time
    Ends {
        #[command(flatten)]
        rules: RulesInput,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Chosen start time (HH:MM)
        #[arg(long)]
        start: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct DayStatusDto {
    date: NaiveDate,
    status: DayStatus,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let tz = clock::parse_timezone(&cli.timezone)?;

    match cli.command {
        Commands::Check { rules } => {
            let rules = read_rules(rules.input.as_deref(), tz)?;
            rule::validate_rules(&rules).context("Rules failed validation")?;
            println!("ok: {} rules", rules.len());
        }
        Commands::Dates {
            rules,
            from,
            to,
            json,
        } => {
            let rules = rule::retain_valid(read_rules(rules.input.as_deref(), tz)?);
            let now = resolve_now(cli.now.as_deref(), tz)?;
            let from = parse_date_arg(&from)?;
            let to = parse_date_arg(&to)?;
            let statuses = slot_engine::day_statuses(&rules, from, to, now);

            if json {
                let dtos: Vec<DayStatusDto> = statuses
                    .into_iter()
                    .map(|(date, status)| DayStatusDto { date, status })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&dtos)?);
            } else {
                for (date, status) in statuses {
                    println!("{} {}", date, status);
                }
            }
        }
        Commands::Starts { rules, date, json } => {
            let rules = rule::retain_valid(read_rules(rules.input.as_deref(), tz)?);
            let now = resolve_now(cli.now.as_deref(), tz)?;
            let date = parse_date_arg(&date)?;
            let options = slot_engine::start_times(&rules, date, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&options.summary())?);
            } else if options.is_empty() {
                eprintln!("No available slots on {}", date);
            } else {
                let default = options.default_start();
                for time in options.times() {
                    let marker = if Some(time) == default { " *" } else { "" };
                    println!("{}{}", time.format(rule::TIME_FORMAT), marker);
                }
            }
        }
        Commands::Ends {
            rules,
            date,
            start,
            json,
        } => {
            let rules = rule::retain_valid(read_rules(rules.input.as_deref(), tz)?);
            let now = resolve_now(cli.now.as_deref(), tz)?;
            let date = parse_date_arg(&date)?;
            let start = parse_time_arg(&start)?;
            let ends: Vec<String> = slot_engine::end_times_for(&rules, date, start, now)
                .into_iter()
                .map(|t| t.format(rule::TIME_FORMAT).to_string())
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&ends)?);
            } else if ends.is_empty() {
                eprintln!("No available durations for {}", start.format(rule::TIME_FORMAT));
            } else {
                for end in ends {
                    println!("{}", end);
                }
            }
        }
    }

    Ok(())
}

/// Local "now": the pinned value if given, else the wall clock in `tz`.
fn resolve_now(pinned: Option<&str>, tz: Tz) -> Result<NaiveDateTime> {
    match pinned {
        Some(raw) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .with_context(|| format!("Invalid --now value: {}", raw)),
        None => Ok(clock::local_now(tz)),
    }
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, rule::DATE_FORMAT)
        .with_context(|| format!("Invalid date: {} (expected YYYY-MM-DD)", raw))
}

fn parse_time_arg(raw: &str) -> Result<NaiveTime> {
    Ok(rule::parse_time_of_day(raw)?)
}

fn read_rules(path: Option<&str>, tz: Tz) -> Result<Vec<AvailabilityRule>> {
    let json = read_input(path)?;
    let rules = rule::rules_from_json_in(&json, tz)?;
    tracing::debug!("loaded {} rules", rules.len());
    Ok(rules)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
