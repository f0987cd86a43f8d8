// ABOUTME: Command-line interface definitions using clap
// ABOUTME: One subcommand per dump tool plus connection and logging flags

use crate::convert::reflection::ReflectionMode;
use crate::filter::DateRange;
use crate::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tasks-dump")]
#[command(
    about = "Dump Tasks Collector observations, events and reflections to markdown",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (replaces the default search path)
    #[arg(long, global = true, env = "TASKS_COLLECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API user name
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// API password (prefer TASKS_COLLECTOR_PASSWORD or the config file)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Disable throttling
    #[arg(long, global = true)]
    pub no_throttle: bool,

    /// Throttle range in ms (min:max)
    #[arg(
        long,
        global = true,
        value_parser = parse_throttle_range,
        conflicts_with = "no_throttle"
    )]
    pub throttle_ms: Option<(u64, u64)>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_throttle_range(s: &str) -> std::result::Result<(u64, u64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected format: min:max".into());
    }

    let min = parts[0].parse().map_err(|_| "Invalid min value")?;
    let max = parts[1].parse().map_err(|_| "Invalid max value")?;

    if min > max {
        return Err("min must be <= max".into());
    }

    Ok((min, max))
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(short = 'd', long = "from", value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(short = 'D', long = "to", value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Whole calendar year; wins over --from/--to
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=9999))]
    pub year: Option<i32>,
}

impl RangeArgs {
    pub fn range(&self) -> Result<DateRange> {
        DateRange::from_flags(self.from, self.to, self.year)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write one markdown file per observation
    #[command(alias = "observationdump")]
    Observations {
        /// Destination directory (must exist)
        path: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Single observation by id
        #[arg(long, conflicts_with = "stream")]
        pk: Option<u64>,

        /// All observations of one event stream
        #[arg(long)]
        stream: Option<String>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Only open observations
        #[arg(long, conflicts_with = "closed")]
        open: bool,

        /// Only closed observations
        #[arg(long)]
        closed: bool,
    },

    /// Write daily notes grouped into one file per month
    #[command(alias = "eventdump")]
    Events {
        /// Destination directory; stdout when omitted
        path: Option<PathBuf>,

        #[command(flatten)]
        range: RangeArgs,

        /// Thread to dump (default from config)
        #[arg(short = 'T', long)]
        thread: Option<String>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Aggregate a week, month or range into one reflection note
    #[command(alias = "reflectiondump")]
    Reflection {
        /// Destination directory; stdout when omitted
        path: Option<PathBuf>,

        #[command(flatten)]
        range: RangeArgs,

        /// Week (Monday to Sunday) containing --from
        #[arg(short, long, conflicts_with_all = ["month", "year"])]
        week: bool,

        /// Month containing --from, read from the weekly thread
        #[arg(short, long, conflicts_with = "year")]
        month: bool,

        /// Thread to read (default from config)
        #[arg(short = 'T', long)]
        thread: Option<String>,

        /// Leave journal entries out
        #[arg(long)]
        skip_journals: bool,

        /// Only print dates without a reflection
        #[arg(short = 'M', long)]
        missing: bool,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Print habit tags
    #[command(alias = "habit-list")]
    Habits {
        /// Output file, `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
    },
}

pub fn reflection_mode(week: bool, month: bool) -> ReflectionMode {
    match (week, month) {
        (true, _) => ReflectionMode::Week,
        (_, true) => ReflectionMode::Month,
        _ => ReflectionMode::Range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_throttle_range_valid() {
        let result = parse_throttle_range("100:300").unwrap();
        assert_eq!(result, (100, 300));
    }

    #[test]
    fn test_parse_throttle_range_invalid() {
        assert!(parse_throttle_range("300:100").is_err());
        assert!(parse_throttle_range("abc:def").is_err());
        assert!(parse_throttle_range("100").is_err());
    }

    #[test]
    fn test_observations_flags() {
        let cli = Cli::try_parse_from([
            "tasks-dump",
            "observations",
            "out",
            "-d",
            "2024-01-01",
            "-D",
            "2024-01-31",
            "--closed",
            "-f",
        ])
        .unwrap();

        match cli.command {
            Commands::Observations { path, range, force, closed, open, .. } => {
                assert_eq!(path, PathBuf::from("out"));
                assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert!(force && closed && !open);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_original_tool_names_are_aliases() {
        let cli = Cli::try_parse_from(["tasks-dump", "eventdump", "-T", "Weekly"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Events { thread: Some(ref t), .. } if t == "Weekly"
        ));
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Cli::try_parse_from([
            "tasks-dump",
            "observations",
            "out",
            "--pk",
            "1",
            "--stream",
            "s",
        ])
        .is_err());
        assert!(
            Cli::try_parse_from(["tasks-dump", "observations", "out", "--open", "--closed"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["tasks-dump", "reflection", "-w", "-m"]).is_err());
        assert!(Cli::try_parse_from(["tasks-dump", "reflection", "-m", "--year", "2024"]).is_err());
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Cli::try_parse_from(["tasks-dump", "events", "-d", "05/01/2024"]).is_err());
        assert!(Cli::try_parse_from(["tasks-dump", "events", "--year", "0"]).is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["tasks-dump", "-vv", "habits"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_connection_flags_are_global() {
        let cli = Cli::try_parse_from([
            "tasks-dump",
            "habits",
            "--url",
            "https://tasks.example.com/",
            "--user",
            "me",
            "--password",
            "hunter2",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://tasks.example.com/"));
        assert_eq!(cli.user.as_deref(), Some("me"));
        assert_eq!(cli.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_reflection_mode() {
        assert_eq!(reflection_mode(true, false), ReflectionMode::Week);
        assert_eq!(reflection_mode(false, true), ReflectionMode::Month);
        assert_eq!(reflection_mode(false, false), ReflectionMode::Range);
    }
}
