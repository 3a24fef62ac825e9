//! Command-line configuration.

use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::matcher::{validate_pattern, MatchMode, PatternError};
use crate::search::{default_worker_count, SearchConfig};

/// Generate Curve25519 (WireGuard) keypairs whose base64 public key
/// matches a pattern.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// String to search for in the public key (A-Z, a-z, 0-9, +, /; case-insensitive)
    pub pattern: String,

    /// Stop after finding N keypairs (0 = run until Ctrl+C)
    #[arg(short = 'c', long = "targetcount", default_value = "5")]
    pub target_count: u64,

    /// Match method: startswith or contains
    #[arg(short = 'm', long = "matchmethod", default_value = "startswith")]
    pub match_method: MatchMode,

    /// Number of worker threads (default: CPU cores minus one)
    #[arg(short = 'w', long = "workercount")]
    pub workers: Option<usize>,

    /// Progress report interval in seconds (0 = off)
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count minus one
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    /// Returns the target count, mapping 0 to an unbounded search
    pub fn target_count(&self) -> u64 {
        if self.target_count == 0 {
            SearchConfig::UNBOUNDED
        } else {
            self.target_count
        }
    }

    /// Returns the log level selected by -v / -q.
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pattern(&self.pattern)?;

        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkerCount);
        }

        Ok(())
    }

    /// Builds the search parameters.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.pattern.as_str(), self.match_method)
            .with_target_count(self.target_count())
            .with_worker_count(self.worker_count())
            .with_report_interval(Duration::from_secs(self.report_interval))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),
    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("wg-vanity").chain(args.iter().copied());
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["test"]);
        assert_eq!(config.pattern, "test");
        assert_eq!(config.target_count(), 5);
        assert_eq!(config.match_method, MatchMode::Prefix);
        assert_eq!(config.worker_count(), default_worker_count());
        assert_eq!(config.log_level(), LevelFilter::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_long_options() {
        let config = parse(&["00", "--targetcount=2", "--matchmethod", "contains", "--workercount", "3"]);
        let search = config.search_config();
        assert_eq!(search.pattern, "00");
        assert_eq!(search.target_count, 2);
        assert_eq!(search.mode, MatchMode::Contains);
        assert_eq!(search.worker_count, 3);
    }

    #[test]
    fn test_short_options() {
        let config = parse(&["ab", "-c", "1", "-m", "startswith", "-w", "2", "-v"]);
        assert_eq!(config.target_count(), 1);
        assert_eq!(config.worker_count(), 2);
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_zero_count_is_unbounded() {
        let config = parse(&["ab", "-c", "0"]);
        assert!(config.search_config().is_unbounded());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(parse(&["test!"]).validate().is_err());
        assert!(parse(&["ab", "-w", "0"]).validate().is_err());
        assert!(Config::try_parse_from(["wg-vanity", "ab", "-m", "endswith"]).is_err());
        assert!(Config::try_parse_from(["wg-vanity", "ab", "-v", "-q"]).is_err());
        assert!(Config::try_parse_from(["wg-vanity"]).is_err());
    }

    #[test]
    fn test_quiet() {
        assert_eq!(parse(&["ab", "-q"]).log_level(), LevelFilter::Error);
    }
}
