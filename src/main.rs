//! WireGuard Vanity Key Generator CLI
//!
//! Usage:
//!   wg-vanity -c 1 test              # One key whose public key starts with "test"
//!   wg-vanity -c 1 test -m contains  # One key whose public key contains "test"
//!   wg-vanity -c 0 abc               # Keep searching until Ctrl+C

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use wg_vanity::{Config, Coordinator, Match, MatchMode, Pattern};

fn main() {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_env("RUST_LOG")
        .init();

    log::debug!("config: {:?}", config);

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let search = config.search_config();
    let pattern = Pattern::new(search.pattern.as_str(), search.mode);
    let location = match search.mode {
        MatchMode::Prefix => "at the beginning of the public key",
        MatchMode::Contains => "in the public key",
    };

    // Print startup info
    println!("WireGuard Vanity Key Generator");
    println!("==============================");
    println!("Pattern:    {:?} {}", pattern.pattern(), location);
    println!(
        "Difficulty: {} (~{} keys per match)",
        pattern.difficulty_description(),
        format_number(pattern.estimated_attempts())
    );
    println!("Workers:    {}", search.worker_count);
    if search.is_unbounded() {
        println!("Target:     unlimited (Ctrl+C to stop)");
    } else {
        println!("Target:     {} key pair(s)", search.target_count);
    }
    println!();

    let coordinator = Coordinator::new();
    ctrlc_handler(coordinator.stop_handle());

    let report = match coordinator.search(&search, print_result) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if report.interrupted {
        println!("\nStopped by user.");
    } else {
        println!("\nTarget reached! Found {} key pair(s).", report.matches.len());
    }

    for found in &report.matches {
        log::debug!("{:?}", found);
    }

    // Print final stats
    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(report.keys_generated));
    println!("Total matches found:  {}", report.matches_found);
    println!("Time elapsed:         {:.2}s", report.elapsed.as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(report.keys_per_second() as u64)
    );
}

fn print_result(found: &Match) {
    println!(
        "[{}]\tPrivate: {}\t|\tPublic: {}",
        found.sequence, found.private_b64, found.public_b64
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }
}
