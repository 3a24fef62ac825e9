//! # wg_vanity
//!
//! Parallel Curve25519 vanity key generator. Searches for keypairs whose
//! base64 public key starts with, or contains, a chosen string, as used
//! for WireGuard peers.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation and base64 encoding
//! - `matcher`: Pattern validation and matching
//! - `worker`: Shared counter, result channel and worker pool
//! - `search`: The coordinator driving one search
//! - `config`: Command-line configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod search;
pub mod worker;

pub use config::Config;
pub use crypto::{KeyError, KeySource, Keypair, OsKeySource};
pub use matcher::{validate_pattern, MatchMode, Pattern, PatternError};
pub use search::{Coordinator, SearchConfig, SearchError, SearchReport};
pub use worker::{Match, SearchCounter, WorkerPool};
