//! Curve25519 key generation and encoding.
//!
//! This module provides:
//! - Secure random X25519 keypair generation
//! - Standard base64 encoding of key material
//! - The `KeySource` seam used by workers to obtain keypairs

mod encoding;
mod keypair;

pub use encoding::{encode_key, ENCODED_KEY_LEN, SIGNIFICANT_KEY_CHARS};
pub use keypair::{KeyError, KeySource, Keypair, OsKeySource};
