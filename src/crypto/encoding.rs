//! Base64 encoding of raw key bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Length of a padded base64 encoding of a 32-byte key.
pub const ENCODED_KEY_LEN: usize = 44;

/// Number of characters in an encoded key before the `=` padding.
pub const SIGNIFICANT_KEY_CHARS: usize = 43;

/// Encodes 32 key bytes with the standard, padded base64 alphabet.
#[inline]
pub fn encode_key(bytes: &[u8; 32]) -> String {
    STANDARD.encode(bytes)
}
