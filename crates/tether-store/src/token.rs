//! Random token utility
//!
//! Generates cryptographically strong hex identifiers. Not consumed by the
//! access layer itself; applications use it for opaque id generation.

use rand::RngCore;

/// Default token size in bytes (128 hex characters).
pub const DEFAULT_TOKEN_BYTES: usize = 64;

/// Generate `size_in_bytes` random bytes as a lowercase hex string.
pub fn random_token(size_in_bytes: usize) -> String {
    let mut buf = vec![0u8; size_in_bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// [`random_token`] at the default size.
pub fn default_random_token() -> String {
    random_token(DEFAULT_TOKEN_BYTES)
}
