//! Passcode and session secret generation and hashing.
//!
//! Neither passcodes nor session secrets are stored in plain text; the
//! database only ever sees their SHA-256 hashes.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a zero-padded numeric passcode of the given length.
pub fn generate_passcode(length: u32) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'))
        .collect()
}

/// Generate an opaque session secret.
pub fn generate_session_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// SHA-256 hash of a secret, hex-encoded.
pub fn hash_secret(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
