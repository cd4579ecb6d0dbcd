//! Key material: random token generation and lookup digests.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Marker prepended to issuer keys so they are recognizable by eye.
pub const KEY_PREFIX: &str = "KEY-";

/// Random bytes behind an issuer key.
pub const ISSUER_KEY_BYTES: usize = 16;

/// Random bytes behind a key-store key.
pub const STORE_KEY_BYTES: usize = 32;

fn random_token<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate an issuer key: `KEY-` followed by 16 random bytes, URL-safe base64 without padding.
pub fn generate_issuer_key() -> String {
    format!("{}{}", KEY_PREFIX, random_token::<ISSUER_KEY_BYTES>())
}

/// Generate a key-store key: 32 random bytes, URL-safe base64 without padding.
pub fn generate_store_key() -> String {
    random_token::<STORE_KEY_BYTES>()
}

/// Decode the random payload of an issuer key.
///
/// Returns None if the prefix is missing or the body is not valid base64.
pub fn decode_issuer_key(key: &str) -> Option<Vec<u8>> {
    let body = key.strip_prefix(KEY_PREFIX)?;
    URL_SAFE_NO_PAD.decode(body).ok()
}

/// Hex-encoded SHA-256 of a key, used as the store's lookup index.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two digests without short-circuiting on the first differing byte.
pub fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}
