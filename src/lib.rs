//! Time-limited access keys: batch issuance to timestamped files, and a
//! hash-indexed key store with expiry-checked validation.

pub mod config;
pub mod crypto;
pub mod error;
pub mod expiry;
pub mod issuer;
pub mod models;
pub mod store;
