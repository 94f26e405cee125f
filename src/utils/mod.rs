//! Utility functions

pub mod crypto;

pub use crypto::{fingerprint, hash_string, secrets_match};
