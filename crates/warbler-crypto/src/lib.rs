//! Warbler Crypto Library
//!
//! Credential hashing for user accounts. Passwords are hashed with Argon2id
//! and a per-password random salt; only the PHC-encoded hash is ever stored.

pub mod password;

pub use password::{CredentialError, hash_password, verify_password};
