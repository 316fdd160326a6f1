//! # Portero
//!
//! `portero` is a small account service: it registers email/password pairs and
//! checks them on login.
//!
//! ## Storage
//!
//! Accounts live in an [`store::AccountStore`]. The default store is a JSON file
//! holding the list of accounts; a `--dsn` selects a relational table instead
//! (`SQLite` on disk or in memory, or `PostgreSQL`). Every store enforces email
//! uniqueness on insert, so two concurrent signups for the same address cannot
//! both succeed.
//!
//! ## Passwords
//!
//! Plaintext passwords only exist for the duration of a request. They are hashed
//! with bcrypt at a configurable cost before they reach the store, and login
//! answers the same `401` whether the email is unknown or the password is wrong.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
