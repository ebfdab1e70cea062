//! # Taskboard Shared Library
//!
//! This crate contains the data layer and session primitives used by the
//! Taskboard web server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing and the signed session cookie
//! - `db`: Connection pool and migration runner
//! - `http`: Hand-rolled cookie and flash-message plumbing

pub mod auth;
pub mod db;
pub mod http;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
