//! # Taskboard Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `dates`: Calendar-date parsing for date-only fields
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod dates;
pub mod db;
pub mod models;

/// Current version of the taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
