//! Test utilities for check-in services.
//!
//! Import from `[dev-dependencies]` only, never from production code.

pub mod auth;
