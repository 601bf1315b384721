//! Core infrastructure: shared foundation used across the whole crate.
//!
//! - **config**: resolved run configuration and env overrides.
//! - **error**: application-wide error enum.

pub mod config;
pub mod error;
