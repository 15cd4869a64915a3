//! Shared types, errors, and the upstream HTTP client used across all
//! PropScout crates.

pub mod entities;
pub mod error;
pub mod http;

pub use error::{Result, ScoutError};
