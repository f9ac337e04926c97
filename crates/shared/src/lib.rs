//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Currency codes and rounding modes
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Tracing initialization

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
