//! Shared types, errors, and configuration for Budgetly.
//!
//! This crate provides common types used across all other crates:
//! - `Amount`, a non-negative money type with decimal precision
//! - `BudgetPeriod`, the (month, year) key of a budget record
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::{Amount, BudgetPeriod};
