//! Core business logic for Budgetly.
//!
//! This crate contains pure budget logic with ZERO network or storage
//! dependencies. Every function here is total: malformed amounts degrade to
//! zero instead of failing, so a bad upstream record can never block
//! rendering.
//!
//! # Modules
//!
//! - `budget` - Budget records, categories, aggregation and category editing

pub mod budget;
