//! Shared types and models for the POS backend
//!
//! This crate contains the domain models, closed enums, input validation,
//! and the pure order pricing engine used by the backend services.

pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
