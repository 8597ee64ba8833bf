//! Shared types and models for the Larder restaurant inventory platform
//!
//! This crate contains the domain model shared between the backend and any
//! other components of the system. It is deliberately free of I/O.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
