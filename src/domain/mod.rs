//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no cryptographic dependencies.
//! All types are serializable and implement strict validation.

mod employee;
mod model;
mod prediction;

pub use employee::{Column, EmployeeFeatures, FEATURE_COUNT, FEATURE_NAMES};
pub use model::LinearModel;
pub use prediction::Prediction;
