//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement the
//! encrypted prediction pipeline.

mod session;

pub use session::{PredictionSession, SessionState};
