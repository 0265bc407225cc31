//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the prediction pipeline and the parties around it (key storage,
//! the evaluator, the fitted model, the historical dataset).

mod evaluator;
mod keystore;
mod model;

pub use evaluator::Evaluator;
pub use keystore::KeyStore;
pub use model::{ModelProvider, SalaryStatistics};
