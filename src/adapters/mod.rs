//! Adapters layer: Concrete implementations of ports.
//!
//! - `json_keystore`: key pair persistence in a local JSON file
//! - `evaluator`: in-process encrypted model evaluation
//! - `dataset`: in-memory historical records with descriptive statistics

pub mod dataset;
pub mod evaluator;
pub mod json_keystore;

pub use dataset::{EmployeeDataset, EmployeeRecord};
pub use evaluator::{EvaluatorError, LocalEvaluator};
pub use json_keystore::{JsonFileKeyStore, KeyStoreError};
