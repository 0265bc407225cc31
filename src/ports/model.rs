//! Model and statistics ports: contracts of the fitting and data-source
//! collaborators.
//!
//! Training and the historical dataset live outside this crate; the pipeline
//! consumes them only through these traits.

use crate::domain::Column;

/// Fitted linear model collaborator.
///
/// Coefficients and intercept are public model parameters, known to the
/// evaluator by design.
pub trait ModelProvider: Send + Sync {
    /// Model weights in feature order.
    fn coefficients(&self) -> &[f64];

    /// Model intercept.
    fn intercept(&self) -> f64;
}

/// Descriptive statistics collaborator over the historical dataset.
pub trait SalaryStatistics: Send + Sync {
    /// Mean of a dataset column; `None` when the dataset is empty.
    fn mean(&self, column: Column) -> Option<f64>;
}
