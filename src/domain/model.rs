//! Fitted linear model parameters.
//!
//! Produced by an external fitting process and treated as public: the
//! evaluator holds these in plaintext, only the features are secret.

use serde::{Deserialize, Serialize};

use crate::domain::{EmployeeFeatures, FEATURE_COUNT};
use crate::ports::ModelProvider;

/// Linear regression model: one coefficient per feature plus an intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Create a model from fitted parameters.
    ///
    /// # Errors
    /// Returns error if the coefficient count does not match the feature
    /// count or any parameter is non-finite.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, String> {
        if coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "Expected {FEATURE_COUNT} coefficients, got {}",
                coefficients.len()
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err("Model parameters must be finite".to_string());
        }

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Plaintext reference prediction: `dot(coefficients, features) + intercept`.
    ///
    /// The encrypted pipeline must agree with this within the encoding
    /// precision.
    #[must_use]
    pub fn predict(&self, features: &EmployeeFeatures) -> f64 {
        self.coefficients
            .iter()
            .zip(features.to_vec())
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.intercept
    }
}

impl ModelProvider for LinearModel {
    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn intercept(&self) -> f64 {
        self.intercept
    }
}
