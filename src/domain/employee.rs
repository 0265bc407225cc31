//! Employee feature types for salary prediction.
//!
//! The four features match the columns of the historical employee dataset
//! the model was fitted on.

use serde::{Deserialize, Serialize};

/// Number of model features.
pub const FEATURE_COUNT: usize = 4;

/// Feature names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "healthy_eating",
    "active_lifestyle",
    "gender_code",
];

/// Dataset columns, the four features plus the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    Age,
    HealthyEating,
    ActiveLifestyle,
    GenderCode,
    Salary,
}

/// Feature vector submitted for one prediction.
///
/// Held in plaintext only on the client side, and only for the duration of
/// one request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmployeeFeatures {
    /// Age in years (18-65, the range the model was fitted on)
    pub age: f64,

    /// Healthy eating score on a 1-10 scale
    pub healthy_eating: f64,

    /// Active lifestyle score on a 1-10 scale
    pub active_lifestyle: f64,

    /// Gender: binary categorical encoding, 0 or 1
    pub gender_code: f64,
}

impl EmployeeFeatures {
    /// Convert features to a vector in model order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.healthy_eating,
            self.active_lifestyle,
            self.gender_code,
        ]
    }

    /// Create features from a vector in model order.
    ///
    /// # Errors
    /// Returns error if vector length is not 4.
    pub fn from_vec(v: &[f64]) -> Result<Self, String> {
        if v.len() != FEATURE_COUNT {
            return Err(format!("Expected {FEATURE_COUNT} features, got {}", v.len()));
        }

        Ok(Self {
            age: v[0],
            healthy_eating: v[1],
            active_lifestyle: v[2],
            gender_code: v[3],
        })
    }

    /// Validate that all features are within their declared domains.
    ///
    /// Runs before any cryptographic work so that out-of-range input never
    /// reaches the encryption layer.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(18.0..=65.0).contains(&self.age) {
            errors.push(format!("Age {} out of range [18, 65]", self.age));
        }
        if !(1.0..=10.0).contains(&self.healthy_eating) {
            errors.push(format!(
                "Healthy eating score {} out of range [1, 10]",
                self.healthy_eating
            ));
        }
        if !(1.0..=10.0).contains(&self.active_lifestyle) {
            errors.push(format!(
                "Active lifestyle score {} out of range [1, 10]",
                self.active_lifestyle
            ));
        }
        if self.gender_code != 0.0 && self.gender_code != 1.0 {
            errors.push(format!("Gender code {} must be 0 or 1", self.gender_code));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
