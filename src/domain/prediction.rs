//! Prediction result types.
//!
//! Represents the decrypted output of the encrypted salary estimation.

use serde::{Deserialize, Serialize};

/// Decrypted salary prediction for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted annual salary
    pub salary: f64,

    /// Fingerprint of the key pair the pipeline ran under (not secret)
    pub key_fingerprint: String,

    /// True when the estimate was computed homomorphically end to end
    pub encrypted_computation: bool,

    /// Timestamp of the prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    /// Create a new prediction from a decrypted pipeline result.
    #[must_use]
    pub fn new(salary: f64, key_fingerprint: String) -> Self {
        Self {
            salary,
            key_fingerprint,
            encrypted_computation: true,
            created_at: chrono::Utc::now(),
        }
    }

    /// Signed percent difference from the dataset mean salary.
    ///
    /// Positive means above average. `None` when no mean is available or the
    /// mean is zero.
    #[must_use]
    pub fn percent_vs_mean(&self, mean: Option<f64>) -> Option<f64> {
        let mean = mean?;
        if mean == 0.0 {
            return None;
        }
        Some((self.salary - mean) / mean * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_vs_mean() {
        let prediction = Prediction::new(56000.0, "abcd".to_string());

        let above = prediction.percent_vs_mean(Some(50000.0)).expect("Has mean");
        assert!((above - 12.0).abs() < 1e-9);

        let below = prediction.percent_vs_mean(Some(70000.0)).expect("Has mean");
        assert!((below + 20.0).abs() < 1e-9);

        assert!(prediction.percent_vs_mean(None).is_none());
        assert!(prediction.percent_vs_mean(Some(0.0)).is_none());
    }

    #[test]
    fn test_prediction_marks_encrypted_computation() {
        let prediction = Prediction::new(1.0, "abcd".to_string());
        assert!(prediction.encrypted_computation);
    }
}
