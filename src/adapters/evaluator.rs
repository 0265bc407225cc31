//! Local evaluator: Implementation of the `Evaluator` port.
//!
//! Plays the server role in-process: it receives the wire-level request,
//! computes the encrypted dot product against the public model, and hands
//! back a single-ciphertext response. It holds no private key and performs
//! no decryption.

use crate::codec::{CodecError, EncryptedRequest, EncryptedResponse};
use crate::crypto::{CryptoError, EncryptedNumber};
use crate::ports::{Evaluator, ModelProvider};
use crate::PaycryptError;

/// Error type for evaluation operations.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Invalid request: {0}")]
    Validation(String),
}

impl From<EvaluatorError> for PaycryptError {
    fn from(e: EvaluatorError) -> Self {
        match e {
            EvaluatorError::Crypto(e) => PaycryptError::Crypto(e),
            EvaluatorError::Codec(e) => PaycryptError::Codec(e),
            EvaluatorError::Validation(msg) => PaycryptError::Validation(msg),
        }
    }
}

/// In-process encrypted model evaluation.
pub struct LocalEvaluator<M: ModelProvider> {
    model: M,
}

impl<M: ModelProvider> LocalEvaluator<M> {
    /// Create an evaluator around a fitted model.
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ModelProvider> Evaluator for LocalEvaluator<M> {
    type Error = EvaluatorError;

    /// Compute `sum(coefficient_i * encrypted_feature_i) + intercept`.
    ///
    /// Intercept policy: encrypt-then-add. The intercept is encrypted under
    /// the request's public key and added homomorphically, so the response
    /// carries the complete prediction in one ciphertext.
    fn evaluate(&self, request: &EncryptedRequest) -> Result<EncryptedResponse, EvaluatorError> {
        let features = request.to_features()?;
        let coefficients = self.model.coefficients();
        if features.len() != coefficients.len() {
            return Err(EvaluatorError::Validation(format!(
                "expected {} encrypted features, got {}",
                coefficients.len(),
                features.len()
            )));
        }

        tracing::debug!(
            "Evaluating encrypted dot product over {} features",
            features.len()
        );

        // Left-to-right fold over the feature index keeps intermediate state
        // reproducible; addition itself is commutative.
        let mut acc: Option<EncryptedNumber> = None;
        for (feature, &coefficient) in features.iter().zip(coefficients) {
            let term = feature.scalar_mul(coefficient)?;
            acc = Some(match acc {
                Some(sum) => sum.add(&term)?,
                None => term,
            });
        }
        let dot = acc.ok_or_else(|| EvaluatorError::Validation("empty feature vector".to_string()))?;

        let public_key = dot.public_key().clone();
        let intercept = public_key.encrypt(self.model.intercept())?;
        let total = dot.add(&intercept)?;

        Ok(EncryptedResponse::from_result(&total))
    }
}
