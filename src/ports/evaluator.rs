//! Evaluator port: Trait for the blind-compute collaborator.
//!
//! The evaluator computes the linear model on ciphertexts and public
//! coefficients only. It never sees plaintext features and never holds a
//! private key; the handoff happens entirely in wire records.

use crate::codec::{EncryptedRequest, EncryptedResponse};

/// Trait for encrypted model evaluation.
pub trait Evaluator: Send + Sync {
    /// Error type for evaluation operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Compute the encrypted prediction for an encrypted feature vector.
    ///
    /// The response is a single ciphertext under the request's public key,
    /// carrying the complete prediction including the intercept.
    ///
    /// # Errors
    /// Returns error if the request fails validation or a homomorphic
    /// operation fails. Implementations must never attempt decryption.
    fn evaluate(&self, request: &EncryptedRequest) -> Result<EncryptedResponse, Self::Error>;
}
