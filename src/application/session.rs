//! Prediction session: Orchestrates one encrypted prediction request.
//!
//! The session walks a fixed state machine:
//!
//! ```text
//! Idle -> Encrypting -> Evaluating -> Decrypting -> Done
//!   \________\____________\_____________\--> Failed (terminal)
//! ```
//!
//! All state is local to the session; abandoning one mid-flight is safe.

use std::sync::Arc;

use crate::codec::{EncryptedRequest, PublicKeyRecord};
use crate::crypto::{CryptoError, EncryptedNumber, DEFAULT_KEY_BITS};
use crate::domain::{EmployeeFeatures, Prediction};
use crate::ports::{Evaluator, KeyStore};
use crate::{adapters::KeyStoreError, PaycryptError};

/// Current stage of a prediction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a feature vector
    Idle,
    /// Validated, encrypting features
    Encrypting,
    /// Request handed to the evaluator
    Evaluating,
    /// Response received, verifying and decrypting
    Decrypting,
    /// Prediction surfaced
    Done,
    /// Terminal failure; the typed error went to the caller
    Failed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Encrypting => write!(f, "encrypting"),
            Self::Evaluating => write!(f, "evaluating"),
            Self::Decrypting => write!(f, "decrypting"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Drives one encrypted prediction end to end.
///
/// The session encrypts on the client side, hands the wire request to the
/// evaluator, verifies the response came back under its own key, and
/// decrypts. The private key never crosses the evaluator boundary.
pub struct PredictionSession<K, E>
where
    K: KeyStore,
    E: Evaluator,
{
    keystore: Arc<K>,
    evaluator: Arc<E>,
    key_bits: u64,
    state: SessionState,
}

impl<K, E> PredictionSession<K, E>
where
    K: KeyStore,
    E: Evaluator,
    K::Error: Into<KeyStoreError>,
    E::Error: Into<PaycryptError>,
{
    /// Create a session over a key store and an evaluator.
    pub fn new(keystore: Arc<K>, evaluator: Arc<E>) -> Self {
        Self {
            keystore,
            evaluator,
            key_bits: DEFAULT_KEY_BITS,
            state: SessionState::Idle,
        }
    }

    /// Override the modulus size used if this session has to generate the
    /// key pair (smaller keys are useful in tests).
    #[must_use]
    pub fn with_key_bits(mut self, bits: u64) -> Self {
        self.key_bits = bits;
        self
    }

    /// Current state of the session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the full encrypted prediction pipeline for one feature vector.
    ///
    /// A session drives exactly one request; `Done` and `Failed` are
    /// terminal.
    ///
    /// # Errors
    /// Returns a typed error and moves to `Failed` if any step fails. No
    /// partial output is ever surfaced.
    pub fn predict(&mut self, features: &EmployeeFeatures) -> Result<Prediction, PaycryptError> {
        if self.state != SessionState::Idle {
            return Err(PaycryptError::Validation(format!(
                "session is {}; create a new session per request",
                self.state
            )));
        }

        match self.run(features) {
            Ok(prediction) => {
                self.transition(SessionState::Done);
                Ok(prediction)
            }
            Err(e) => {
                let stage = self.state;
                self.transition(SessionState::Failed);
                tracing::warn!("Prediction failed while {stage}: {e}");
                Err(e)
            }
        }
    }

    fn run(&mut self, features: &EmployeeFeatures) -> Result<Prediction, PaycryptError> {
        // Out-of-range input fails before any cryptographic work.
        features
            .validate()
            .map_err(|errors| PaycryptError::Validation(errors.join("; ")))?;

        self.transition(SessionState::Encrypting);
        let keys = self
            .keystore
            .load_or_generate(self.key_bits)
            .map_err(|e| PaycryptError::KeyStore(e.into()))?;
        let public = keys.public.clone();

        let encrypted: Vec<EncryptedNumber> = features
            .to_vec()
            .into_iter()
            .map(|v| public.encrypt(v))
            .collect::<Result<_, _>>()?;
        let request = EncryptedRequest::from_features(&encrypted)?;
        tracing::debug!(
            "Encrypted {} features under key {}",
            encrypted.len(),
            public.fingerprint()
        );

        self.transition(SessionState::Evaluating);
        let response = self.evaluator.evaluate(&request).map_err(Into::into)?;

        self.transition(SessionState::Decrypting);
        // The result must come back under this session's own key. Anything
        // else is a protocol error, not something decryption should absorb.
        // (This check does not vouch for the evaluator's honesty about the
        // computation itself.)
        if response.public_key != PublicKeyRecord::from_key(&public) {
            return Err(PaycryptError::Crypto(CryptoError::KeyMismatch(format!(
                "evaluator answered under a different key than {}",
                public.fingerprint()
            ))));
        }

        let encrypted_result = response.to_result()?;
        let salary = keys.private.decrypt(&encrypted_result)?;
        tracing::info!("Prediction complete under key {}", public.fingerprint());

        Ok(Prediction::new(salary, public.fingerprint()))
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session state {} -> {next}", self.state);
        self.state = next;
    }
}
