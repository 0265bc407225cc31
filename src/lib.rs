//! # Paycrypt
//!
//! Privacy-preserving salary prediction with the Paillier partially
//! homomorphic cryptosystem.
//!
//! This crate provides:
//! - Paillier key generation, encryption, and decryption over `num-bigint`
//! - Homomorphic evaluation of a public linear model on encrypted features
//! - Exact decimal-string serialization of keys and ciphertexts
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (employee features, model, prediction)
//! - `crypto`: The Paillier cryptosystem and plaintext encoding
//! - `codec`: Wire and storage records for keys and ciphertexts
//! - `ports`: Trait definitions for external collaborators
//! - `adapters`: Concrete implementations (JSON key file, local evaluator)
//! - `application`: The prediction session orchestrating the pipeline

pub mod adapters;
pub mod application;
pub mod codec;
pub mod crypto;
pub mod domain;
pub mod ports;

pub use domain::{EmployeeFeatures, LinearModel, Prediction};

/// Result type for paycrypt operations.
pub type Result<T> = std::result::Result<T, PaycryptError>;

/// Main error type for paycrypt.
#[derive(Debug, thiserror::Error)]
pub enum PaycryptError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(#[from] crypto::CryptoError),

    #[error("Codec failure: {0}")]
    Codec(#[from] codec::CodecError),

    #[error("Key store failure: {0}")]
    KeyStore(#[from] adapters::KeyStoreError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
