//! The Paillier partially homomorphic cryptosystem.
//!
//! Paillier supports addition of two ciphertexts and multiplication of a
//! ciphertext by a public plaintext scalar, but no ciphertext-by-ciphertext
//! multiplication. That restricts everything built on top of this module to
//! linear combinations of encrypted values, which is exactly what the salary
//! model needs.
//!
//! # Key Hygiene
//!
//! `Debug` implementations on key types never print key material, only the
//! public fingerprint and modulus size.

mod encoding;
mod keys;
mod paillier;
mod primes;

pub use encoding::EncodedNumber;
pub use keys::{generate_keypair, KeyPair, PrivateKey, PublicKey, DEFAULT_KEY_BITS};
pub use paillier::EncryptedNumber;

/// Error type for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Encoding overflow: {0}")]
    EncodingOverflow(String),

    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),
}
