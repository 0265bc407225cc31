//! Key store port: Trait for key pair persistence.
//!
//! The key pair is process-wide shared state with an explicit lifecycle:
//! lazily generated once per persisted identity, then read-many.

use crate::crypto::KeyPair;

/// Trait for key pair persistence.
///
/// Implementations must serialize concurrent first-time generation so two
/// callers cannot race distinct key pairs into the same persisted location.
pub trait KeyStore: Send + Sync {
    /// Error type for key store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a key pair, replacing any existing one atomically.
    ///
    /// # Errors
    /// Returns error if the persistence operation fails.
    fn save_keys(&self, keys: &KeyPair) -> Result<(), Self::Error>;

    /// Load the persisted key pair.
    ///
    /// # Returns
    /// `None` if no keys are stored.
    ///
    /// # Errors
    /// Returns error if the record exists but fails its consistency check.
    fn load_keys(&self) -> Result<Option<KeyPair>, Self::Error>;

    /// Check whether keys exist.
    ///
    /// # Errors
    /// Returns error if the existence check itself fails.
    fn has_keys(&self) -> Result<bool, Self::Error>;

    /// Delete the stored keys. Deleting absent keys is not an error.
    ///
    /// # Errors
    /// Returns error if the persistence operation fails.
    fn delete_keys(&self) -> Result<(), Self::Error>;

    /// Load the persisted key pair, generating and persisting a fresh
    /// `bits`-length pair if none exists yet.
    ///
    /// # Errors
    /// Returns error if loading, generation, or persistence fails.
    fn load_or_generate(&self, bits: u64) -> Result<KeyPair, Self::Error>;
}
