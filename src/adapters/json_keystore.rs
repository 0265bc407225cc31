//! JSON file key store: Implementation of the `KeyStore` port.
//!
//! Persists one key pair per file as the structured record the codec
//! defines. Writes go through a temp file followed by an atomic rename, so
//! a crash mid-write never leaves a half-written key file. First-time
//! generation is serialized by an interior mutex so concurrent callers
//! cannot race two different key pairs into the same path.
//!
//! # Key Hygiene
//!
//! Serialized key text is held in `Zeroizing` buffers, and the key file is
//! created with 0600 permissions on Unix.

use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zeroize::Zeroizing;

use crate::codec::KeyRecord;
use crate::crypto::{generate_keypair, CryptoError, KeyPair};
use crate::ports::KeyStore;

/// Error type for key store operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted key record: {0}")]
    Corruption(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Key pair persistence in a single local JSON file.
pub struct JsonFileKeyStore {
    path: PathBuf,
    // Serializes first-time generation and writes.
    init_lock: Mutex<()>,
}

impl JsonFileKeyStore {
    /// Create a key store backed by the file at `path`.
    ///
    /// The file does not need to exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            init_lock: Mutex::new(()),
        }
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the file
        // itself is still consistent thanks to the atomic rename.
        self.init_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write the record to a temp file, flush, then rename over the target.
    fn write_atomic(&self, record: &KeyRecord) -> Result<(), KeyStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = Zeroizing::new(serde_json::to_string_pretty(record)?);
        let tmp = self.path.with_extension("tmp");

        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            opts.mode(0o600);
        }

        let mut file = opts.open(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn read_record(&self) -> Result<Option<KeyRecord>, KeyStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = Zeroizing::new(std::fs::read_to_string(&self.path)?);
        // An empty file counts as absent, not corrupt.
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }
}

impl KeyStore for JsonFileKeyStore {
    type Error = KeyStoreError;

    fn save_keys(&self, keys: &KeyPair) -> Result<(), KeyStoreError> {
        let _guard = self.lock();
        self.write_atomic(&KeyRecord::from_keypair(keys))?;
        tracing::info!(
            "Saved keypair {} to {:?}",
            keys.public.fingerprint(),
            self.path
        );
        Ok(())
    }

    fn load_keys(&self) -> Result<Option<KeyPair>, KeyStoreError> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        let keys = record
            .to_keypair()
            .map_err(|e| KeyStoreError::Corruption(e.to_string()))?;
        Ok(Some(keys))
    }

    fn has_keys(&self) -> Result<bool, KeyStoreError> {
        Ok(self.read_record()?.is_some())
    }

    fn delete_keys(&self) -> Result<(), KeyStoreError> {
        let _guard = self.lock();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::info!("Deleted key file {:?}", self.path);
        }
        Ok(())
    }

    fn load_or_generate(&self, bits: u64) -> Result<KeyPair, KeyStoreError> {
        if let Some(keys) = self.load_keys()? {
            return Ok(keys);
        }

        let _guard = self.lock();
        // Re-check under the lock: another caller may have generated while
        // we waited.
        if let Some(keys) = self.load_keys()? {
            return Ok(keys);
        }

        tracing::info!(
            "No keypair at {:?}, generating a fresh {bits}-bit keypair",
            self.path
        );
        let keys = generate_keypair(bits)?;
        self.write_atomic(&KeyRecord::from_keypair(&keys))?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, JsonFileKeyStore) {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let store = JsonFileKeyStore::new(dir.path().join("custkeys.json"));
        (dir, store)
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, store) = temp_store();
        assert!(!store.has_keys().expect("Should check"));

        let keys = generate_keypair(256).expect("Keygen should succeed");
        store.save_keys(&keys).expect("Should save");

        assert!(store.has_keys().expect("Should check"));
        let loaded = store
            .load_keys()
            .expect("Should load")
            .expect("Keys present");
        assert_eq!(loaded.public, keys.public);
        assert_eq!(loaded.private.p(), keys.private.p());
    }

    #[test]
    fn test_load_or_generate_is_stable() {
        let (_dir, store) = temp_store();

        let first = store.load_or_generate(256).expect("Should generate");
        let second = store.load_or_generate(256).expect("Should load");
        assert_eq!(first.public, second.public);
    }

    #[test]
    fn test_empty_file_counts_as_absent() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "").expect("Should write");

        assert!(!store.has_keys().expect("Should check"));
        assert!(store.load_keys().expect("Should load").is_none());
    }

    #[test]
    fn test_corrupted_record_rejected() {
        let (_dir, store) = temp_store();
        let a = generate_keypair(256).expect("Keygen should succeed");
        let b = generate_keypair(256).expect("Keygen should succeed");

        // Stitch A's modulus to B's factors: fails the pairing invariant.
        let forged = serde_json::json!({
            "public_key": { "n": a.public.n().to_string() },
            "private_key": {
                "p": b.private.p().to_string(),
                "q": b.private.q().to_string(),
            },
        });
        std::fs::write(store.path(), forged.to_string()).expect("Should write");

        assert!(matches!(
            store.load_keys(),
            Err(KeyStoreError::Corruption(_))
        ));
    }

    #[test]
    fn test_delete_keys() {
        let (_dir, store) = temp_store();
        let keys = generate_keypair(256).expect("Keygen should succeed");
        store.save_keys(&keys).expect("Should save");

        store.delete_keys().expect("Should delete");
        assert!(!store.has_keys().expect("Should check"));
        // Deleting again is not an error.
        store.delete_keys().expect("Should be idempotent");
    }

    #[test]
    fn test_concurrent_first_generation_yields_one_keypair() {
        let (_dir, store) = temp_store();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .load_or_generate(256)
                        .expect("Should generate or load")
                        .public
                        .fingerprint()
                })
            })
            .collect();

        let fingerprints: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("Thread should finish"))
            .collect();
        assert!(fingerprints.windows(2).all(|w| w[0] == w[1]));
    }
}
