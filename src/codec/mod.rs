//! Transport and storage records for keys and ciphertexts.
//!
//! Every big integer travels as an exact decimal string; nothing is ever
//! narrowed to a float. The round-trip law holds for all valid values:
//! `decode(encode(x)) == x`.
//!
//! Records are validated at the deserialization boundary and fail fast:
//! unparsable digits, a ciphertext outside `[0, n^2)`, or a private key
//! whose factors do not multiply to the public modulus never travel deeper
//! into the pipeline.

use serde::{Deserialize, Serialize};

use num_bigint::BigUint;

use crate::crypto::{EncryptedNumber, KeyPair, PrivateKey, PublicKey};

/// Error type for record encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Corrupted record: {0}")]
    Corruption(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

fn parse_biguint(field: &str, text: &str) -> Result<BigUint, CodecError> {
    text.parse::<BigUint>()
        .map_err(|_| CodecError::Malformed(format!("{field} is not a decimal integer")))
}

/// Public key as persisted and transmitted: just the modulus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Modulus `n`, exact decimal text
    pub n: String,
}

impl PublicKeyRecord {
    /// Serialize a public key.
    #[must_use]
    pub fn from_key(key: &PublicKey) -> Self {
        Self {
            n: key.n().to_string(),
        }
    }

    /// Reconstruct the public key.
    ///
    /// # Errors
    /// Returns `CodecError::Malformed` if the modulus text is not a decimal
    /// integer.
    pub fn to_key(&self) -> Result<PublicKey, CodecError> {
        Ok(PublicKey::new(parse_biguint("public_key.n", &self.n)?))
    }
}

/// Private key halves, exact decimal text.
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateKeyRecord {
    pub p: String,
    pub q: String,
}

// Intentionally NOT deriving Debug: this record carries the prime factors.
impl std::fmt::Debug for PrivateKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyRecord")
            .field("p", &"[REDACTED]")
            .field("q", &"[REDACTED]")
            .finish()
    }
}

/// Persisted key pair record: the body of the key file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    pub public_key: PublicKeyRecord,
    pub private_key: PrivateKeyRecord,
}

impl KeyRecord {
    /// Serialize a key pair for persistence.
    #[must_use]
    pub fn from_keypair(keys: &KeyPair) -> Self {
        Self {
            public_key: PublicKeyRecord::from_key(&keys.public),
            private_key: PrivateKeyRecord {
                p: keys.private.p().to_string(),
                q: keys.private.q().to_string(),
            },
        }
    }

    /// Reconstruct the key pair, re-establishing the pairing invariant.
    ///
    /// # Errors
    /// Returns `CodecError::Corruption` when `p * q` does not equal the
    /// stored modulus (or the factors are otherwise unsuitable), and
    /// `CodecError::Malformed` when a field is not a decimal integer.
    pub fn to_keypair(&self) -> Result<KeyPair, CodecError> {
        let public = self.public_key.to_key()?;
        let p = parse_biguint("private_key.p", &self.private_key.p)?;
        let q = parse_biguint("private_key.q", &self.private_key.q)?;

        let private =
            PrivateKey::new(p, q, public).map_err(|e| CodecError::Corruption(e.to_string()))?;
        Ok(KeyPair::new(private))
    }
}

/// One ciphertext on the wire: decimal ciphertext plus encoding exponent.
pub type CiphertextRecord = (String, i64);

fn ciphertext_record(value: &EncryptedNumber) -> CiphertextRecord {
    (value.ciphertext().to_string(), value.exponent())
}

fn parse_ciphertext(
    key: &PublicKey,
    record: &CiphertextRecord,
) -> Result<EncryptedNumber, CodecError> {
    let (text, exponent) = record;
    let ciphertext = parse_biguint("ciphertext", text)?;
    if &ciphertext >= key.n_squared() {
        return Err(CodecError::Corruption(
            "ciphertext is not reduced mod n^2".to_string(),
        ));
    }
    Ok(EncryptedNumber::from_parts(key.clone(), ciphertext, *exponent))
}

/// Encrypted feature vector handed to the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedRequest {
    pub public_key: PublicKeyRecord,
    /// Ciphertexts in feature order
    pub values: Vec<CiphertextRecord>,
}

impl EncryptedRequest {
    /// Build a request from an encrypted feature vector.
    ///
    /// # Errors
    /// Returns `CodecError::Malformed` if the vector is empty or its
    /// ciphertexts reference different keys.
    pub fn from_features(features: &[EncryptedNumber]) -> Result<Self, CodecError> {
        let first = features
            .first()
            .ok_or_else(|| CodecError::Malformed("empty feature vector".to_string()))?;
        let key = first.public_key();
        if features.iter().any(|f| f.public_key() != key) {
            return Err(CodecError::Malformed(
                "feature ciphertexts reference different keys".to_string(),
            ));
        }

        Ok(Self {
            public_key: PublicKeyRecord::from_key(key),
            values: features.iter().map(ciphertext_record).collect(),
        })
    }

    /// Reconstruct the encrypted feature vector.
    ///
    /// # Errors
    /// Returns `CodecError::Malformed`/`CodecError::Corruption` if any field
    /// fails validation.
    pub fn to_features(&self) -> Result<Vec<EncryptedNumber>, CodecError> {
        let key = self.public_key.to_key()?;
        self.values
            .iter()
            .map(|record| parse_ciphertext(&key, record))
            .collect()
    }
}

/// Single encrypted scalar handed back by the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedResponse {
    pub public_key: PublicKeyRecord,
    /// The one encrypted prediction
    pub values: CiphertextRecord,
}

impl EncryptedResponse {
    /// Build a response from the evaluator's result.
    #[must_use]
    pub fn from_result(result: &EncryptedNumber) -> Self {
        Self {
            public_key: PublicKeyRecord::from_key(result.public_key()),
            values: ciphertext_record(result),
        }
    }

    /// Reconstruct the encrypted result.
    ///
    /// # Errors
    /// Returns `CodecError::Malformed`/`CodecError::Corruption` if any field
    /// fails validation.
    pub fn to_result(&self) -> Result<EncryptedNumber, CodecError> {
        let key = self.public_key.to_key()?;
        parse_ciphertext(&key, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;

    #[test]
    fn test_key_record_roundtrip() {
        let keys = generate_keypair(256).expect("Keygen should succeed");

        let record = KeyRecord::from_keypair(&keys);
        let json = serde_json::to_string(&record).expect("Should serialize");
        let parsed: KeyRecord = serde_json::from_str(&json).expect("Should deserialize");
        let restored = parsed.to_keypair().expect("Should reconstruct");

        assert_eq!(restored.public, keys.public);
        assert_eq!(restored.private.p(), keys.private.p());
        assert_eq!(restored.private.q(), keys.private.q());
    }

    #[test]
    fn test_key_record_corruption_detected() {
        let a = generate_keypair(256).expect("Keygen should succeed");
        let b = generate_keypair(256).expect("Keygen should succeed");

        // Public modulus from A, factors from B: p*q != n.
        let record = KeyRecord {
            public_key: PublicKeyRecord::from_key(&a.public),
            private_key: PrivateKeyRecord {
                p: b.private.p().to_string(),
                q: b.private.q().to_string(),
            },
        };
        assert!(matches!(
            record.to_keypair(),
            Err(CodecError::Corruption(_))
        ));
    }

    #[test]
    fn test_key_record_malformed_digits_rejected() {
        let record = KeyRecord {
            public_key: PublicKeyRecord {
                n: "123abc".to_string(),
            },
            private_key: PrivateKeyRecord {
                p: "7".to_string(),
                q: "11".to_string(),
            },
        };
        assert!(matches!(record.to_keypair(), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_request_roundtrip() {
        let keys = generate_keypair(256).expect("Keygen should succeed");
        let features: Vec<_> = [30.0, 5.0, 5.0, 1.0]
            .iter()
            .map(|&v| keys.public.encrypt(v).expect("Should encrypt"))
            .collect();

        let request = EncryptedRequest::from_features(&features).expect("Should encode");
        let json = serde_json::to_string(&request).expect("Should serialize");
        let parsed: EncryptedRequest = serde_json::from_str(&json).expect("Should deserialize");
        let restored = parsed.to_features().expect("Should reconstruct");

        assert_eq!(restored.len(), features.len());
        for (restored, original) in restored.iter().zip(&features) {
            assert_eq!(restored.ciphertext(), original.ciphertext());
            assert_eq!(restored.exponent(), original.exponent());
            assert_eq!(restored.public_key(), original.public_key());
        }
    }

    #[test]
    fn test_request_rejects_mixed_keys() {
        let a = generate_keypair(256).expect("Keygen should succeed");
        let b = generate_keypair(256).expect("Keygen should succeed");

        let features = vec![
            a.public.encrypt(1.0).expect("Should encrypt"),
            b.public.encrypt(2.0).expect("Should encrypt"),
        ];
        assert!(matches!(
            EncryptedRequest::from_features(&features),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_request_rejects_empty_vector() {
        assert!(matches!(
            EncryptedRequest::from_features(&[]),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_response_roundtrip_preserves_decryptability() {
        let keys = generate_keypair(256).expect("Keygen should succeed");
        let encrypted = keys.public.encrypt(56000.0).expect("Should encrypt");

        let response = EncryptedResponse::from_result(&encrypted);
        let json = serde_json::to_string(&response).expect("Should serialize");
        let parsed: EncryptedResponse = serde_json::from_str(&json).expect("Should deserialize");
        let restored = parsed.to_result().expect("Should reconstruct");

        let decrypted = keys.private.decrypt(&restored).expect("Should decrypt");
        assert!((decrypted - 56000.0).abs() < 1e-6);
    }

    #[test]
    fn test_unreduced_ciphertext_rejected() {
        let keys = generate_keypair(256).expect("Keygen should succeed");
        let too_big = keys.public.n() * keys.public.n() * 2u8;

        let response = EncryptedResponse {
            public_key: PublicKeyRecord::from_key(&keys.public),
            values: (too_big.to_string(), 0),
        };
        assert!(matches!(
            response.to_result(),
            Err(CodecError::Corruption(_))
        ));
    }

    #[test]
    fn test_private_record_debug_redacted() {
        let keys = generate_keypair(256).expect("Keygen should succeed");
        let record = KeyRecord::from_keypair(&keys);

        let debug_output = format!("{record:?}");
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&keys.private.p().to_string()));
    }
}
