//! Paillier encryption, decryption, and the homomorphic operations.
//!
//! Homomorphic laws:
//! - `decrypt(add(encrypt(a), encrypt(b))) == a + b` (ciphertext
//!   multiplication mod `n^2`)
//! - `decrypt(scalar_mul(encrypt(a), k)) == a * k` for a public scalar `k`
//!   (modular exponentiation)
//!
//! There is no ciphertext-by-ciphertext multiplication.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};

use super::encoding::{EncodedNumber, BASE};
use super::keys::{PrivateKey, PublicKey};
use super::CryptoError;

/// An encrypted real number: the Paillier ciphertext plus the encoding
/// exponent, bound to the public key it was produced under.
///
/// Values are immutable; homomorphic operations return new ciphertexts.
#[derive(Clone)]
pub struct EncryptedNumber {
    public_key: PublicKey,
    ciphertext: BigUint,
    exponent: i64,
}

impl EncryptedNumber {
    /// Reassemble an encrypted number from its transported parts.
    #[must_use]
    pub fn from_parts(public_key: PublicKey, ciphertext: BigUint, exponent: i64) -> Self {
        Self {
            public_key,
            ciphertext,
            exponent,
        }
    }

    /// The public key this ciphertext references.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The raw ciphertext value.
    #[must_use]
    pub fn ciphertext(&self) -> &BigUint {
        &self.ciphertext
    }

    /// The encoding exponent.
    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Homomorphic addition of two encrypted numbers.
    ///
    /// Exponents are aligned first: the operand with the coarser exponent is
    /// rescaled down, and the result carries the finer of the two.
    ///
    /// # Errors
    /// Returns `CryptoError::KeyMismatch` if the operands reference
    /// different public keys.
    pub fn add(&self, other: &EncryptedNumber) -> Result<EncryptedNumber, CryptoError> {
        if self.public_key != other.public_key {
            return Err(CryptoError::KeyMismatch(format!(
                "cannot add ciphertexts under keys {} and {}",
                self.public_key.fingerprint(),
                other.public_key.fingerprint()
            )));
        }

        let (a, b) = if self.exponent > other.exponent {
            (self.with_exponent(other.exponent), other.clone())
        } else if self.exponent < other.exponent {
            (self.clone(), other.with_exponent(self.exponent))
        } else {
            (self.clone(), other.clone())
        };

        let ciphertext = (&a.ciphertext * &b.ciphertext) % a.public_key.n_squared();
        Ok(EncryptedNumber {
            public_key: a.public_key,
            ciphertext,
            exponent: a.exponent,
        })
    }

    /// Homomorphic multiplication by a public plaintext scalar.
    ///
    /// The scalar is encoded exactly like `PublicKey::encrypt` encodes a
    /// plaintext; the exponents add.
    ///
    /// # Errors
    /// Returns `CryptoError::EncodingOverflow` under the same overflow
    /// conditions as encryption.
    pub fn scalar_mul(&self, scalar: f64) -> Result<EncryptedNumber, CryptoError> {
        let encoded = EncodedNumber::encode(&self.public_key, scalar)?;
        let ciphertext = self.raw_mul(&encoded.mantissa)?;
        Ok(EncryptedNumber {
            public_key: self.public_key.clone(),
            ciphertext,
            exponent: self.exponent + encoded.exponent,
        })
    }

    /// Rescale to a finer exponent by homomorphically multiplying the
    /// plaintext by `BASE^(self.exponent - exponent)`.
    ///
    /// Callers must pass `exponent <= self.exponent`.
    fn with_exponent(&self, exponent: i64) -> EncryptedNumber {
        debug_assert!(exponent <= self.exponent);
        let diff = u32::try_from(self.exponent - exponent).unwrap_or(u32::MAX);
        let factor = BigUint::from(BASE).pow(diff);
        let ciphertext = self
            .ciphertext
            .modpow(&factor, self.public_key.n_squared());
        EncryptedNumber {
            public_key: self.public_key.clone(),
            ciphertext,
            exponent,
        }
    }

    /// `c^m mod n^2`, routing negatively-encoded mantissas through the
    /// modular inverse of the ciphertext.
    fn raw_mul(&self, mantissa: &BigUint) -> Result<BigUint, CryptoError> {
        let key = &self.public_key;
        let n_squared = key.n_squared();

        if mantissa <= key.max_int() {
            Ok(self.ciphertext.modpow(mantissa, n_squared))
        } else if *mantissa >= key.n() - key.max_int() {
            let inverse = self.ciphertext.modinv(n_squared).ok_or_else(|| {
                CryptoError::MalformedCiphertext(
                    "ciphertext shares a factor with the modulus".to_string(),
                )
            })?;
            let magnitude = key.n() - mantissa;
            Ok(inverse.modpow(&magnitude, n_squared))
        } else {
            Err(CryptoError::EncodingOverflow(
                "scalar mantissa falls in the dead zone of the plaintext space".to_string(),
            ))
        }
    }
}

// Intentionally NOT deriving Debug: the raw ciphertext is large and has no
// business in logs.
impl std::fmt::Debug for EncryptedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedNumber")
            .field("key_fingerprint", &self.public_key.fingerprint())
            .field("exponent", &self.exponent)
            .field("ciphertext_bits", &self.ciphertext.bits())
            .finish()
    }
}

impl PublicKey {
    /// Encrypt a real number under this key.
    ///
    /// Each call draws a fresh blinding factor, so repeated encryptions of
    /// the same plaintext produce unlinkable ciphertexts.
    ///
    /// # Errors
    /// Returns `CryptoError::EncodingOverflow` if the magnitude exceeds what
    /// the modulus can represent.
    pub fn encrypt(&self, value: f64) -> Result<EncryptedNumber, CryptoError> {
        let encoded = EncodedNumber::encode(self, value)?;
        let ciphertext = self.raw_encrypt(&encoded.mantissa);
        Ok(EncryptedNumber {
            public_key: self.clone(),
            ciphertext,
            exponent: encoded.exponent,
        })
    }

    /// `g^m * r^n mod n^2` with `g = n + 1`, so `g^m` collapses to
    /// `1 + n*m mod n^2`.
    fn raw_encrypt(&self, mantissa: &BigUint) -> BigUint {
        let n_squared = self.n_squared();
        let g_m = (BigUint::one() + self.n() * mantissa) % n_squared;

        let mut rng = rand::thread_rng();
        let r = loop {
            let candidate = rng.gen_biguint_below(self.n());
            if !candidate.is_zero() {
                break candidate;
            }
        };
        let blinding = r.modpow(self.n(), n_squared);

        (g_m * blinding) % n_squared
    }
}

impl PrivateKey {
    /// Decrypt an encrypted number.
    ///
    /// # Errors
    /// Returns `CryptoError::KeyMismatch` if the ciphertext references a
    /// public key other than this key's pair, and
    /// `CryptoError::EncodingOverflow` if the recovered mantissa is outside
    /// the representable range.
    pub fn decrypt(&self, encrypted: &EncryptedNumber) -> Result<f64, CryptoError> {
        if encrypted.public_key() != self.public() {
            return Err(CryptoError::KeyMismatch(format!(
                "ciphertext was produced under key {}, not {}",
                encrypted.public_key().fingerprint(),
                self.public().fingerprint()
            )));
        }

        let n = self.public().n();
        let n_squared = self.public().n_squared();

        // m = L(c^lambda mod n^2) * mu mod n, with L(u) = (u - 1) / n.
        let u = encrypted.ciphertext().modpow(self.lambda(), n_squared);
        let l = (u - BigUint::one()) / n;
        let mantissa = (l * self.mu()) % n;

        EncodedNumber {
            mantissa,
            exponent: encrypted.exponent(),
        }
        .decode(self.public())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{generate_keypair, KeyPair};

    fn test_keys() -> KeyPair {
        generate_keypair(256).expect("Keygen should succeed")
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = expected.abs().max(1.0) * 1e-6;
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let keys = test_keys();
        for value in [0.0, 1.0, 30.0, -7.25, 56000.0, 3.141592653589793, -0.001] {
            let encrypted = keys.public.encrypt(value).expect("Should encrypt");
            let decrypted = keys.private.decrypt(&encrypted).expect("Should decrypt");
            assert_close(decrypted, value);
        }
    }

    #[test]
    fn test_blinding_makes_ciphertexts_unlinkable() {
        let keys = test_keys();
        let a = keys.public.encrypt(42.0).expect("Should encrypt");
        let b = keys.public.encrypt(42.0).expect("Should encrypt");
        assert_ne!(a.ciphertext(), b.ciphertext());
    }

    #[test]
    fn test_additive_homomorphism() {
        let keys = test_keys();
        let a = keys.public.encrypt(1234.5).expect("Should encrypt");
        let b = keys.public.encrypt(-234.5).expect("Should encrypt");

        let sum = a.add(&b).expect("Should add");
        let decrypted = keys.private.decrypt(&sum).expect("Should decrypt");
        assert_close(decrypted, 1000.0);
    }

    #[test]
    fn test_add_aligns_exponents() {
        let keys = test_keys();
        // Very different magnitudes, hence very different exponents.
        let small = keys.public.encrypt(0.05).expect("Should encrypt");
        let large = keys.public.encrypt(30000.0).expect("Should encrypt");
        assert_ne!(small.exponent(), large.exponent());

        let sum = large.add(&small).expect("Should add");
        // Result carries the finer exponent of the two.
        assert_eq!(sum.exponent(), small.exponent().min(large.exponent()));

        let decrypted = keys.private.decrypt(&sum).expect("Should decrypt");
        assert_close(decrypted, 30000.05);
    }

    #[test]
    fn test_scalar_homomorphism() {
        let keys = test_keys();
        let encrypted = keys.public.encrypt(30.0).expect("Should encrypt");

        let scaled = encrypted.scalar_mul(500.0).expect("Should multiply");
        let decrypted = keys.private.decrypt(&scaled).expect("Should decrypt");
        assert_close(decrypted, 15000.0);
    }

    #[test]
    fn test_negative_scalar() {
        let keys = test_keys();
        let encrypted = keys.public.encrypt(80.0).expect("Should encrypt");

        let scaled = encrypted.scalar_mul(-0.5).expect("Should multiply");
        let decrypted = keys.private.decrypt(&scaled).expect("Should decrypt");
        assert_close(decrypted, -40.0);
    }

    #[test]
    fn test_linear_combination() {
        let keys = test_keys();
        let values = [30.0, 5.0, 5.0, 1.0];
        let coefficients = [500.0, 1000.0, 800.0, 2000.0];

        let mut acc: Option<EncryptedNumber> = None;
        for (value, coefficient) in values.iter().zip(coefficients) {
            let term = keys
                .public
                .encrypt(*value)
                .expect("Should encrypt")
                .scalar_mul(coefficient)
                .expect("Should multiply");
            acc = Some(match acc {
                Some(sum) => sum.add(&term).expect("Should add"),
                None => term,
            });
        }

        let total = acc.expect("Non-empty");
        let decrypted = keys.private.decrypt(&total).expect("Should decrypt");
        assert_close(decrypted, 26000.0);
    }

    #[test]
    fn test_cross_key_add_rejected() {
        let a = test_keys();
        let b = test_keys();

        let x = a.public.encrypt(1.0).expect("Should encrypt");
        let y = b.public.encrypt(2.0).expect("Should encrypt");
        assert!(matches!(x.add(&y), Err(CryptoError::KeyMismatch(_))));
    }

    #[test]
    fn test_cross_key_decrypt_rejected() {
        let a = test_keys();
        let b = test_keys();

        let encrypted = a.public.encrypt(123.0).expect("Should encrypt");
        assert!(matches!(
            b.private.decrypt(&encrypted),
            Err(CryptoError::KeyMismatch(_))
        ));
    }

    #[test]
    fn test_forced_cross_key_decrypt_never_recovers_plaintext() {
        let a = test_keys();
        let b = test_keys();

        let encrypted = a.public.encrypt(123.0).expect("Should encrypt");
        // Relabel the ciphertext under B's key to bypass the identity check.
        let forged = EncryptedNumber::from_parts(
            b.public.clone(),
            encrypted.ciphertext().clone() % b.public.n_squared(),
            encrypted.exponent(),
        );

        match b.private.decrypt(&forged) {
            Ok(value) => assert!((value - 123.0).abs() > 1e-6),
            Err(_) => {} // dead-zone mantissa is an equally acceptable outcome
        }
    }

    #[test]
    fn test_encrypt_overflow_under_small_modulus() {
        // 48-bit modulus: max_int below the f64 mantissa range.
        let keys = generate_keypair(48).expect("Keygen should succeed");
        let result = keys.public.encrypt(3.141592653589793);
        assert!(matches!(result, Err(CryptoError::EncodingOverflow(_))));
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let keys = test_keys();
        let a = keys.public.encrypt(5.0).expect("Should encrypt");
        let b = keys.public.encrypt(7.0).expect("Should encrypt");
        let a_raw = a.ciphertext().clone();

        let _ = a.add(&b).expect("Should add");
        let _ = a.scalar_mul(3.0).expect("Should multiply");
        assert_eq!(a.ciphertext(), &a_raw);
    }
}
