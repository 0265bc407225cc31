//! Paillier key types and key generation.
//!
//! A `PrivateKey` is always bound to the `PublicKey` it was derived from;
//! the pairing invariant (`p * q == n`, `p != q`) is checked at every
//! construction site, including deserialization.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use sha2::{Digest, Sha256};

use super::primes::gen_prime;
use super::CryptoError;

/// Default modulus size for production keys.
pub const DEFAULT_KEY_BITS: u64 = 2048;

/// Fresh prime pairs drawn before key generation gives up.
const MAX_KEYPAIR_ATTEMPTS: usize = 16;

/// Paillier public key: the modulus `n = p * q` plus derived values.
///
/// Safe to distribute; the evaluator computes on ciphertexts with nothing
/// else.
#[derive(Clone)]
pub struct PublicKey {
    n: BigUint,
    n_squared: BigUint,
    max_int: BigUint,
}

impl PublicKey {
    /// Build a public key from a modulus, precomputing `n^2` and the
    /// largest representable mantissa (`n/3 - 1`).
    #[must_use]
    pub fn new(n: BigUint) -> Self {
        let n_squared = &n * &n;
        let max_int = &n / 3u8 - BigUint::one();
        Self {
            n,
            n_squared,
            max_int,
        }
    }

    /// The modulus.
    #[must_use]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub(crate) fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    pub(crate) fn max_int(&self) -> &BigUint {
        &self.max_int
    }

    /// Bit length of the modulus.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Short SHA-256 fingerprint of the modulus for identification in logs
    /// and results (NOT secret).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.n.to_bytes_be());
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
    }
}

impl Eq for PublicKey {}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.n.bits())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Paillier private key.
///
/// Holds the prime factors of the paired public modulus plus the
/// precomputed decryption parameters `lambda = (p-1)(q-1)` and
/// `mu = lambda^-1 mod n`.
#[derive(Clone)]
pub struct PrivateKey {
    p: BigUint,
    q: BigUint,
    public: PublicKey,
    lambda: BigUint,
    mu: BigUint,
}

impl PrivateKey {
    /// Bind the prime pair `(p, q)` to its public key.
    ///
    /// # Errors
    /// Returns `CryptoError::KeyGeneration` if `p == q`, `p * q` does not
    /// equal the public modulus, or `lambda` is not invertible mod `n`.
    pub fn new(p: BigUint, q: BigUint, public: PublicKey) -> Result<Self, CryptoError> {
        if p == q {
            return Err(CryptoError::KeyGeneration(
                "p and q must be distinct primes".to_string(),
            ));
        }
        if &(&p * &q) != public.n() {
            return Err(CryptoError::KeyGeneration(
                "p * q does not match the public modulus".to_string(),
            ));
        }

        let lambda = (&p - 1u8) * (&q - 1u8);
        let mu = lambda.modinv(public.n()).ok_or_else(|| {
            CryptoError::KeyGeneration("lambda is not invertible mod n".to_string())
        })?;

        Ok(Self {
            p,
            q,
            public,
            lambda,
            mu,
        })
    }

    /// First prime factor.
    #[must_use]
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Second prime factor.
    #[must_use]
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The paired public key.
    #[must_use]
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub(crate) fn lambda(&self) -> &BigUint {
        &self.lambda
    }

    pub(crate) fn mu(&self) -> &BigUint {
        &self.mu
    }
}

// Intentionally NOT deriving Debug to prevent accidental factor leakage.
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_fingerprint", &self.public.fingerprint())
            .field("bits", &self.public.bits())
            .finish()
    }
}

/// Key pair containing both halves.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl KeyPair {
    /// Build a key pair from a private key and its paired public key.
    #[must_use]
    pub fn new(private: PrivateKey) -> Self {
        Self {
            public: private.public().clone(),
            private,
        }
    }
}

/// Generate a fresh key pair with a modulus of `bits` length.
///
/// Prime pairs are drawn until the modulus has the requested length,
/// `p != q`, and `gcd(n, (p-1)(q-1)) == 1`, up to a bounded attempt count.
///
/// # Errors
/// Returns `CryptoError::KeyGeneration` when no suitable pair is found
/// within the retry budget. Safe to retry with fresh randomness.
pub fn generate_keypair(bits: u64) -> Result<KeyPair, CryptoError> {
    let mut rng = rand::thread_rng();

    for attempt in 1..=MAX_KEYPAIR_ATTEMPTS {
        let p = gen_prime(bits / 2, &mut rng)?;
        let q = gen_prime(bits / 2, &mut rng)?;
        if p == q {
            continue;
        }

        let n = &p * &q;
        if n.bits() != bits {
            tracing::debug!(
                "Keypair attempt {attempt}: modulus has {} bits, want {bits}; retrying",
                n.bits()
            );
            continue;
        }

        let totient = (&p - 1u8) * (&q - 1u8);
        if n.gcd(&totient) != BigUint::one() {
            tracing::debug!("Keypair attempt {attempt}: gcd(n, totient) != 1; retrying");
            continue;
        }

        let public = PublicKey::new(n);
        let private = PrivateKey::new(p, q, public)?;
        let keys = KeyPair::new(private);
        tracing::info!(
            "Generated {bits}-bit keypair {}",
            keys.public.fingerprint()
        );
        return Ok(keys);
    }

    Err(CryptoError::KeyGeneration(format!(
        "no suitable prime pair after {MAX_KEYPAIR_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair_invariants() {
        let keys = generate_keypair(256).expect("Keygen should succeed");

        assert_eq!(keys.public.bits(), 256);
        assert_eq!(
            keys.private.p() * keys.private.q(),
            *keys.public.n()
        );
        assert_ne!(keys.private.p(), keys.private.q());
        assert_eq!(keys.private.public(), &keys.public);
    }

    #[test]
    fn test_mismatched_factors_rejected() {
        let a = generate_keypair(256).expect("Keygen should succeed");
        let b = generate_keypair(256).expect("Keygen should succeed");

        let result = PrivateKey::new(
            a.private.p().clone(),
            a.private.q().clone(),
            b.public.clone(),
        );
        assert!(matches!(result, Err(CryptoError::KeyGeneration(_))));
    }

    #[test]
    fn test_equal_factors_rejected() {
        let p = BigUint::from(251u32);
        let n = &p * &p;
        let result = PrivateKey::new(p.clone(), p, PublicKey::new(n));
        assert!(matches!(result, Err(CryptoError::KeyGeneration(_))));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let keys = generate_keypair(256).expect("Keygen should succeed");
        let fp = keys.public.fingerprint();
        assert_eq!(fp, keys.public.fingerprint());
        assert_eq!(fp.len(), 16); // 8 bytes = 16 hex chars
    }

    #[test]
    fn test_private_key_debug_no_leak() {
        let keys = generate_keypair(256).expect("Keygen should succeed");
        let debug_output = format!("{:?}", keys.private);

        assert!(!debug_output.contains(&keys.private.p().to_string()));
        assert!(!debug_output.contains(&keys.private.q().to_string()));
        assert!(debug_output.contains("public_fingerprint"));
    }
}
