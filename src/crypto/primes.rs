//! Random prime search for Paillier key generation.

use num_bigint::{BigUint, RandBigInt};
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use num_traits::One;
use rand::Rng;

use super::CryptoError;

/// Candidates examined before a single prime search gives up.
const CANDIDATE_BUDGET: usize = 50_000;

/// Draw a random prime of exactly `bits` length.
///
/// Candidates get the top bit forced (exact length) and the low bit forced
/// (odd), then a BPSW/Miller-Rabin probabilistic test.
///
/// # Errors
/// Returns `CryptoError::KeyGeneration` when the candidate budget is
/// exhausted. Retrying with fresh randomness is safe.
pub(crate) fn gen_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<BigUint, CryptoError> {
    if bits < 2 {
        return Err(CryptoError::KeyGeneration(format!(
            "prime length {bits} is too small"
        )));
    }

    for _ in 0..CANDIDATE_BUDGET {
        let mut candidate = rng.gen_biguint(bits);
        candidate |= BigUint::one() << (bits - 1);
        candidate |= BigUint::one();

        if is_prime(&candidate, Some(PrimalityTestConfig::default())).probably() {
            return Ok(candidate);
        }
    }

    Err(CryptoError::KeyGeneration(format!(
        "no {bits}-bit prime found within {CANDIDATE_BUDGET} candidates"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_has_requested_length() {
        let mut rng = rand::thread_rng();
        for bits in [32, 64, 128] {
            let p = gen_prime(bits, &mut rng).expect("Prime search should succeed");
            assert_eq!(p.bits(), bits);
        }
    }

    #[test]
    fn test_prime_is_odd() {
        let mut rng = rand::thread_rng();
        let p = gen_prime(64, &mut rng).expect("Prime search should succeed");
        assert!(p.bit(0));
    }

    #[test]
    fn test_degenerate_length_rejected() {
        let mut rng = rand::thread_rng();
        assert!(gen_prime(1, &mut rng).is_err());
    }
}
