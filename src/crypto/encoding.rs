//! Fixed-point encoding of real numbers into the Paillier plaintext space.
//!
//! Paillier encrypts integers mod `n`. A real value is represented as
//! `mantissa * BASE^exponent` with the mantissa reduced mod `n`; negative
//! values occupy the top of the plaintext space as `n - |mantissa|`. The
//! exponent is chosen so the encoding preserves f64 relative precision
//! (~2^-53), and travels alongside every ciphertext.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{FromPrimitive, Signed, ToPrimitive};

use super::keys::PublicKey;
use super::CryptoError;

/// Encoding base. 16 keeps exponent arithmetic cheap: one exponent step is a
/// 4-bit shift of the mantissa.
pub const BASE: u32 = 16;
const LOG2_BASE: i64 = 4;

/// f64 mantissa width; the encoding preserves this relative precision.
const FLOAT_MANTISSA_BITS: i64 = 53;

/// A real number encoded for the plaintext space of a specific modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedNumber {
    /// Mantissa, already reduced mod `n`
    pub(crate) mantissa: BigUint,
    /// Power of `BASE` the mantissa is scaled by
    pub(crate) exponent: i64,
}

impl EncodedNumber {
    /// Encode `value` for the plaintext space of `key`.
    ///
    /// # Errors
    /// Returns `CryptoError::EncodingOverflow` if `value` is non-finite or
    /// its mantissa exceeds what the modulus can represent.
    pub fn encode(key: &PublicKey, value: f64) -> Result<Self, CryptoError> {
        if !value.is_finite() {
            return Err(CryptoError::EncodingOverflow(format!(
                "cannot encode non-finite value {value}"
            )));
        }

        let exponent = precision_exponent(value);
        let scaled = value * (f64::from(BASE)).powi(-exponent as i32);
        let int_rep = BigInt::from_f64(scaled.round()).ok_or_else(|| {
            CryptoError::EncodingOverflow(format!(
                "cannot represent {value} as an integer mantissa"
            ))
        })?;

        let max_int = BigInt::from(key.max_int().clone());
        if int_rep.abs() > max_int {
            return Err(CryptoError::EncodingOverflow(format!(
                "mantissa of {value} exceeds the capacity of a {}-bit modulus",
                key.bits()
            )));
        }

        let (sign, magnitude) = int_rep.into_parts();
        let mantissa = match sign {
            Sign::Minus => key.n() - magnitude,
            _ => magnitude,
        };

        Ok(Self { mantissa, exponent })
    }

    /// Decode back to an f64.
    ///
    /// # Errors
    /// Returns `CryptoError::EncodingOverflow` if the mantissa falls into the
    /// dead zone between the positive and negative ranges, which indicates a
    /// prior overflow or a corrupted ciphertext.
    pub fn decode(&self, key: &PublicKey) -> Result<f64, CryptoError> {
        if &self.mantissa >= key.n() {
            return Err(CryptoError::EncodingOverflow(
                "mantissa is not reduced mod n".to_string(),
            ));
        }

        let signed = if &self.mantissa <= key.max_int() {
            BigInt::from(self.mantissa.clone())
        } else if self.mantissa >= key.n() - key.max_int() {
            -BigInt::from(key.n() - &self.mantissa)
        } else {
            return Err(CryptoError::EncodingOverflow(
                "mantissa outside the representable range".to_string(),
            ));
        };

        let approx = signed.to_f64().ok_or_else(|| {
            CryptoError::EncodingOverflow("mantissa does not fit an f64".to_string())
        })?;
        Ok(approx * (f64::from(BASE)).powi(self.exponent as i32))
    }

    /// The exponent this number is scaled by.
    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }
}

/// Exponent such that `BASE^exponent` is no coarser than the ULP of `value`.
fn precision_exponent(value: f64) -> i64 {
    let lsb_exponent = frexp_exponent(value) - FLOAT_MANTISSA_BITS;
    lsb_exponent.div_euclid(LOG2_BASE)
}

/// Binary exponent of `value` as libc `frexp` reports it: `value = m * 2^e`
/// with `0.5 <= |m| < 1`. Zero maps to 0.
fn frexp_exponent(value: f64) -> i64 {
    if value == 0.0 {
        return 0;
    }
    let raw = ((value.to_bits() >> 52) & 0x7ff) as i64;
    if raw == 0 {
        // Subnormal: normalize, then correct by the shift.
        frexp_exponent(value * 2f64.powi(54)) - 54
    } else {
        raw - 1022
    }
}
