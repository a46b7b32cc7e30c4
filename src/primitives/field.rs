use std::num::NonZeroU64;

use crate::{Error, Result};

/// Multiplies two residues modulo `modulus`.
///
/// The product is formed in 128 bits, so no intermediate value can overflow
/// regardless of the size of the operands.
#[inline]
pub(crate) fn mul_mod(a: u64, b: u64, modulus: NonZeroU64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(modulus.get())) as u64
}

/// Computes `base^exponent mod modulus` by square-and-multiply.
///
/// Infallible counterpart of [`mod_pow`] for callers that already hold a
/// validated modulus.
pub(crate) fn pow_mod(base: u64, exponent: u64, modulus: NonZeroU64) -> u64 {
    if modulus.get() == 1 {
        return 0;
    }

    let mut result = 1u64;
    let mut base = base % modulus.get();
    let mut exponent = exponent;

    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }

    result
}

/// Performs modular exponentiation on 64-bit integers.
///
/// Computes `base^exponent mod modulus` exactly. An exponent of zero yields 1
/// (for any modulus above 1), including `0^0`.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if `modulus` is zero.
///
/// # Examples
///
/// ```rust
/// use schnorr_zkp::mod_pow;
///
/// assert_eq!(mod_pow(5, 6, 23).unwrap(), 8);
/// assert!(mod_pow(5, 6, 0).is_err());
/// ```
pub fn mod_pow(base: u64, exponent: u64, modulus: u64) -> Result<u64> {
    let modulus = NonZeroU64::new(modulus)
        .ok_or_else(|| Error::MalformedInput("modulus cannot be zero".to_string()))?;
    Ok(pow_mod(base, exponent, modulus))
}
