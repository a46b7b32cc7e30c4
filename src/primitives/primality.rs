//! Miller–Rabin primality testing and random prime generation.

use std::num::NonZeroU64;

use rand::Rng;
use rand_core::CryptoRngCore;
use tracing::trace;

use super::field::{mul_mod, pow_mod};

/// Number of Miller–Rabin rounds used when generating protocol moduli.
pub const PRIME_TEST_ROUNDS: u32 = 128;

/// Bit width of the window `[2^PRIME_BITS, 2^(PRIME_BITS + 1))` primes are drawn from.
pub const PRIME_BITS: u32 = 16;

/// Smallest value the prime generator may return.
pub const PRIME_LOWER_BOUND: u64 = 1 << PRIME_BITS;

/// Exclusive upper bound of the prime generator's window.
pub const PRIME_UPPER_BOUND: u64 = 1 << (PRIME_BITS + 1);

/// Splits `n - 1` into `2^s * d` with `d` odd. Requires odd `n > 1`.
fn decompose(n: u64) -> (u32, u64) {
    let n_minus_one = n - 1;
    let s = n_minus_one.trailing_zeros();
    (s, n_minus_one >> s)
}

/// Runs one Miller–Rabin trial of odd `n` against witness `a`.
fn witness_passes(n: NonZeroU64, a: u64, s: u32, d: u64) -> bool {
    let n_minus_one = n.get() - 1;
    let mut x = pow_mod(a, d, n);
    if x == 1 || x == n_minus_one {
        return true;
    }

    for _ in 1..s {
        x = mul_mod(x, x, n);
        if x == n_minus_one {
            return true;
        }
    }

    false
}

/// Checks whether odd `n > 3` is a strong probable prime to base `witness`.
///
/// A composite that passes is a strong pseudoprime to that base; the witness
/// `a` is then called a strong liar for `n`. Returns `false` for inputs
/// outside the domain of the test (even `n`, `n <= 3`, or a witness outside
/// `[2, n - 2]`).
///
/// # Examples
///
/// ```rust
/// use schnorr_zkp::is_strong_probable_prime;
///
/// assert!(is_strong_probable_prime(97, 2));
/// // 2047 = 23 * 89 is the smallest strong pseudoprime to base 2.
/// assert!(is_strong_probable_prime(2047, 2));
/// assert!(!is_strong_probable_prime(2047, 3));
/// ```
pub fn is_strong_probable_prime(n: u64, witness: u64) -> bool {
    if n <= 3 || n % 2 == 0 || witness < 2 || witness > n - 2 {
        return false;
    }
    let Some(modulus) = NonZeroU64::new(n) else {
        return false;
    };
    let (s, d) = decompose(n);
    witness_passes(modulus, witness, s, d)
}

/// Probabilistic Miller–Rabin primality test.
///
/// Draws `rounds` independent witnesses uniformly from `[2, n - 2]` and
/// returns `false` as soon as one of them proves `n` composite. A prime is
/// never rejected; a composite survives with probability at most
/// `4^-rounds`. Carmichael numbers get no special treatment.
///
/// Inputs below 4 and even inputs are decided directly without consuming
/// randomness.
pub fn is_probable_prime<R: CryptoRngCore>(n: u64, rounds: u32, rng: &mut R) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n % 2 == 0 => return false,
        _ => {}
    }

    let Some(modulus) = NonZeroU64::new(n) else {
        return false;
    };
    let (s, d) = decompose(n);

    for _ in 0..rounds {
        let a = rng.gen_range(2..=n - 2);
        if !witness_passes(modulus, a, s, d) {
            return false;
        }
    }

    true
}

/// Generates a random probable prime in `[2^16, 2^17)`.
///
/// Candidates are sampled uniformly from the window, bumped to the next odd
/// number when even, and kept once they pass [`PRIME_TEST_ROUNDS`] rounds of
/// Miller–Rabin. The search has no iteration cap; roughly one candidate in
/// eleven is prime in this window.
pub fn generate_probable_prime<R: CryptoRngCore>(rng: &mut R) -> u64 {
    loop {
        let mut candidate = rng.gen_range(PRIME_LOWER_BOUND..PRIME_UPPER_BOUND);
        if candidate % 2 == 0 {
            candidate += 1;
        }
        trace!(candidate, "testing prime candidate");

        if is_probable_prime(candidate, PRIME_TEST_ROUNDS, rng) {
            return candidate;
        }
    }
}
