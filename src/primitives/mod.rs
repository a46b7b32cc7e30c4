//! Number-theoretic primitives for the identification protocol.
//!
//! - **field**: exact modular exponentiation on 64-bit integers
//! - **primality**: Miller–Rabin testing and random prime generation
//! - **soundness**: confidence threshold to round count conversion
//! - **rng**: per-session random number generation

/// Modular arithmetic.
pub mod field;
/// Primality testing and prime generation.
pub mod primality;
/// Per-session randomness.
pub mod rng;
/// Soundness calculator.
pub mod soundness;

pub use field::mod_pow;
pub use primality::{
    generate_probable_prime, is_probable_prime, is_strong_probable_prime, PRIME_LOWER_BOUND,
    PRIME_TEST_ROUNDS, PRIME_UPPER_BOUND,
};
pub use rng::SessionRng;
pub use soundness::{required_rounds, DEFAULT_MIN_THRESHOLD};
