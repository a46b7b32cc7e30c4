//! Interactive Schnorr-style zero-knowledge proof of knowledge of a discrete logarithm.
//!
//! A [`Prover`] holding a secret `x` convinces a [`Verifier`] that it knows
//! `x` with `y = g^x mod p`, without revealing `x`. The verifier picks the
//! generator `g` and a random prime `p`, fixes a number of rounds from a
//! target confidence, and in every round asks either for the nonce `r` behind
//! the commitment `C = g^r mod p` or for `(x + r) mod (p - 1)`. A cheating
//! prover survives each round with probability 1/2.
//!
//! # Quick start
//!
//! ```rust
//! use schnorr_zkp::{Prover, RoundBudget, SessionRng, StreamChannel, Verifier};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> schnorr_zkp::Result<()> {
//! let (prover_end, verifier_end) = tokio::io::duplex(64);
//! let mut prover_channel = StreamChannel::new(prover_end);
//! let mut verifier_channel = StreamChannel::new(verifier_end);
//!
//! let mut prover = Prover::new(SessionRng::new());
//! let mut verifier = Verifier::new(SessionRng::new(), RoundBudget::Threshold(0.95))?;
//!
//! let (proved, verified) = tokio::join!(
//!     prover.run(&mut prover_channel),
//!     verifier.run(&mut verifier_channel),
//! );
//! assert_eq!(proved?, verified?);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: modular exponentiation, Miller–Rabin, prime generation,
//!   soundness calculator and per-session randomness
//! - [`protocol`]: wire channel, protocol values and the two state machines
//! - [`config`]: layered configuration for the binaries
//! - [`server`]: multi-session TCP verifier loop

#![warn(missing_docs)]

/// Binary configuration.
pub mod config;
/// Error types.
pub mod error;
/// Number-theoretic primitives.
pub mod primitives;
/// Interactive protocol engine.
pub mod protocol;
/// TCP verifier server.
pub mod server;

pub use config::{resolve, MetricsSettings, ProverConfig, VerifierConfig};
pub use error::{Error, Result};
pub use primitives::{
    generate_probable_prime, is_probable_prime, is_strong_probable_prime, mod_pow,
    required_rounds, SessionRng, DEFAULT_MIN_THRESHOLD, PRIME_LOWER_BOUND, PRIME_TEST_ROUNDS,
    PRIME_UPPER_BOUND,
};
pub use protocol::{
    ByteChannel, Challenge, Commitment, Nonce, ProtocolParameters, Prover, ProverSecret,
    PublicCommitment, Response, RoundBudget, SessionOutcome, StreamChannel, Verifier,
    PARAMETERS_WIRE_LEN, RANDOM_VALUE_BOUND,
};
