//! Protocol gadgets for the interactive Schnorr identification scheme.
//!
//! This module contains the values exchanged or held during a session:
//! parameters, secret, public commitment, per-round nonce, commitment,
//! challenge and response, and the session outcome.

use std::fmt;
use std::num::NonZeroU64;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::primitives::field::{mul_mod, pow_mod};
use crate::{Error, Result};

/// Exclusive upper bound for secrets, nonces and generators (`2^31`).
pub const RANDOM_VALUE_BOUND: u64 = 1 << 31;

/// Length in bytes of the encoded setup message.
pub const PARAMETERS_WIRE_LEN: usize = 16;

/// Public parameters chosen by the verifier for one session.
///
/// The modulus is stored as a [`NonZeroU64`] of at least 3, so every
/// exponentiation under these parameters is well defined.
///
/// # Security
///
/// The generator is not checked to be a primitive root modulo the modulus,
/// nor even to lie in `(1, modulus)`. A generator congruent to 0 or 1, or one
/// of small order, weakens the proof; this is a known property of the scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolParameters {
    generator: u64,
    modulus: NonZeroU64,
}

impl ProtocolParameters {
    /// Creates parameters from a generator and a modulus.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the modulus is below 3 or either
    /// value does not fit the signed 64-bit wire encoding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_zkp::ProtocolParameters;
    ///
    /// let params = ProtocolParameters::new(5, 23).unwrap();
    /// assert_eq!(params.pow(6), 8);
    /// assert!(ProtocolParameters::new(5, 2).is_err());
    /// ```
    pub fn new(generator: u64, modulus: u64) -> Result<Self> {
        if modulus < 3 {
            return Err(Error::MalformedInput(format!(
                "modulus must be at least 3, got {modulus}"
            )));
        }
        if i64::try_from(generator).is_err() || i64::try_from(modulus).is_err() {
            return Err(Error::MalformedInput(
                "parameters exceed the signed 64-bit wire range".to_string(),
            ));
        }
        let modulus = NonZeroU64::new(modulus)
            .ok_or_else(|| Error::MalformedInput("modulus cannot be zero".to_string()))?;

        Ok(Self { generator, modulus })
    }

    /// Returns the generator `g`.
    pub fn generator(&self) -> u64 {
        self.generator
    }

    /// Returns the modulus `p`.
    pub fn modulus(&self) -> u64 {
        self.modulus.get()
    }

    /// Computes `g^exponent mod p`.
    pub fn pow(&self, exponent: u64) -> u64 {
        pow_mod(self.generator, exponent, self.modulus)
    }

    /// Computes `a * b mod p`.
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        mul_mod(a, b, self.modulus)
    }

    /// Order of the exponent group, `p - 1`.
    pub fn exponent_modulus(&self) -> u64 {
        self.modulus.get() - 1
    }

    /// Encodes the setup message: generator then modulus, big-endian.
    pub fn to_bytes(&self) -> [u8; PARAMETERS_WIRE_LEN] {
        let mut bytes = [0u8; PARAMETERS_WIRE_LEN];
        bytes[..8].copy_from_slice(&(self.generator as i64).to_be_bytes());
        bytes[8..].copy_from_slice(&(self.modulus.get() as i64).to_be_bytes());
        bytes
    }

    /// Decodes and validates a setup message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the slice has the wrong length,
    /// either field is negative, or the modulus is below 3.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PARAMETERS_WIRE_LEN {
            return Err(Error::MalformedInput(format!(
                "setup message must be {PARAMETERS_WIRE_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let mut generator = [0u8; 8];
        let mut modulus = [0u8; 8];
        generator.copy_from_slice(&bytes[..8]);
        modulus.copy_from_slice(&bytes[8..]);

        Self::new(
            non_negative(i64::from_be_bytes(generator), "generator")?,
            non_negative(i64::from_be_bytes(modulus), "modulus")?,
        )
    }
}

/// Converts a signed wire value into an unsigned one.
pub(crate) fn non_negative(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::MalformedInput(format!("{field} must be non-negative, got {value}")))
}

/// The prover's secret exponent `x`.
///
/// Never transmitted and zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ProverSecret {
    x: u64,
}

impl ProverSecret {
    /// Wraps a secret exponent.
    pub fn new(x: u64) -> Self {
        Self { x }
    }

    /// Returns the secret exponent.
    pub(crate) fn x(&self) -> u64 {
        self.x
    }
}

impl fmt::Debug for ProverSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProverSecret(..)")
    }
}

/// Public commitment `y = g^x mod p` sent once during setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicCommitment {
    y: u64,
}

impl PublicCommitment {
    /// Computes `y` for `secret` under `params`.
    pub fn from_secret(params: &ProtocolParameters, secret: &ProverSecret) -> Self {
        Self {
            y: params.pow(secret.x()),
        }
    }

    /// Wraps a received value.
    pub fn new(y: u64) -> Self {
        Self { y }
    }

    /// Returns `y`.
    pub fn y(&self) -> u64 {
        self.y
    }
}

/// Per-round secret nonce `r`.
///
/// Lives for one round only and is zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Nonce {
    r: u64,
}

impl Nonce {
    /// Wraps a nonce value.
    pub fn new(r: u64) -> Self {
        Self { r }
    }

    /// Returns the nonce value.
    pub fn r(&self) -> u64 {
        self.r
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(..)")
    }
}

/// Round commitment `C = g^r mod p`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment {
    c: u64,
}

impl Commitment {
    /// Wraps a commitment value.
    pub fn new(c: u64) -> Self {
        Self { c }
    }

    /// Returns `C`.
    pub fn c(&self) -> u64 {
        self.c
    }
}

/// The verifier's per-round challenge bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Challenge {
    /// Bit set: the prover must reveal `r`.
    RevealNonce,
    /// Bit clear: the prover must reveal `(x + r) mod (p - 1)`.
    RevealBlindedSecret,
}

impl Challenge {
    /// Maps the wire bit to a challenge.
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Self::RevealNonce
        } else {
            Self::RevealBlindedSecret
        }
    }

    /// Maps the challenge to its wire bit.
    pub fn bit(self) -> bool {
        matches!(self, Self::RevealNonce)
    }
}

/// The prover's answer to a challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response {
    value: u64,
}

impl Response {
    /// Wraps a response value.
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    /// Returns the response value.
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Terminal state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every round passed.
    Accepted {
        /// Number of rounds run.
        rounds: u32,
    },
    /// Verification failed in round `round` (zero-based); later rounds were not run.
    RejectedAt {
        /// Index of the failing round.
        round: u32,
    },
}

impl SessionOutcome {
    /// Returns `true` for [`SessionOutcome::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { rounds } => write!(f, "accepted after {rounds} rounds"),
            Self::RejectedAt { round } => write!(f, "rejected at round {round}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_reject_small_modulus() {
        for modulus in [0, 1, 2] {
            assert!(matches!(
                ProtocolParameters::new(5, modulus),
                Err(Error::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn parameters_reject_unencodable_values() {
        assert!(ProtocolParameters::new(u64::MAX, 23).is_err());
        assert!(ProtocolParameters::new(5, u64::MAX).is_err());
    }

    #[test]
    fn parameters_wire_layout_is_big_endian() {
        let params = ProtocolParameters::new(5, 23).unwrap();
        let bytes = params.to_bytes();
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 5]);
        assert_eq!(&bytes[8..], &[0, 0, 0, 0, 0, 0, 0, 23]);
        assert_eq!(ProtocolParameters::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn parameters_decode_rejects_negative_fields() {
        let mut bytes = ProtocolParameters::new(5, 23).unwrap().to_bytes();
        bytes[8] = 0x80;
        assert!(ProtocolParameters::from_bytes(&bytes).is_err());
        assert!(ProtocolParameters::from_bytes(&bytes[..15]).is_err());
    }

    #[test]
    fn public_commitment_matches_worked_example() {
        let params = ProtocolParameters::new(5, 23).unwrap();
        let secret = ProverSecret::new(6);
        assert_eq!(PublicCommitment::from_secret(&params, &secret).y(), 8);
    }

    #[test]
    fn challenge_bit_mapping() {
        assert_eq!(Challenge::from_bit(true), Challenge::RevealNonce);
        assert_eq!(Challenge::from_bit(false), Challenge::RevealBlindedSecret);
        assert!(Challenge::RevealNonce.bit());
        assert!(!Challenge::RevealBlindedSecret.bit());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = ProverSecret::new(123_456);
        assert!(!format!("{secret:?}").contains("123456"));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            SessionOutcome::Accepted { rounds: 5 }.to_string(),
            "accepted after 5 rounds"
        );
        assert_eq!(
            SessionOutcome::RejectedAt { round: 2 }.to_string(),
            "rejected at round 2"
        );
    }
}
