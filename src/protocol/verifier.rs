use std::time::Instant;

use metrics::{counter, histogram};
use rand::Rng;
use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use super::{
    ByteChannel, Challenge, Commitment, ProtocolParameters, PublicCommitment, Response,
    SessionOutcome, RANDOM_VALUE_BOUND,
};
use crate::primitives::{generate_probable_prime, required_rounds, DEFAULT_MIN_THRESHOLD};
use crate::{Error, Result};

/// How many rounds the verifier demands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundBudget {
    /// Enough rounds to reach this confidence (see [`required_rounds`]).
    Threshold(f64),
    /// A fixed number of rounds.
    Fixed(u32),
}

impl RoundBudget {
    /// Resolves the budget to a round count that fits the wire field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] for a threshold outside `(0, 1)` or a
    /// fixed count of zero or above `i32::MAX`.
    pub fn rounds(&self) -> Result<u32> {
        let rounds = match *self {
            Self::Threshold(threshold) => required_rounds(threshold)?,
            Self::Fixed(rounds) => rounds,
        };
        if rounds == 0 || i32::try_from(rounds).is_err() {
            return Err(Error::MalformedInput(format!(
                "round count must lie in [1, {}], got {rounds}",
                i32::MAX
            )));
        }
        Ok(rounds)
    }
}

impl Default for RoundBudget {
    fn default() -> Self {
        Self::Threshold(DEFAULT_MIN_THRESHOLD)
    }
}

/// Verifier for the interactive Schnorr identification protocol.
///
/// Chooses the session parameters, fixes the number of rounds and checks one
/// response per round, stopping at the first failure.
///
/// # Security
///
/// - Challenges are only unpredictable if the generator is; use a fresh
///   [`SessionRng`](crate::SessionRng) per session
/// - The generator is not checked to be a primitive root (see
///   [`ProtocolParameters`])
pub struct Verifier<R: CryptoRngCore> {
    rng: R,
    rounds: u32,
}

impl<R: CryptoRngCore> Verifier<R> {
    /// Creates a verifier with the given round budget.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the budget is invalid; this is
    /// checked before any channel I/O.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_zkp::{RoundBudget, SessionRng, Verifier};
    ///
    /// let verifier = Verifier::new(SessionRng::new(), RoundBudget::Threshold(0.95)).unwrap();
    /// assert_eq!(verifier.rounds(), 5);
    /// assert!(Verifier::new(SessionRng::new(), RoundBudget::Threshold(1.5)).is_err());
    /// ```
    pub fn new(rng: R, budget: RoundBudget) -> Result<Self> {
        let rounds = budget.rounds()?;
        Ok(Self { rng, rounds })
    }

    /// Number of rounds this verifier will demand.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Draws fresh session parameters: a random generator in `[0, 2^31)` and
    /// a probable prime modulus in `[2^16, 2^17)`.
    pub fn generate_parameters(&mut self) -> Result<ProtocolParameters> {
        let generator = self.rng.gen_range(0..RANDOM_VALUE_BOUND);
        let modulus = generate_probable_prime(&mut self.rng);
        ProtocolParameters::new(generator, modulus)
    }

    /// Interactive protocol: draws a uniformly random challenge bit.
    pub fn challenge(&mut self) -> Challenge {
        Challenge::from_bit(self.rng.gen_bool(0.5))
    }

    /// Interactive protocol: checks one round.
    ///
    /// - [`Challenge::RevealNonce`]: `C == g^response mod p`
    /// - [`Challenge::RevealBlindedSecret`]: `C * y mod p == g^response mod p`
    pub fn verify_round(
        params: &ProtocolParameters,
        y: &PublicCommitment,
        commitment: &Commitment,
        challenge: Challenge,
        response: &Response,
    ) -> bool {
        let expected = params.pow(response.value());
        match challenge {
            Challenge::RevealNonce => commitment.c() == expected,
            Challenge::RevealBlindedSecret => params.mul(commitment.c(), y.y()) == expected,
        }
    }

    /// Runs a complete session as the verifier with freshly drawn parameters.
    ///
    /// # Errors
    ///
    /// Returns a channel error if the channel fails. A failed round is
    /// reported as [`SessionOutcome::RejectedAt`], not as an error.
    pub async fn run<C: ByteChannel>(&mut self, channel: &mut C) -> Result<SessionOutcome> {
        let params = self.generate_parameters()?;
        self.run_with_parameters(channel, params).await
    }

    /// Runs a complete session as the verifier with the given parameters.
    pub async fn run_with_parameters<C: ByteChannel>(
        &mut self,
        channel: &mut C,
        params: ProtocolParameters,
    ) -> Result<SessionOutcome> {
        let rounds = self.rounds;
        let wire_rounds = i32::try_from(rounds).map_err(|_| {
            Error::MalformedInput(format!("round count {rounds} does not fit the wire field"))
        })?;
        let start = Instant::now();
        counter!("zkp.verifier.sessions").increment(1);

        info!(
            generator = params.generator(),
            prime = params.modulus(),
            "using generator and prime"
        );
        channel.write_fixed(&params.to_bytes()).await?;
        channel.flush().await?;

        let y = PublicCommitment::new(channel.read_u64_field("y").await?);
        info!(y = y.y(), "received public commitment");

        info!(rounds, "requiring rounds");
        channel.write_i32(wire_rounds).await?;
        channel.flush().await?;

        let outcome = self.round_loop(channel, &params, &y, rounds).await?;

        histogram!("zkp.verifier.session.duration").record(start.elapsed().as_secs_f64());
        match outcome {
            SessionOutcome::Accepted { .. } => {
                counter!("zkp.verifier.sessions.accepted").increment(1);
                info!(rounds, "proof accepted");
            }
            SessionOutcome::RejectedAt { round } => {
                counter!("zkp.verifier.sessions.rejected").increment(1);
                warn!(round, "proof stopping: verification failed");
            }
        }

        Ok(outcome)
    }

    async fn round_loop<C: ByteChannel>(
        &mut self,
        channel: &mut C,
        params: &ProtocolParameters,
        y: &PublicCommitment,
        rounds: u32,
    ) -> Result<SessionOutcome> {
        for round in 0..rounds {
            let commitment = channel.read_i64().await?;

            let challenge = self.challenge();
            channel.write_bool(challenge.bit()).await?;
            channel.flush().await?;
            match challenge {
                Challenge::RevealNonce => debug!(round, "requesting r"),
                Challenge::RevealBlindedSecret => debug!(round, "requesting (x + r) mod (p - 1)"),
            }

            let response = channel.read_i64().await?;

            // Negative values can never come from an honest prover.
            let accepted = match (u64::try_from(commitment), u64::try_from(response)) {
                (Ok(commitment), Ok(response)) => Self::verify_round(
                    params,
                    y,
                    &Commitment::new(commitment),
                    challenge,
                    &Response::new(response),
                ),
                _ => false,
            };

            channel.write_bool(accepted).await?;
            channel.flush().await?;

            if !accepted {
                counter!("zkp.verifier.rounds.rejected").increment(1);
                warn!(round, "proof information is incorrect");
                return Ok(SessionOutcome::RejectedAt { round });
            }
            counter!("zkp.verifier.rounds.accepted").increment(1);
            debug!(round, "round verified");
        }

        Ok(SessionOutcome::Accepted { rounds })
    }
}
