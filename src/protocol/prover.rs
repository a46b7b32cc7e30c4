use rand::Rng;
use rand_core::CryptoRngCore;
use tracing::{debug, info, warn};

use super::{
    ByteChannel, Challenge, Commitment, Nonce, ProtocolParameters, ProverSecret, PublicCommitment,
    Response, SessionOutcome, RANDOM_VALUE_BOUND,
};
use crate::{Error, Result};

/// Prover for the interactive Schnorr identification protocol.
///
/// Demonstrates knowledge of `x` with `y = g^x mod p` without revealing `x`.
/// The prover owns its session randomness; every nonce is drawn fresh from
/// it and used in exactly one round.
///
/// # Security
///
/// - Use a fresh [`SessionRng`](crate::SessionRng) per session
/// - Never reuse a [`Nonce`] across rounds (enforced by [`Prover::commit`])
/// - The secret is zeroized when the prover is dropped
pub struct Prover<R: CryptoRngCore> {
    rng: R,
    secret: ProverSecret,
}

impl<R: CryptoRngCore> Prover<R> {
    /// Creates a prover with a freshly drawn secret in `[0, 2^31)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_zkp::{Prover, SessionRng};
    ///
    /// let prover = Prover::new(SessionRng::new());
    /// ```
    pub fn new(mut rng: R) -> Self {
        let secret = ProverSecret::new(rng.gen_range(0..RANDOM_VALUE_BOUND));
        Self { rng, secret }
    }

    /// Creates a prover holding an existing secret.
    pub fn with_secret(rng: R, secret: ProverSecret) -> Self {
        Self { rng, secret }
    }

    /// Computes the public commitment `y = g^x mod p`.
    pub fn public_commitment(&self, params: &ProtocolParameters) -> PublicCommitment {
        PublicCommitment::from_secret(params, &self.secret)
    }

    /// Interactive protocol: draws a fresh nonce and its commitment `C = g^r mod p`.
    ///
    /// Returns the commitment and the nonce (must be kept secret).
    pub fn commit(&mut self, params: &ProtocolParameters) -> (Commitment, Nonce) {
        let nonce = Nonce::new(self.rng.gen_range(0..RANDOM_VALUE_BOUND));
        (Commitment::new(params.pow(nonce.r())), nonce)
    }

    /// Interactive protocol: answers a challenge for the given nonce.
    ///
    /// Reveals `r` for [`Challenge::RevealNonce`] and `(x + r) mod (p - 1)`
    /// for [`Challenge::RevealBlindedSecret`].
    pub fn respond(
        &self,
        params: &ProtocolParameters,
        nonce: &Nonce,
        challenge: Challenge,
    ) -> Response {
        match challenge {
            Challenge::RevealNonce => Response::new(nonce.r()),
            Challenge::RevealBlindedSecret => {
                let order = params.exponent_modulus();
                Response::new((self.secret.x() % order + nonce.r() % order) % order)
            }
        }
    }

    /// Runs a complete session as the prover.
    ///
    /// Receives the parameters, sends `y`, receives the round count and then
    /// answers that many challenges, stopping as soon as the verifier reports
    /// a failed round.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] for invalid parameters or a negative
    /// round count, and a channel error if the channel fails. A rejected proof
    /// is reported as [`SessionOutcome::RejectedAt`], not as an error.
    pub async fn run<C: ByteChannel>(&mut self, channel: &mut C) -> Result<SessionOutcome> {
        let mut setup = [0u8; super::PARAMETERS_WIRE_LEN];
        channel.read_fixed(&mut setup).await?;
        let params = ProtocolParameters::from_bytes(&setup)?;
        info!(
            generator = params.generator(),
            modulus = params.modulus(),
            "received protocol parameters"
        );

        let y = self.public_commitment(&params);
        channel.write_u64_field(y.y(), "y").await?;
        channel.flush().await?;
        info!(y = y.y(), "sent public commitment");

        let rounds = channel.read_i32().await?;
        let rounds = u32::try_from(rounds).map_err(|_| {
            Error::MalformedInput(format!("round count must be non-negative, got {rounds}"))
        })?;
        info!(rounds, "verifier requires rounds");

        for round in 0..rounds {
            let (commitment, nonce) = self.commit(&params);
            channel.write_u64_field(commitment.c(), "commitment").await?;
            channel.flush().await?;
            debug!(round, commitment = commitment.c(), "sent commitment");

            let challenge = Challenge::from_bit(channel.read_bool().await?);
            let response = self.respond(&params, &nonce, challenge);
            channel.write_u64_field(response.value(), "response").await?;
            channel.flush().await?;
            debug!(round, ?challenge, "answered challenge");

            if !channel.read_bool().await? {
                warn!(round, "proof stopping: verifier rejected the round");
                return Ok(SessionOutcome::RejectedAt { round });
            }
        }

        info!(rounds, "proof accepted");
        Ok(SessionOutcome::Accepted { rounds })
    }
}
