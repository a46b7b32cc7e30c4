/// Byte channel abstraction and wire codec.
pub mod channel;
/// Core protocol types (parameters, secret, commitments, challenge, outcome).
pub mod gadgets;
/// Prover state machine.
pub mod prover;
/// Verifier state machine.
pub mod verifier;

pub use channel::{ByteChannel, StreamChannel};
pub use gadgets::{
    Challenge, Commitment, Nonce, ProtocolParameters, ProverSecret, PublicCommitment, Response,
    SessionOutcome, PARAMETERS_WIRE_LEN, RANDOM_VALUE_BOUND,
};
pub use prover::Prover;
pub use verifier::{RoundBudget, Verifier};
