//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use schnorr_zkp::{
    ByteChannel, Prover, Result, SessionOutcome, SessionRng, StreamChannel, Verifier,
};
use tokio::io::{duplex, DuplexStream};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from the library are shown. Subsequent calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("schnorr_zkp=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// Two connected in-memory channel ends: `(prover side, verifier side)`.
pub fn channel_pair() -> (StreamChannel<DuplexStream>, StreamChannel<DuplexStream>) {
    let (prover_end, verifier_end) = duplex(256);
    (StreamChannel::new(prover_end), StreamChannel::new(verifier_end))
}

/// Runs both parties concurrently over the given channels.
pub async fn run_session<P, V>(
    prover: &mut Prover<SessionRng>,
    prover_channel: &mut P,
    verifier: &mut Verifier<SessionRng>,
    verifier_channel: &mut V,
) -> (Result<SessionOutcome>, Result<SessionOutcome>)
where
    P: ByteChannel,
    V: ByteChannel,
{
    tokio::join!(
        prover.run(prover_channel),
        verifier.run(verifier_channel)
    )
}

/// Channel wrapper that flips the low bit of one 8-byte write.
///
/// Prover 8-byte writes are numbered from zero: `y`, then `C` and the
/// response for each round, so round `k`'s response is write `2 + 2k`.
pub struct TamperingChannel<C> {
    inner: C,
    wide_writes: usize,
    target: usize,
}

impl<C: ByteChannel> TamperingChannel<C> {
    /// Tampers with the response of round `round`.
    pub fn response_of_round(inner: C, round: usize) -> Self {
        Self {
            inner,
            wide_writes: 0,
            target: 2 + 2 * round,
        }
    }
}

impl<C: ByteChannel> ByteChannel for TamperingChannel<C> {
    async fn read_fixed(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_fixed(buf).await
    }

    async fn write_fixed(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != 8 {
            return self.inner.write_fixed(bytes).await;
        }

        let index = self.wide_writes;
        self.wide_writes += 1;
        if index == self.target {
            let mut tampered = [0u8; 8];
            tampered.copy_from_slice(bytes);
            tampered[7] ^= 0x01;
            return self.inner.write_fixed(&tampered).await;
        }
        self.inner.write_fixed(bytes).await
    }

    async fn flush(&mut self) -> Result<()> {
        self.inner.flush().await
    }
}
