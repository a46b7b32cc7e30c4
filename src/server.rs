//! Multi-session verifier server.
//!
//! Each accepted connection runs one verifier session with its own
//! [`SessionRng`]. A failing session is logged and counted; only bind and
//! accept failures end the server.

use std::future::Future;

use metrics::counter;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::{Result, SessionOutcome, SessionRng, StreamChannel, Verifier, VerifierConfig};

/// Resolves the configured host and binds the listener.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) if the host does not
/// resolve and [`Error::Channel`](crate::Error::Channel) if binding fails.
pub async fn bind(config: &VerifierConfig) -> Result<TcpListener> {
    let addr = config.addr().await?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "verifier listening");
    Ok(listener)
}

/// Serves sessions until `max_sessions` have run or `shutdown` completes.
///
/// `report` is called with the session index and outcome of every session
/// that finishes. Returns the number of sessions served, failed ones
/// included. A session still running when `shutdown` completes is dropped
/// and not counted.
///
/// # Errors
///
/// Returns an error if the round budget is invalid or accepting fails.
pub async fn serve<F, H>(
    listener: &TcpListener,
    config: &VerifierConfig,
    shutdown: F,
    mut report: H,
) -> Result<u64>
where
    F: Future<Output = ()>,
    H: FnMut(u64, &SessionOutcome),
{
    config.round_budget().rounds()?;
    tokio::pin!(shutdown);

    let mut served = 0u64;
    while config.max_sessions == 0 || served < config.max_sessions {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            () = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
        };
        info!(%peer, session = served, "prover connected");

        tokio::select! {
            biased;
            result = verify_session(stream, config, served) => match result {
                Ok(outcome) => report(served, &outcome),
                Err(e) => {
                    counter!("zkp.verifier.sessions.failed").increment(1);
                    error!(%peer, session = served, "session failed: {e}");
                }
            },
            () = &mut shutdown => {
                info!(session = served, "shutdown requested, abandoning session");
                break;
            }
        }

        served += 1;
    }

    Ok(served)
}

async fn verify_session(
    stream: TcpStream,
    config: &VerifierConfig,
    index: u64,
) -> Result<SessionOutcome> {
    let rng = SessionRng::for_session(config.seed, index);
    let mut verifier = Verifier::new(rng, config.round_budget())?;
    let mut channel = StreamChannel::with_timeout(stream, config.io_timeout());
    verifier.run(&mut channel).await
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::sync::oneshot;

    use super::*;
    use crate::{Error, Prover};

    fn loopback(max_sessions: u64) -> VerifierConfig {
        VerifierConfig {
            port: 0,
            max_sessions,
            seed: Some(42),
            ..VerifierConfig::default()
        }
    }

    async fn prove(addr: std::net::SocketAddr, seed: u64) -> Result<SessionOutcome> {
        let stream = TcpStream::connect(addr).await?;
        let mut prover = Prover::new(SessionRng::from_seed(seed));
        prover.run(&mut StreamChannel::new(stream)).await
    }

    #[tokio::test]
    async fn failed_session_does_not_stop_server() {
        let config = loopback(0);
        let listener = bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let clients = async move {
            drop(TcpStream::connect(addr).await.unwrap());
            let outcome = prove(addr, 7).await;
            stop.send(()).unwrap();
            outcome
        };
        let shutdown = async {
            let _ = stopped.await;
        };

        let mut outcomes = Vec::new();
        let (served, proved) = tokio::join!(
            serve(&listener, &config, shutdown, |index, outcome| {
                outcomes.push((index, *outcome))
            }),
            clients,
        );

        assert_eq!(served.unwrap(), 2);
        assert_eq!(proved.unwrap(), SessionOutcome::Accepted { rounds: 5 });
        assert_eq!(outcomes, vec![(1, SessionOutcome::Accepted { rounds: 5 })]);
    }

    #[tokio::test]
    async fn serves_configured_number_of_sessions() {
        let config = loopback(2);
        let listener = bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let clients = async move {
            let first = prove(addr, 1).await.unwrap();
            let second = prove(addr, 2).await.unwrap();
            (first, second)
        };

        let (served, (first, second)) = tokio::join!(
            serve(&listener, &config, std::future::pending(), |_, _| {}),
            clients,
        );

        assert_eq!(served.unwrap(), 2);
        assert!(first.is_accepted() && second.is_accepted());
    }

    #[tokio::test]
    async fn shutdown_interrupts_stalled_session() {
        let config = loopback(0);
        let listener = bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let stalled = async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let mut setup = [0u8; 16];
            stream.read_exact(&mut setup).await.unwrap();
            stop.send(()).unwrap();
            stream
        };
        let shutdown = async {
            let _ = stopped.await;
        };

        let (served, _stream) = tokio::join!(
            serve(&listener, &config, shutdown, |_, _| {}),
            stalled
        );
        assert_eq!(served.unwrap(), 0);
    }

    #[tokio::test]
    async fn binds_host_names() {
        let config = VerifierConfig {
            host: "localhost".to_string(),
            ..loopback(1)
        };
        let listener = bind(&config).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn invalid_budget_fails_before_accepting() {
        let config = VerifierConfig {
            fixed_rounds: Some(0),
            ..loopback(1)
        };
        let listener = bind(&config).await.unwrap();
        let result = serve(&listener, &config, std::future::pending(), |_, _| {}).await;
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }
}
