use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use schnorr_zkp::{Prover, ProverConfig, SessionOutcome, SessionRng, StreamChannel};
use tokio::net::TcpStream;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Schnorr identification prover", long_about = None)]
#[command(version)]
struct Args {
    /// Verifier host
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Verifier port
    #[arg(short, long)]
    port: Option<u16>,

    /// Per-operation channel timeout in seconds (0 = none)
    #[arg(long)]
    timeout: Option<u64>,

    /// Seed for deterministic session randomness
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut ProverConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.io_timeout_secs = timeout;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

async fn prove(config: &ProverConfig) -> schnorr_zkp::Result<SessionOutcome> {
    let addr = config.addr().await?;
    let stream = TcpStream::connect(addr).await?;
    info!(%addr, "connected to verifier");

    let rng = match config.seed {
        Some(seed) => SessionRng::from_seed(seed),
        None => SessionRng::new(),
    };
    let mut prover = Prover::new(rng);
    let mut channel = StreamChannel::with_timeout(stream, config.io_timeout());
    prover.run(&mut channel).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ProverConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        ProverConfig::default()
    });
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match prove(&config).await {
        Ok(outcome) => {
            let color = if outcome.is_accepted() {
                Color::Green
            } else {
                Color::Red
            };
            let mut stdout = io::stdout();
            execute!(
                stdout,
                SetForegroundColor(color),
                Print(format!("Proof {outcome}\n")),
                ResetColor
            )
            .ok();
            stdout.flush().ok();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Couldn't prove to verifier at {}:{}: {e}", config.host, config.port);
            ExitCode::FAILURE
        }
    }
}
