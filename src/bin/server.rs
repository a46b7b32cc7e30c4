use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use schnorr_zkp::{server, SessionOutcome, VerifierConfig};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Schnorr identification verifier", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Minimum confidence in (0, 1) the proof must reach
    #[arg(short = 't', long)]
    min_threshold: Option<f64>,

    /// Fixed number of rounds (overrides the threshold)
    #[arg(long)]
    rounds: Option<u32>,

    /// Sessions to serve before exiting (0 = until interrupted)
    #[arg(long)]
    sessions: Option<u64>,

    /// Per-operation channel timeout in seconds (0 = none)
    #[arg(long)]
    timeout: Option<u64>,

    /// Base seed for deterministic session randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Enable the Prometheus metrics endpoint
    #[arg(long)]
    metrics: bool,

    /// Metrics port
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Args {
    fn apply(self, config: &mut VerifierConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(threshold) = self.min_threshold {
            config.min_threshold = threshold;
        }
        if self.rounds.is_some() {
            config.fixed_rounds = self.rounds;
        }
        if let Some(sessions) = self.sessions {
            config.max_sessions = sessions;
        }
        if let Some(timeout) = self.timeout {
            config.io_timeout_secs = timeout;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.metrics {
            config.metrics.enabled = true;
        }
        if let Some(port) = self.metrics_port {
            config.metrics.port = port;
        }
    }
}

fn println_colored(color: Color, text: &str) {
    let mut stdout = io::stdout();
    execute!(stdout, SetForegroundColor(color), Print(text), ResetColor).ok();
    println!();
    stdout.flush().ok();
}

fn report(index: u64, outcome: &SessionOutcome) {
    let color = if outcome.is_accepted() {
        Color::Green
    } else {
        Color::Red
    };
    println_colored(color, &format!("Session {index}: proof {outcome}"));
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

    let mut config = VerifierConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        VerifierConfig::default()
    });
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    if config.metrics.enabled {
        let installed = config.metrics_addr().await.and_then(|metrics_addr| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
                .map_err(|e| schnorr_zkp::Error::Config(e.to_string()))
                .map(|()| metrics_addr)
        });
        match installed {
            Ok(metrics_addr) => info!("Metrics server started on {metrics_addr}"),
            Err(e) => error!("Failed to start metrics server: {e}"),
        }
    }

    let listener = match server::bind(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Couldn't host the verifier at {}:{}: {e}", config.host, config.port);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = async {
        if signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C signal, shutting down");
        }
    };

    match server::serve(&listener, &config, shutdown, report).await {
        Ok(served) => {
            info!(served, "verifier stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Couldn't host the verifier at {}:{}: {e}", config.host, config.port);
            ExitCode::FAILURE
        }
    }
}
