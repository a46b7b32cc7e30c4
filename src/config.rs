//! Configuration for the server (verifier) and client (prover) binaries.

use std::net::SocketAddr;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::primitives::DEFAULT_MIN_THRESHOLD;
use crate::{Error, Result, RoundBudget};

/// Default TOML file consulted when `ZKP_CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/zkp.toml";

/// Verifier (server) configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Hostname or IP address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Confidence the proof must reach; ignored when `fixed_rounds` is set.
    pub min_threshold: f64,
    /// Fixed round count overriding `min_threshold`.
    pub fixed_rounds: Option<u32>,
    /// Per-operation channel timeout in seconds; 0 disables it.
    pub io_timeout_secs: u64,
    /// Sessions to serve before exiting; 0 serves until interrupted.
    pub max_sessions: u64,
    /// Base seed for deterministic session randomness.
    pub seed: Option<u64>,
    /// Metrics exporter configuration.
    pub metrics: MetricsSettings,
}

/// Metrics exporter settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Whether the Prometheus exporter is installed.
    pub enabled: bool,
    /// Hostname or IP address for the metrics listener.
    pub host: String,
    /// Port number for the metrics listener.
    pub port: u16,
}

/// Prover (client) configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Verifier hostname or IP address.
    pub host: String,
    /// Verifier port.
    pub port: u16,
    /// Per-operation channel timeout in seconds; 0 disables it.
    pub io_timeout_secs: u64,
    /// Seed for deterministic session randomness.
    pub seed: Option<u64>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            fixed_rounds: None,
            io_timeout_secs: 0,
            max_sessions: 1,
            seed: None,
            metrics: MetricsSettings {
                enabled: false,
                host: "127.0.0.1".to_string(),
                port: 9090,
            },
        }
    }
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            io_timeout_secs: 0,
            seed: None,
        }
    }
}

fn io_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn check_host(host: &str) -> Result<()> {
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(Error::Config(format!("invalid host {host:?}")));
    }
    Ok(())
}

/// Resolves a host name or IP literal to its first socket address.
///
/// # Errors
/// Returns [`Error::Config`] if the host does not resolve.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::Config(format!("cannot resolve {host}:{port}: {e}")))?
        .next()
        .ok_or_else(|| Error::Config(format!("{host}:{port} resolved to no address")))
}

/// Layers defaults, the TOML file and prefixed environment variables.
///
/// The `.env` file is loaded first if present. Nested keys use a double
/// underscore, e.g. `ZKP_SERVER_METRICS__ENABLED=true`.
fn load<T>(defaults: T, env_prefix: &str) -> Result<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let _ = dotenvy::dotenv();

    let config_path =
        std::env::var("ZKP_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    Figment::from(Serialized::defaults(defaults))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()
        .map_err(|e| Error::Config(e.to_string()))
}

impl VerifierConfig {
    /// Loads configuration from `.env`, the TOML file and `ZKP_SERVER_*` variables.
    ///
    /// Priority (highest first): environment, TOML file
    /// (`ZKP_CONFIG_PATH`, default `config/zkp.toml`; skipped if missing),
    /// built-in defaults.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a source is malformed.
    pub fn from_env() -> Result<Self> {
        load(Self::default(), "ZKP_SERVER_")
    }

    /// Resolves the listening address.
    pub async fn addr(&self) -> Result<SocketAddr> {
        resolve(&self.host, self.port).await
    }

    /// Resolves the metrics listener address.
    pub async fn metrics_addr(&self) -> Result<SocketAddr> {
        resolve(&self.metrics.host, self.metrics.port).await
    }

    /// Channel timeout, if any.
    pub fn io_timeout(&self) -> Option<Duration> {
        io_timeout(self.io_timeout_secs)
    }

    /// Round budget implied by `fixed_rounds` and `min_threshold`.
    pub fn round_budget(&self) -> RoundBudget {
        match self.fixed_rounds {
            Some(rounds) => RoundBudget::Fixed(rounds),
            None => RoundBudget::Threshold(self.min_threshold),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.round_budget()
            .rounds()
            .map_err(|e| Error::Config(e.to_string()))?;
        check_host(&self.host)?;
        if self.metrics.enabled {
            check_host(&self.metrics.host)?;
        }
        Ok(())
    }
}

impl ProverConfig {
    /// Loads configuration from `.env`, the TOML file and `ZKP_CLIENT_*` variables.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a source is malformed.
    pub fn from_env() -> Result<Self> {
        load(Self::default(), "ZKP_CLIENT_")
    }

    /// Resolves the verifier address.
    pub async fn addr(&self) -> Result<SocketAddr> {
        resolve(&self.host, self.port).await
    }

    /// Channel timeout, if any.
    pub fn io_timeout(&self) -> Option<Duration> {
        io_timeout(self.io_timeout_secs)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        check_host(&self.host)
    }
}
