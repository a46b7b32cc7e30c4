//! Error types for the Schnorr identification protocol.

use std::time::Duration;

/// Main error types for the library.
///
/// A rejected proof is not an error: it is reported through
/// [`SessionOutcome`](crate::SessionOutcome).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying byte channel failed (connect, bind, accept, read or write).
    #[error("Channel failure: {0}")]
    Channel(#[from] std::io::Error),

    /// A channel operation did not complete within the configured timeout.
    #[error("Channel operation timed out after {0:?}")]
    ChannelTimeout(Duration),

    /// An argument or received value is out of range.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
