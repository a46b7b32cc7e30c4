//! Byte channel abstraction and the fixed-width wire codec.
//!
//! All fields are big-endian. Booleans occupy one byte: `0` is false and any
//! other value is true; this side always writes `0` or `1`.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::gadgets::non_negative;
use crate::{Error, Result};

/// Bidirectional reliable byte channel between prover and verifier.
///
/// Implementors only move raw bytes; the typed field codec is provided on
/// top of [`read_fixed`](Self::read_fixed) and [`write_fixed`](Self::write_fixed).
#[allow(async_fn_in_trait)]
pub trait ByteChannel {
    /// Reads exactly `buf.len()` bytes, waiting until they arrive.
    async fn read_fixed(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Writes all of `bytes`.
    async fn write_fixed(&mut self, bytes: &[u8]) -> Result<()>;

    /// Pushes buffered output to the peer.
    async fn flush(&mut self) -> Result<()>;

    /// Reads a signed 64-bit field.
    async fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_fixed(&mut buf).await?;
        Ok(i64::from_be_bytes(buf))
    }

    /// Writes a signed 64-bit field.
    async fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_fixed(&value.to_be_bytes()).await
    }

    /// Reads a signed 32-bit field.
    async fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_fixed(&mut buf).await?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Writes a signed 32-bit field.
    async fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_fixed(&value.to_be_bytes()).await
    }

    /// Reads a one-byte boolean.
    async fn read_bool(&mut self) -> Result<bool> {
        let mut buf = [0u8; 1];
        self.read_fixed(&mut buf).await?;
        Ok(buf[0] != 0)
    }

    /// Writes a one-byte boolean.
    async fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_fixed(&[u8::from(value)]).await
    }

    /// Reads a 64-bit field that must be non-negative.
    async fn read_u64_field(&mut self, field: &str) -> Result<u64> {
        let value = self.read_i64().await?;
        non_negative(value, field)
    }

    /// Writes an unsigned value into a signed 64-bit field.
    async fn write_u64_field(&mut self, value: u64, field: &str) -> Result<()> {
        let value = i64::try_from(value).map_err(|_| {
            Error::MalformedInput(format!("{field} {value} exceeds the signed 64-bit range"))
        })?;
        self.write_i64(value).await
    }
}

/// [`ByteChannel`] over any tokio stream, such as a `TcpStream` or an
/// in-memory `DuplexStream`.
///
/// An optional timeout bounds every individual read and write.
#[derive(Debug)]
pub struct StreamChannel<S> {
    stream: S,
    io_timeout: Option<Duration>,
}

impl<S> StreamChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream without a timeout.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            io_timeout: None,
        }
    }

    /// Wraps a stream, bounding each channel operation by `io_timeout`.
    pub fn with_timeout(stream: S, io_timeout: Option<Duration>) -> Self {
        Self { stream, io_timeout }
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    async fn bounded<T, F>(io_timeout: Option<Duration>, op: F) -> Result<T>
    where
        F: std::future::Future<Output = std::io::Result<T>>,
    {
        match io_timeout {
            Some(limit) => tokio::time::timeout(limit, op)
                .await
                .map_err(|_| Error::ChannelTimeout(limit))?
                .map_err(Error::from),
            None => op.await.map_err(Error::from),
        }
    }
}

impl<S> ByteChannel for StreamChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn read_fixed(&mut self, buf: &mut [u8]) -> Result<()> {
        Self::bounded(self.io_timeout, self.stream.read_exact(buf)).await?;
        Ok(())
    }

    async fn write_fixed(&mut self, bytes: &[u8]) -> Result<()> {
        Self::bounded(self.io_timeout, self.stream.write_all(bytes)).await
    }

    async fn flush(&mut self) -> Result<()> {
        Self::bounded(self.io_timeout, self.stream.flush()).await
    }
}
