//! # Heatmiser TCP Transport
//!
//! Thermostats listen on TCP port 8068 by default. Every read and write is bounded
//! by the configured timeout (5 seconds unless overridden); expiry is reported as
//! [`HeatmiserError::Timeout`] rather than as a protocol error.
//!
//! A reply that arrives after its timeout, or a frame whose length cannot be
//! trusted, leaves bytes in the stream that belong to no request. The transport
//! drops the socket on any such failure, so a later request can never be paired
//! with an earlier reply.

use crate::constants::HEATMISER_MAX_FRAME_LENGTH;
use crate::error::{HeatmiserError, Result};
use crate::protocol::transport::Transport;
use crate::util::hex::format_hex_compact;
use log::{debug, warn};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Bytes needed before the total frame length is known (marker + length)
const FRAME_PREFIX_LENGTH: usize = 3;

/// TCP connection to a single thermostat.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    peer: String,
    timeout: Duration,
}

impl TcpTransport {
    /// Opens a connection to `host:port`, failing with `Timeout` if the thermostat
    /// does not accept within `io_timeout`.
    pub async fn connect(host: &str, port: u16, io_timeout: Duration) -> Result<Self> {
        let peer = format!("{host}:{port}");
        let stream = timeout(io_timeout, TcpStream::connect(&peer))
            .await
            .map_err(|_| HeatmiserError::Timeout(io_timeout))?
            .map_err(|e| HeatmiserError::Connection(format!("{peer}: {e}")))?;
        debug!("connected to {peer}");
        Ok(TcpTransport {
            stream: Some(stream),
            peer,
            timeout: io_timeout,
        })
    }

    /// The `host:port` this transport was opened against.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(HeatmiserError::TransportClosed)
    }

    /// Drops the socket after a failure that leaves the stream out of step.
    fn abandon(&mut self, err: HeatmiserError) -> HeatmiserError {
        if self.stream.take().is_some() {
            warn!("{}: dropping connection after error: {err}", self.peer);
        }
        err
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let to = self.timeout;
        let stream = self.stream()?;
        let result = match timeout(to, stream.read_exact(buf)).await {
            Ok(read) => read.map(|_| ()).map_err(HeatmiserError::from),
            Err(_) => Err(HeatmiserError::Timeout(to)),
        };
        result.map_err(|err| self.abandon(err))
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        let to = self.timeout;
        debug!("tx [{}]", format_hex_compact(frame));
        let stream = self.stream()?;
        let result = match timeout(to, async {
            stream.write_all(frame).await?;
            stream.flush().await
        })
        .await
        {
            Ok(written) => written.map_err(HeatmiserError::from),
            Err(_) => Err(HeatmiserError::Timeout(to)),
        };
        result.map_err(|err| self.abandon(err))
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        let mut prefix = [0u8; FRAME_PREFIX_LENGTH];
        self.read_exact(&mut prefix).await?;

        let declared = u16::from_le_bytes([prefix[1], prefix[2]]);
        let length = declared as usize;
        if !(FRAME_PREFIX_LENGTH..=HEATMISER_MAX_FRAME_LENGTH).contains(&length) {
            return Err(self.abandon(HeatmiserError::FrameLengthMismatch {
                declared,
                actual: FRAME_PREFIX_LENGTH,
            }));
        }

        let mut frame = vec![0u8; length];
        frame[..FRAME_PREFIX_LENGTH].copy_from_slice(&prefix);
        self.read_exact(&mut frame[FRAME_PREFIX_LENGTH..]).await?;

        debug!("rx [{}]", format_hex_compact(&frame));
        Ok(frame)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("closing connection to {}", self.peer);
            // The peer may already be gone; closing still succeeds locally.
            let _ = stream.shutdown().await;
        }
        Ok(())
    }
}
