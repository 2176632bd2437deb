//! Byte-stream transport abstraction
//!
//! The session drives any transport that can send one frame and receive one frame.
//! The protocol is strictly request/response, so implementations never need to
//! buffer more than a single frame.

use crate::error::Result;

/// A connection to one thermostat.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Sends one complete frame.
    async fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Receives one complete frame. A timeout surfaces as
    /// [`HeatmiserError::Timeout`](crate::error::HeatmiserError::Timeout), a closed
    /// peer as [`HeatmiserError::TransportClosed`](crate::error::HeatmiserError::TransportClosed).
    async fn receive(&mut self) -> Result<Vec<u8>>;

    /// Closes the connection. Must be safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
