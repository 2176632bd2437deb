//! Mock transport implementation for testing
//!
//! This module provides a scripted in-memory transport that can be used to test
//! the device session without a thermostat on the network. Clones share their
//! buffers, so a test can keep one handle while the session owns another.

use crate::error::{HeatmiserError, Result};
use crate::protocol::frame::build_response;
use crate::protocol::transport::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One scripted reaction to a `receive` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return these bytes as the received frame.
    Frame(Vec<u8>),
    /// Fail with a timeout.
    Timeout,
    /// Fail as if the peer closed the socket.
    Closed,
}

#[derive(Debug, Default)]
struct MockState {
    sent: Vec<Vec<u8>>,
    replies: VecDeque<MockReply>,
    closed: bool,
    close_calls: usize,
}

/// Mock transport that records sent frames and replays queued replies.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread cannot leave the state half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue raw bytes to be returned by the next `receive`.
    pub fn queue_frame(&self, frame: &[u8]) {
        self.lock().replies.push_back(MockReply::Frame(frame.to_vec()));
    }

    /// Queue a well-formed response carrying `dcb`.
    pub fn queue_dcb(&self, dcb: &[u8]) {
        self.queue_frame(&build_response(0, dcb));
    }

    /// Queue an arbitrary reply.
    pub fn queue_reply(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    /// Frames written so far, oldest first.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    /// Number of replies not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.lock().replies.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(HeatmiserError::TransportClosed);
        }
        state.sent.push(frame.to_vec());
        Ok(())
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        let mut state = self.lock();
        if state.closed {
            return Err(HeatmiserError::TransportClosed);
        }
        match state.replies.pop_front() {
            Some(MockReply::Frame(frame)) => Ok(frame),
            Some(MockReply::Timeout) | None => Err(HeatmiserError::Timeout(Duration::from_secs(5))),
            Some(MockReply::Closed) => Err(HeatmiserError::TransportClosed),
        }
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.closed = true;
        state.close_calls += 1;
        Ok(())
    }
}
