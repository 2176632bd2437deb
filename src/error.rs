//! # Heatmiser Error Handling
//!
//! This module defines the HeatmiserError enum, which represents the different error
//! types that can occur in the heatmiser-rs crate. Every variant is terminal for the
//! operation that raised it; nothing in the crate retries internally.

use std::time::Duration;
use thiserror::Error;

/// Represents the different error types that can occur in the Heatmiser crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeatmiserError {
    /// The checksum recomputed over a received frame does not match the trailing bytes.
    /// Both pairs are in wire order (low, high).
    #[error(
        "Checksum mismatch: expected {:02X}{:02X}, received {:02X}{:02X}",
        expected.1, expected.0, received.1, received.0
    )]
    ChecksumMismatch {
        expected: (u8, u8),
        received: (u8, u8),
    },

    /// The frame does not start with the response marker.
    #[error("Unexpected frame type: 0x{0:02X}")]
    UnexpectedFrameType(u8),

    /// The declared frame length disagrees with the number of bytes received.
    #[error("Invalid frame length: declared {declared}, received {actual}")]
    FrameLengthMismatch { declared: u16, actual: usize },

    /// The declared DCB length disagrees with the frame length.
    #[error("Invalid DCB length: declared {declared}, expected {expected}")]
    DcbLengthMismatch { declared: u16, expected: u16 },

    /// The thermostat answered with an empty DCB, its signal for a rejected PIN.
    #[error("Thermostat connected but reports wrong PIN code")]
    WrongPin,

    /// Fewer bytes than a checksum and frame header.
    #[error("Truncated frame: {length} bytes")]
    TruncatedFrame { length: usize },

    /// The DCB is shorter than the section being decoded requires.
    #[error("DCB too short: need {required} bytes, got {actual}")]
    RecordTooShort { required: usize, actual: usize },

    /// No writable field of that name exists for the model.
    #[error("'{field}' not supported to be set on {model}: {reason}")]
    UnknownField {
        field: String,
        model: String,
        reason: String,
    },

    /// The value supplied for a field does not fit its kind.
    #[error("'{field}' invalid value '{value}': {reason}")]
    InvalidFieldValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Write data longer than the 1-byte data length field can describe.
    #[error("Write payload too large: {length} bytes")]
    PayloadTooLarge { length: usize },

    /// The field can only be validated against a model learned from a previous read.
    #[error("'{field}' requires a read before it can be written")]
    ReadRequiredFirst { field: String },

    /// No response within the configured timeout.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The connection is closed, either by the peer or by a previous disconnect.
    #[error("Transport closed")]
    TransportClosed,

    /// Socket connect or I/O failure.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl HeatmiserError {
    pub(crate) fn unknown_field(field: &str, model: impl ToString, reason: &str) -> Self {
        HeatmiserError::UnknownField {
            field: field.to_string(),
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_value(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        HeatmiserError::InvalidFieldValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for HeatmiserError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe => HeatmiserError::TransportClosed,
            _ => HeatmiserError::Connection(err.to_string()),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HeatmiserError>;
