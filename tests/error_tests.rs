//! Tests for `HeatmiserError` messages and conversions.

use heatmiser_rs::HeatmiserError;
use std::io;
use std::time::Duration;

/// Tests the messages of the framing errors.
#[test]
fn test_framing_error_messages() {
    let err = HeatmiserError::ChecksumMismatch {
        expected: (0xDA, 0x12),
        received: (0x00, 0x00),
    };
    assert_eq!(err.to_string(), "Checksum mismatch: expected 12DA, received 0000");
    assert_eq!(
        HeatmiserError::UnexpectedFrameType(0x93).to_string(),
        "Unexpected frame type: 0x93"
    );
    assert_eq!(
        HeatmiserError::FrameLengthMismatch {
            declared: 12,
            actual: 11
        }
        .to_string(),
        "Invalid frame length: declared 12, received 11"
    );
    assert_eq!(
        HeatmiserError::WrongPin.to_string(),
        "Thermostat connected but reports wrong PIN code"
    );
}

/// Tests the messages of the field errors.
#[test]
fn test_field_error_messages() {
    let err = HeatmiserError::UnknownField {
        field: "away_mode".to_string(),
        model: "TM1".to_string(),
        reason: "not present on this model".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "'away_mode' not supported to be set on TM1: not present on this model"
    );
    let err = HeatmiserError::InvalidFieldValue {
        field: "on_off".to_string(),
        value: "Sideways".to_string(),
        reason: "Valid values: 'Off' or 'On'".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "'on_off' invalid value 'Sideways': Valid values: 'Off' or 'On'"
    );
}

/// Tests that a closed socket maps to `TransportClosed`.
#[test]
fn test_io_closed_kinds() {
    for kind in [
        io::ErrorKind::UnexpectedEof,
        io::ErrorKind::ConnectionReset,
        io::ErrorKind::ConnectionAborted,
        io::ErrorKind::BrokenPipe,
    ] {
        let err: HeatmiserError = io::Error::new(kind, "gone").into();
        assert_eq!(err, HeatmiserError::TransportClosed, "{kind:?}");
    }
}

/// Tests that other I/O failures keep their description.
#[test]
fn test_io_other_kinds() {
    let err: HeatmiserError = io::Error::new(io::ErrorKind::ConnectionRefused, "refused").into();
    assert_eq!(err, HeatmiserError::Connection("refused".to_string()));
}

/// Tests that errors can be cloned and compared.
#[test]
fn test_clone_and_compare() {
    let err = HeatmiserError::Timeout(Duration::from_secs(5));
    assert_eq!(err.clone(), err);
    assert_ne!(err, HeatmiserError::Timeout(Duration::from_secs(1)));
    assert_eq!(err.to_string(), "Timed out after 5s");
}
