//! Tests for the `frame.rs` module: request building and response validation.

use heatmiser_rs::protocol::checksum::append_checksum;
use heatmiser_rs::protocol::frame::{
    build_read_request, build_read_request_range, build_response, build_write_request,
    pack_request, parse_response, verify_checksum, HeatmiserRequest,
};
use heatmiser_rs::HeatmiserError;

fn with_checksum(body: &[u8]) -> Vec<u8> {
    let mut frame = body.to_vec();
    append_checksum(&mut frame);
    frame
}

/// Tests that a read request is always 11 bytes with the PIN little-endian at 3..5.
#[test]
fn test_read_request_shape() {
    let frame = build_read_request(0x1234);
    assert_eq!(frame.len(), 11);
    assert_eq!(frame[0], 0x93);
    assert_eq!(&frame[1..3], &[0x0B, 0x00]);
    assert_eq!(&frame[3..5], &[0x34, 0x12]);
    assert_eq!(&frame[5..9], &[0x00, 0x00, 0xFF, 0xFF]);
}

/// Tests that an explicit read range is encoded little-endian.
#[test]
fn test_read_request_range() {
    let frame = build_read_request_range(0, 0x0102, 0x0030);
    assert_eq!(&frame[5..9], &[0x02, 0x01, 0x30, 0x00]);
    assert!(verify_checksum(&frame).is_ok());
}

/// Tests that a write frame's length counts header, data and checksum.
#[test]
fn test_write_request_length() {
    let data = [0u8; 12];
    let frame = build_write_request(0, 47, &data).unwrap();
    assert_eq!(frame.len(), 23);
    assert_eq!(&frame[1..3], &[23, 0]);
    assert_eq!(frame[5], 0x01);
    assert_eq!(&frame[6..8], &[47, 0]);
    assert_eq!(frame[8], 12);
}

/// Tests that a write address above 255 uses both address bytes.
#[test]
fn test_write_request_high_address() {
    let frame = build_write_request(0, 283, &[0u8; 16]).unwrap();
    assert_eq!(&frame[6..8], &[0x1B, 0x01]);
}

/// Tests that the largest single-byte data length is accepted and one more is not.
#[test]
fn test_write_payload_limit() {
    let frame = build_write_request(0, 0, &[0u8; 255]).unwrap();
    assert_eq!(frame.len(), 266);
    assert_eq!(
        build_write_request(0, 0, &[0u8; 256]),
        Err(HeatmiserError::PayloadTooLarge { length: 256 })
    );
}

/// Tests that packing a request value matches the direct builder.
#[test]
fn test_pack_request_read() {
    let request = HeatmiserRequest::Read {
        pin: 7,
        dcb_start: 0,
        dcb_length: 0xFFFF,
    };
    assert_eq!(pack_request(&request).unwrap(), build_read_request(7));
}

/// Tests that the checksum is checked before anything else.
#[test]
fn test_checksum_checked_first() {
    let mut frame = build_read_request(0);
    frame[0] = 0x00;
    assert!(matches!(
        parse_response(&frame),
        Err(HeatmiserError::ChecksumMismatch { .. })
    ));
}

/// Tests that a request echoed back is rejected by its frame type.
#[test]
fn test_unexpected_frame_type() {
    let frame = build_read_request(0);
    assert_eq!(
        parse_response(&frame),
        Err(HeatmiserError::UnexpectedFrameType(0x93))
    );
}

/// Tests that a declared frame length disagreeing with the byte count is rejected.
#[test]
fn test_frame_length_mismatch() {
    let frame = with_checksum(&[0x94, 0x0C, 0x00, 0x00, 0x00, 0x02, 0x00, 0x07, 0x08]);
    assert_eq!(
        parse_response(&frame),
        Err(HeatmiserError::FrameLengthMismatch {
            declared: 12,
            actual: 11
        })
    );
}

/// Tests that a DCB length disagreeing with the frame length is rejected.
#[test]
fn test_dcb_length_mismatch() {
    let frame = with_checksum(&[0x94, 0x0B, 0x00, 0x00, 0x00, 0x03, 0x00, 0x07, 0x08]);
    assert_eq!(
        parse_response(&frame),
        Err(HeatmiserError::DcbLengthMismatch {
            declared: 3,
            expected: 2
        })
    );
}

/// Tests that a zero DCB length is reported as a wrong PIN before any length check.
#[test]
fn test_wrong_pin() {
    let frame = build_response(0, &[]);
    assert_eq!(frame.len(), 9);
    assert_eq!(parse_response(&frame), Err(HeatmiserError::WrongPin));
}

/// Tests that frames too short to hold a header are reported as truncated.
#[test]
fn test_truncated_frames() {
    assert_eq!(
        parse_response(&[0x94]),
        Err(HeatmiserError::TruncatedFrame { length: 1 })
    );
    let frame = with_checksum(&[0x94]);
    assert_eq!(
        parse_response(&frame),
        Err(HeatmiserError::TruncatedFrame { length: 3 })
    );
    // Frame length agrees, but there is no room for the DCB start and length.
    let frame = with_checksum(&[0x94, 0x06, 0x00, 0x00]);
    assert_eq!(
        parse_response(&frame),
        Err(HeatmiserError::TruncatedFrame { length: 6 })
    );
}

/// Tests that a non-zero DCB start is passed through.
#[test]
fn test_dcb_start_passthrough() {
    let frame = build_response(0x0010, &[1, 2, 3]);
    let response = parse_response(&frame).unwrap();
    assert_eq!(response.dcb_start, 0x0010);
    assert_eq!(response.payload, vec![1, 2, 3]);
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-empty payload survives a response round trip.
        #[test]
        fn prop_response_roundtrip(payload in proptest::collection::vec(any::<u8>(), 1..320)) {
            let frame = build_response(0, &payload);
            let response = parse_response(&frame).unwrap();
            prop_assert_eq!(response.payload, payload);
        }

        /// Corrupting any single byte of a valid response is detected.
        #[test]
        fn prop_corruption_detected(
            payload in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<prop::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let mut frame = build_response(0, &payload);
            let i = index.index(frame.len());
            frame[i] ^= mask;
            prop_assert!(parse_response(&frame).is_err());
        }

        /// A zero DCB length always means a wrong PIN, wherever the DCB starts.
        #[test]
        fn prop_zero_length_is_wrong_pin(dcb_start in any::<u16>()) {
            let frame = build_response(dcb_start, &[]);
            prop_assert_eq!(parse_response(&frame), Err(HeatmiserError::WrongPin));
        }

        /// Every write request carries a valid checksum and its own length.
        #[test]
        fn prop_write_request_consistent(
            pin in any::<u16>(),
            address in any::<u16>(),
            data in proptest::collection::vec(any::<u8>(), 0..=255),
        ) {
            let frame = build_write_request(pin, address, &data).unwrap();
            prop_assert!(verify_checksum(&frame).is_ok());
            prop_assert_eq!(u16::from_le_bytes([frame[1], frame[2]]) as usize, frame.len());
        }
    }
}
