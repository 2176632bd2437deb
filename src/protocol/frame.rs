//! # Heatmiser V3 Frame Codec
//!
//! This module builds read and write request frames and validates response frames.
//! It knows nothing about what the DCB bytes mean; see [`crate::dcb`] for that.
//!
//! ## Wire layout
//!
//! All integers are little-endian and every frame ends with a 2-byte checksum
//! (see [`super::checksum`]).
//!
//! | Byte(s) | Read request        | Write request         | Response        |
//! |---------|---------------------|-----------------------|-----------------|
//! | 0       | `0x93`              | `0xA3`                | `0x94`          |
//! | 1-2     | frame length (11)   | frame length          | frame length    |
//! | 3-4     | PIN                 | PIN                   | DCB start       |
//! | 5-6     | DCB start           | item count (1)        | DCB length      |
//! | 7-8     | DCB length          | address               | payload...      |
//! | 9..     | checksum            | data length, data, checksum | checksum  |
//!
//! ## Usage
//!
//! ```rust
//! use heatmiser_rs::protocol::frame::{build_read_request, build_response, parse_response};
//!
//! let request = build_read_request(1234);
//! assert_eq!(request.len(), 11);
//!
//! let mut response = build_response(0, &[0x07, 0x08]);
//! assert_eq!(parse_response(&response).unwrap().payload, vec![0x07, 0x08]);
//!
//! // Any corrupted byte is caught by the checksum
//! response[7] ^= 0x01;
//! assert!(parse_response(&response).is_err());
//! ```

use crate::constants::{
    HEATMISER_CHECKSUM_LENGTH, HEATMISER_DCB_LENGTH_ALL, HEATMISER_OP_READ,
    HEATMISER_OP_RESPONSE, HEATMISER_OP_WRITE, HEATMISER_READ_FRAME_LENGTH,
    HEATMISER_RESPONSE_HEADER_LENGTH, HEATMISER_RESPONSE_OVERHEAD, HEATMISER_WRITE_FRAME_OVERHEAD,
    HEATMISER_WRITE_ITEM_COUNT,
};
use crate::error::{HeatmiserError, Result};
use crate::protocol::checksum::checksum;
use bytes::{BufMut, BytesMut};
use nom::number::complete::le_u16;
use nom::IResult;

/// A request frame before packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeatmiserRequest {
    /// Read `dcb_length` bytes from `dcb_start`; a length of `0xFFFF` means the whole DCB.
    Read {
        pin: u16,
        dcb_start: u16,
        dcb_length: u16,
    },
    /// Write `data` starting at the logical DCB `address`.
    Write {
        pin: u16,
        address: u16,
        data: Vec<u8>,
    },
}

/// A validated response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcbResponse {
    pub dcb_start: u16,
    pub payload: Vec<u8>,
}

#[derive(Debug)]
struct ResponseHeader {
    dcb_start: u16,
    dcb_length: u16,
}

fn read_header(pin: u16, dcb_start: u16, dcb_length: u16) -> BytesMut {
    let mut buf = BytesMut::with_capacity(HEATMISER_READ_FRAME_LENGTH as usize);
    buf.put_u8(HEATMISER_OP_READ);
    buf.put_u16_le(HEATMISER_READ_FRAME_LENGTH);
    buf.put_u16_le(pin);
    buf.put_u16_le(dcb_start);
    buf.put_u16_le(dcb_length);
    buf
}

/// Packs a request into wire bytes, checksum included.
pub fn pack_request(request: &HeatmiserRequest) -> Result<Vec<u8>> {
    let mut buf = match request {
        HeatmiserRequest::Read {
            pin,
            dcb_start,
            dcb_length,
        } => read_header(*pin, *dcb_start, *dcb_length),
        HeatmiserRequest::Write { pin, address, data } => {
            let data_length = u8::try_from(data.len())
                .map_err(|_| HeatmiserError::PayloadTooLarge { length: data.len() })?;
            let frame_length = HEATMISER_WRITE_FRAME_OVERHEAD + data.len();
            let mut buf = BytesMut::with_capacity(frame_length);
            buf.put_u8(HEATMISER_OP_WRITE);
            buf.put_u16_le(frame_length as u16);
            buf.put_u16_le(*pin);
            buf.put_u8(HEATMISER_WRITE_ITEM_COUNT);
            buf.put_u16_le(*address);
            buf.put_u8(data_length);
            buf.put_slice(data);
            buf
        }
    };
    let crc = checksum(&buf);
    buf.put_slice(&crc.to_bytes());
    Ok(buf.to_vec())
}

/// Builds a request for the entire DCB.
pub fn build_read_request(pin: u16) -> Vec<u8> {
    build_read_request_range(pin, 0, HEATMISER_DCB_LENGTH_ALL)
}

/// Builds a read request for an explicit DCB range. Thermostats seen so far
/// ignore `dcb_start` and always return the whole DCB.
pub fn build_read_request_range(pin: u16, dcb_start: u16, dcb_length: u16) -> Vec<u8> {
    let mut buf = read_header(pin, dcb_start, dcb_length);
    let crc = checksum(&buf);
    buf.put_slice(&crc.to_bytes());
    buf.to_vec()
}

/// Builds a single-item write request.
pub fn build_write_request(pin: u16, address: u16, data: &[u8]) -> Result<Vec<u8>> {
    pack_request(&HeatmiserRequest::Write {
        pin,
        address,
        data: data.to_vec(),
    })
}

/// Checks the trailing checksum and returns the frame without it.
pub fn verify_checksum(frame: &[u8]) -> Result<&[u8]> {
    if frame.len() < HEATMISER_CHECKSUM_LENGTH {
        return Err(HeatmiserError::TruncatedFrame {
            length: frame.len(),
        });
    }
    let (body, trailer) = frame.split_at(frame.len() - HEATMISER_CHECKSUM_LENGTH);
    let expected = checksum(body);
    let received = (trailer[0], trailer[1]);
    if expected.as_pair() != received {
        return Err(HeatmiserError::ChecksumMismatch {
            expected: expected.as_pair(),
            received,
        });
    }
    Ok(body)
}

/// Parses the frame length that follows the marker byte.
fn parse_frame_length(input: &[u8]) -> IResult<&[u8], u16> {
    le_u16(input)
}

fn parse_dcb_header(input: &[u8]) -> IResult<&[u8], ResponseHeader> {
    let (input, dcb_start) = le_u16(input)?;
    let (input, dcb_length) = le_u16(input)?;
    Ok((
        input,
        ResponseHeader {
            dcb_start,
            dcb_length,
        },
    ))
}

/// Validates a response (or write acknowledgment) and extracts the DCB payload.
///
/// Checks run in a fixed order and stop at the first failure: checksum, frame type,
/// frame length, PIN, DCB length.
pub fn parse_response(frame: &[u8]) -> Result<DcbResponse> {
    let body = verify_checksum(frame)?;

    match body.first() {
        None => return Err(HeatmiserError::TruncatedFrame { length: frame.len() }),
        Some(&marker) if marker != HEATMISER_OP_RESPONSE => {
            return Err(HeatmiserError::UnexpectedFrameType(marker))
        }
        Some(_) => {}
    }

    let (rest, frame_length) = parse_frame_length(&body[1..])
        .map_err(|_| HeatmiserError::TruncatedFrame { length: frame.len() })?;
    if frame_length as usize != body.len() + HEATMISER_CHECKSUM_LENGTH {
        return Err(HeatmiserError::FrameLengthMismatch {
            declared: frame_length,
            actual: body.len() + HEATMISER_CHECKSUM_LENGTH,
        });
    }

    if body.len() < HEATMISER_RESPONSE_HEADER_LENGTH {
        return Err(HeatmiserError::TruncatedFrame { length: frame.len() });
    }
    let (payload, header) = parse_dcb_header(rest)
        .map_err(|_| HeatmiserError::TruncatedFrame { length: frame.len() })?;
    if header.dcb_length == 0 {
        return Err(HeatmiserError::WrongPin);
    }
    let expected = frame_length.wrapping_sub(HEATMISER_RESPONSE_OVERHEAD);
    if header.dcb_length != expected {
        return Err(HeatmiserError::DcbLengthMismatch {
            declared: header.dcb_length,
            expected,
        });
    }

    Ok(DcbResponse {
        dcb_start: header.dcb_start,
        payload: payload.to_vec(),
    })
}

/// Builds a response frame around `payload`. Used by the mock transport and tests.
pub fn build_response(dcb_start: u16, payload: &[u8]) -> Vec<u8> {
    let frame_length = (payload.len() as u16).wrapping_add(HEATMISER_RESPONSE_OVERHEAD);
    let mut buf = BytesMut::with_capacity(frame_length as usize);
    buf.put_u8(HEATMISER_OP_RESPONSE);
    buf.put_u16_le(frame_length);
    buf.put_u16_le(dcb_start);
    buf.put_u16_le(payload.len() as u16);
    buf.put_slice(payload);
    let crc = checksum(&buf);
    buf.put_slice(&crc.to_bytes());
    buf.to_vec()
}
