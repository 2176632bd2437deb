//! # Hex Helpers
//!
//! Formatting for frame logs and DCB dumps, and lenient parsing for frames pasted
//! from a capture, e.g. `"93 0B 00 D2 04"` or `"930b00d204"`.
//!
//! ```rust
//! use heatmiser_rs::util::hex::{format_hex_compact, parse_hex};
//!
//! let frame = parse_hex("93 0b 00 00 00").unwrap();
//! assert_eq!(format_hex_compact(&frame), "93 0B 00 00 00");
//! ```

use thiserror::Error;

/// Errors from parsing hex text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex digits: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Uppercase bytes separated by spaces, as used in frame logs.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses hex text, ignoring whitespace and the separators `:`, `-` and `,`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ':' | '-' | ','))
        .collect();
    if digits.is_empty() {
        return Err(HexError::EmptyString);
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }
    hex::decode(&digits).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Multi-line dump with decimal offsets, matching how DCB offsets are documented.
pub fn hex_dump(data: &[u8], bytes_per_line: usize) -> String {
    let width = bytes_per_line.max(1);
    data.chunks(width)
        .enumerate()
        .map(|(i, chunk)| format!("{:4}: {}", i * width, format_hex_compact(chunk)))
        .collect::<Vec<_>>()
        .join("\n")
}
