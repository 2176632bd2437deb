//! # Utility Modules
//!
//! Helpers shared by the protocol layer and the command-line tool.

pub mod hex;

pub use hex::{format_hex_compact, hex_dump, parse_hex, HexError};
