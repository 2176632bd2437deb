//! # heatmiser-rs - A Rust Crate for the Heatmiser V3 Thermostat Protocol
//!
//! The heatmiser-rs crate talks to networked Heatmiser thermostats (DT, DT-E, PRT,
//! PRT-E, PRT-HW and TM1) over their binary TCP protocol. A thermostat exposes its
//! whole state as a Device Control Block (DCB); the crate reads it, decodes it into
//! named values, and writes individual fields back.
//!
//! ## Features
//!
//! - Build read and write requests and validate responses (CRC-16/CCITT checksum)
//! - Decode the DCB of every supported model into an ordered record
//! - Encode writable fields by name, validated against the thermostat's model
//! - Async sessions over TCP, or over any [`Transport`] implementation
//! - Logging through the `log` facade
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! heatmiser-rs = "1.0.0"
//! ```
//!
//! ```rust,no_run
//! use heatmiser_rs::{connect, disconnect, read_info, write_value, HeatmiserError};
//!
//! # async fn run() -> Result<(), HeatmiserError> {
//! let mut session = connect("192.168.1.50", 1234).await?;
//! let record = read_info(&mut session).await?;
//! println!("{record}");
//! write_value(&mut session, "on_off", "On").await?;
//! disconnect(&mut session).await?;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod dcb;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod util;

pub use crate::error::{HeatmiserError, Result};
pub use crate::logging::{init_logger, log_info};

pub use dcb::{decode, encode_field, DecodedRecord, DeviceModel, FieldValue, ProgramMode, Value};
pub use protocol::{
    build_read_request, build_write_request, checksum, parse_response, MockTransport,
    TcpTransport, Transport,
};
pub use session::{ConnectionConfig, DeviceSession, SessionState, TimeSource, WriteMode};

/// Connect to a thermostat on the default port.
///
/// # Arguments
/// * `host` - Hostname or IP address of the thermostat
/// * `pin` - The thermostat's PIN code (0 if none is set)
///
/// # Returns
/// * `Ok(DeviceSession)` - Connected session
/// * `Err(HeatmiserError)` - Connection failed or timed out
pub async fn connect(host: &str, pin: u16) -> Result<DeviceSession<TcpTransport>> {
    let config = ConnectionConfig::new(host).with_pin(pin);
    DeviceSession::connect(&config).await
}

/// Read and decode the thermostat's DCB.
///
/// # Returns
/// * `Ok(DecodedRecord)` - Every field the model reports, in DCB order
/// * `Err(HeatmiserError)` - Transport, framing or decoding failed
pub async fn read_info<T: Transport>(session: &mut DeviceSession<T>) -> Result<DecodedRecord> {
    session.read().await
}

/// Write one named field.
///
/// # Arguments
/// * `session` - Session to write through
/// * `name` - Writable field name, e.g. `"on_off"` or `"set_room_temp"`
/// * `value` - New value; labels for label fields, numbers for byte fields
pub async fn write_value<T: Transport>(
    session: &mut DeviceSession<T>,
    name: &str,
    value: impl Into<FieldValue>,
) -> Result<()> {
    session.write(name, value).await
}

/// Close the session. Closing twice is not an error.
pub async fn disconnect<T: Transport>(session: &mut DeviceSession<T>) -> Result<()> {
    session.disconnect().await
}
