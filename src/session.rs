//! # Heatmiser Device Session
//!
//! A [`DeviceSession`] owns one connection to one thermostat and remembers the model
//! and program mode from its most recent successful read. Those two values decide
//! which fields may be written, so a session moves through three states:
//!
//! ```text
//! Disconnected <-- disconnect() -- Connected -- read() --> RecordKnown
//!                                                          (model, mode)
//! ```
//!
//! Operations run one at a time: each takes `&mut self` and awaits the thermostat's
//! reply before returning. Nothing is retried; every failure is reported to the
//! caller, who decides whether to reconnect. A transport failure (timeout, closed
//! peer, unreadable frame length) also closes the connection, since the stream can
//! no longer be trusted to pair replies with requests. Protocol errors in a
//! complete frame, such as a bad checksum or a wrong PIN, leave it open.

use crate::constants::{HEATMISER_DEFAULT_PIN, HEATMISER_DEFAULT_PORT, HEATMISER_DEFAULT_TIMEOUT_SECS};
use crate::dcb::{self, DecodedRecord, DeviceModel, EncodedField, FieldValue, ProgramMode};
use crate::error::{HeatmiserError, Result};
use crate::protocol::frame::{build_read_request, build_write_request, parse_response};
use crate::protocol::tcp::TcpTransport;
use crate::protocol::transport::Transport;
use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use std::time::Duration;

/// Whether a write waits for the thermostat's acknowledgement frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Wait for the reply and validate it like a read response.
    #[default]
    Acknowledged,
    /// Send and return immediately. Errors reported by the thermostat are lost.
    FireAndForget,
}

/// Connection settings for a TCP session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub pin: u16,
    /// Applies to connect and to every send and receive.
    pub timeout: Duration,
    pub write_mode: WriteMode,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        ConnectionConfig {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_pin(mut self, pin: u16) -> Self {
        self.pin = pin;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: String::from("localhost"),
            port: HEATMISER_DEFAULT_PORT,
            pin: HEATMISER_DEFAULT_PIN,
            timeout: Duration::from_secs(HEATMISER_DEFAULT_TIMEOUT_SECS),
            write_mode: WriteMode::Acknowledged,
        }
    }
}

/// Source of the current local time for clock writes.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl TimeSource for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A fixed instant, for reproducible clock writes.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl TimeSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    RecordKnown {
        model: DeviceModel,
        mode: ProgramMode,
    },
}

/// A connection to one thermostat.
pub struct DeviceSession<T: Transport> {
    transport: Option<T>,
    pin: u16,
    write_mode: WriteMode,
    state: SessionState,
    clock: Box<dyn TimeSource>,
    warned_unacknowledged: bool,
}

impl DeviceSession<TcpTransport> {
    /// Opens a TCP connection described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let transport = TcpTransport::connect(&config.host, config.port, config.timeout).await?;
        info!("Connected to thermostat at {}", transport.peer());
        Ok(DeviceSession::new(transport, config.pin).with_write_mode(config.write_mode))
    }
}

impl<T: Transport> DeviceSession<T> {
    /// Wraps an already connected transport.
    pub fn new(transport: T, pin: u16) -> Self {
        DeviceSession {
            transport: Some(transport),
            pin,
            write_mode: WriteMode::default(),
            state: SessionState::Connected,
            clock: Box::new(LocalClock),
            warned_unacknowledged: false,
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn with_time_source(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pin(&self) -> u16 {
        self.pin
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Model learned from the last successful read.
    pub fn model(&self) -> Option<DeviceModel> {
        match self.state {
            SessionState::RecordKnown { model, .. } => Some(model),
            _ => None,
        }
    }

    /// Program mode learned from the last successful read.
    pub fn program_mode(&self) -> Option<ProgramMode> {
        match self.state {
            SessionState::RecordKnown { mode, .. } => Some(mode),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state != SessionState::Disconnected
    }

    fn transport(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(HeatmiserError::TransportClosed)
    }

    /// Any transport failure leaves the stream out of step with the thermostat: a
    /// late reply would otherwise be taken as the answer to the next request.
    async fn abandon(&mut self, err: &HeatmiserError) {
        if let Some(mut transport) = self.transport.take() {
            warn!("Dropping connection after transport error: {err}");
            if let Err(close_err) = transport.close().await {
                debug!("Error while closing connection: {close_err}");
            }
        }
        if self.state != SessionState::Disconnected {
            debug!("Session state {:?} -> {:?}", self.state, SessionState::Disconnected);
            self.state = SessionState::Disconnected;
        }
    }

    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        let result = self.transport()?.send(frame).await;
        if let Err(err) = &result {
            self.abandon(err).await;
        }
        result
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        let result = self.transport()?.receive().await;
        if let Err(err) = &result {
            self.abandon(err).await;
        }
        result
    }

    /// Reads the whole DCB and returns it undecoded.
    pub async fn read_dcb(&mut self) -> Result<Vec<u8>> {
        let request = build_read_request(self.pin);
        self.send(&request).await?;
        let reply = self.receive().await?;
        let response = parse_response(&reply)?;
        debug!(
            "Read {} DCB bytes starting at {}",
            response.payload.len(),
            response.dcb_start
        );
        Ok(response.payload)
    }

    /// Reads and decodes the DCB, remembering the model and program mode.
    ///
    /// A failed read leaves any previously learned model in place.
    pub async fn read(&mut self) -> Result<DecodedRecord> {
        let payload = self.read_dcb().await?;
        let record = dcb::decode(&payload)?;
        let state = SessionState::RecordKnown {
            model: record.model(),
            mode: record.program_mode(),
        };
        if state != self.state {
            debug!("Session state {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        Ok(record)
    }

    /// Writes `value` to the field `name` using the session's write mode.
    pub async fn write(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let mode = self.write_mode;
        self.write_with_mode(name, value.into(), mode).await
    }

    /// Writes `value` to the field `name`, overriding the session's write mode.
    ///
    /// The value is validated and encoded before anything is sent.
    pub async fn write_with_mode(
        &mut self,
        name: &str,
        value: FieldValue,
        write_mode: WriteMode,
    ) -> Result<()> {
        let encoded = self.encode(name, &value)?;
        debug!("Writing {name} = {value} at address {}", encoded.address);
        self.write_dcb_with_mode(encoded.address, &encoded.data, write_mode)
            .await
    }

    /// Validates `value` for `name` against what the session knows about the model.
    pub fn encode(&self, name: &str, value: &FieldValue) -> Result<EncodedField> {
        let spec = match self.state {
            SessionState::Disconnected => return Err(HeatmiserError::TransportClosed),
            SessionState::Connected => dcb::lookup_any_model(name)?,
            SessionState::RecordKnown { model, mode } => {
                let spec = dcb::lookup(model, name)?;
                if spec.seven_day_only && mode == ProgramMode::TwoFive {
                    return Err(HeatmiserError::unknown_field(
                        name,
                        model,
                        "requires 7 day mode",
                    ));
                }
                spec
            }
        };
        dcb::encode_spec(spec, value, self.clock.now())
    }

    /// Writes raw bytes at a DCB write address using the session's write mode.
    pub async fn write_dcb(&mut self, address: u16, data: &[u8]) -> Result<()> {
        let mode = self.write_mode;
        self.write_dcb_with_mode(address, data, mode).await
    }

    async fn write_dcb_with_mode(
        &mut self,
        address: u16,
        data: &[u8],
        write_mode: WriteMode,
    ) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Err(HeatmiserError::TransportClosed);
        }
        let request = build_write_request(self.pin, address, data)?;
        self.send(&request).await?;

        match write_mode {
            WriteMode::Acknowledged => {
                let reply = self.receive().await?;
                parse_response(&reply)?;
                debug!("Write to address {address} acknowledged");
            }
            WriteMode::FireAndForget => {
                if !self.warned_unacknowledged {
                    warn!("Writes are not acknowledged; thermostat errors will not be reported");
                    self.warned_unacknowledged = true;
                }
            }
        }
        Ok(())
    }

    /// Sets the thermostat clock to the session's current time.
    pub async fn set_clock(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.write("clock", FieldValue::DateTime(now)).await
    }

    /// Closes the connection. Calling it again has no effect.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.state = SessionState::Disconnected;
        if let Some(mut transport) = self.transport.take() {
            if let Err(err) = transport.close().await {
                warn!("Error while closing connection: {err}");
            }
            info!("Disconnected from thermostat");
        }
        Ok(())
    }
}
