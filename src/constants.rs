//! Heatmiser V3 Protocol Constants
//!
//! Frame markers, defaults and DCB length thresholds used by the codec and the
//! DCB decoder.

/// Read request operation code
pub const HEATMISER_OP_READ: u8 = 0x93;

/// Write request operation code
pub const HEATMISER_OP_WRITE: u8 = 0xA3;

/// Response (read and write acknowledgment) marker
pub const HEATMISER_OP_RESPONSE: u8 = 0x94;

/// Length of a read request frame, checksum included
pub const HEATMISER_READ_FRAME_LENGTH: u16 = 11;

/// Fixed part of a write request frame, checksum included
pub const HEATMISER_WRITE_FRAME_OVERHEAD: usize = 11;

/// Response header (marker, frame length, DCB start, DCB length)
pub const HEATMISER_RESPONSE_HEADER_LENGTH: usize = 7;

/// Response bytes that are not DCB payload (header plus checksum)
pub const HEATMISER_RESPONSE_OVERHEAD: u16 = 9;

/// Checksum trailer length
pub const HEATMISER_CHECKSUM_LENGTH: usize = 2;

/// DCB length sentinel requesting the entire DCB
pub const HEATMISER_DCB_LENGTH_ALL: u16 = 0xFFFF;

/// Write frames carry exactly one item
pub const HEATMISER_WRITE_ITEM_COUNT: u8 = 1;

// ----------------------------------------------------------------------------
// Connection defaults
// ----------------------------------------------------------------------------

pub const HEATMISER_DEFAULT_PORT: u16 = 8068;
pub const HEATMISER_DEFAULT_PIN: u16 = 0;
pub const HEATMISER_DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Upper bound on a single response; the largest DCB is about 300 bytes
pub const HEATMISER_MAX_FRAME_LENGTH: usize = 1024;

// ----------------------------------------------------------------------------
// DCB thresholds
// ----------------------------------------------------------------------------

/// Bytes every DCB must carry before any field is decoded
pub const DCB_MIN_LENGTH: usize = 41;

/// Minimum length before clock and schedule fields of the generic layout
pub const DCB_MIN_CLOCK_LENGTH: usize = 72;

/// Minimum length before the seven-day schedule of the generic layout
pub const DCB_MIN_SEVEN_DAY_LENGTH: usize = 156;

/// Number of slots in every trigger group
pub const TRIGGER_SLOTS: usize = 4;

/// Bytes per heating trigger slot (hour, minute, temperature)
pub const HEAT_TRIGGER_WIDTH: usize = 3;

/// Bytes per hot water trigger slot (hour on, minute on, hour off, minute off)
pub const HOT_WATER_TRIGGER_WIDTH: usize = 4;

/// Byte width of one heating trigger group
pub const HEAT_GROUP_WIDTH: usize = TRIGGER_SLOTS * HEAT_TRIGGER_WIDTH;

/// Byte width of one hot water trigger group
pub const HOT_WATER_GROUP_WIDTH: usize = TRIGGER_SLOTS * HOT_WATER_TRIGGER_WIDTH;

/// Day-of-week labels, Monday first
pub const DAY_OF_WEEK_LABELS: [&str; 7] = ["MON", "TUE", "WED", "THUR", "FRI", "SAT", "SUN"];

/// Field name prefixes of the seven-day schedule, Monday first
pub const DAY_PREFIXES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
