//! # DCB Decoding
//!
//! Turns the raw Device Control Block returned by a read request into a
//! [`DecodedRecord`]. Decoding walks the DCB in sections, and each section checks
//! the DCB length before touching it:
//!
//! 1. header (vendor, version, model), at least 41 bytes
//! 2. heating settings and program mode
//! 3. on/off, key lock, run mode, away mode, holiday return
//! 4. live temperatures and status (room thermostats)
//! 5. DT and DT-E stop here
//! 6. clock and weekday/weekend schedules, model-specific minimum length
//! 7. hot water state and schedules (PRT-HW, TM1)
//! 8. in 7 day mode, one schedule per day
//!
//! A failed length check fails the whole decode; no partial record is returned.

use crate::constants::{DAY_OF_WEEK_LABELS, DAY_PREFIXES, DCB_MIN_LENGTH};
use crate::dcb::layout::{header, thermostat, Layout};
use crate::dcb::model::{DeviceModel, ProgramMode};
use crate::dcb::value::{DecodedRecord, HeatTrigger, HotWaterTrigger, TriggerGroup};
use crate::error::{HeatmiserError, Result};
use log::trace;

/// Labels for the sensor selection byte.
pub const SENSOR_SELECTION_LABELS: [&str; 5] = [
    "Built in air sensor only",
    "Remote air sensor only",
    "Floor sensor only",
    "Built in air and floor sensor",
    "Remote air and floor sensor",
];

fn require(dcb: &[u8], required: usize) -> Result<()> {
    if dcb.len() < required {
        return Err(HeatmiserError::RecordTooShort {
            required,
            actual: dcb.len(),
        });
    }
    Ok(())
}

fn be_u16(dcb: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([dcb[offset], dcb[offset + 1]])
}

/// Temperatures are stored low byte first, in tenths of a degree.
fn tenths(dcb: &[u8], offset: usize) -> f64 {
    f64::from(u16::from_le_bytes([dcb[offset], dcb[offset + 1]])) / 10.0
}

fn on_off_label(byte: u8) -> &'static str {
    if byte == 1 {
        "On"
    } else {
        "Off"
    }
}

/// Decodes a DCB, taking the model from byte 4.
pub fn decode(dcb: &[u8]) -> Result<DecodedRecord> {
    require(dcb, DCB_MIN_LENGTH)?;
    decode_with_model(DeviceModel::from_byte(dcb[header::MODEL]), dcb)
}

/// Decodes a DCB using the layout of `model`, whatever byte 4 says.
pub fn decode_with_model(model: DeviceModel, dcb: &[u8]) -> Result<DecodedRecord> {
    require(dcb, DCB_MIN_LENGTH)?;
    let layout = Layout::for_model(model);
    let mode = ProgramMode::from_byte(dcb[layout.program_mode]);
    let mut record = DecodedRecord::new(model, mode);

    let vendor = if dcb[header::VENDOR_ID] == 0 {
        "HEATMISER"
    } else {
        "OEM"
    };
    record.insert("vendor_id", vendor);
    record.insert("version", dcb[header::VERSION] & 0x7F);
    record.insert("in_floor_limit_state", dcb[header::VERSION] & 0x8F > 0);
    record.insert("model", model.label());

    if model.is_thermostat() {
        decode_heating_settings(dcb, &mut record);
    }

    record.insert("program_mode", mode.label());

    if model.is_thermostat() {
        record.insert(
            "frost_protect_temperature",
            dcb[thermostat::FROST_PROTECT_TEMPERATURE],
        );
        record.insert("set_room_temp", dcb[thermostat::SET_ROOM_TEMP]);
        record.insert("floor_max_limit", dcb[thermostat::FLOOR_MAX_LIMIT]);
        record.insert(
            "floor_max_limit_enable",
            dcb[thermostat::FLOOR_MAX_LIMIT_ENABLE] == 1,
        );
    }

    decode_control_state(dcb, layout, model, &mut record);

    if model.is_thermostat() {
        decode_heating_status(dcb, &mut record);
    }

    if !model.has_clock() {
        trace!("{model}: no clock or schedule, stopping at offset 41");
        return Ok(record);
    }

    require(dcb, layout.clock_min_length)?;
    if let Some(base) = layout.clock {
        decode_clock(dcb, base, &mut record);
    }
    if let Some(offset) = layout.weekday_triggers {
        record.insert("weekday_triggers", TriggerGroup::<HeatTrigger>::decode_at(dcb, offset)?);
    }
    if let Some(offset) = layout.weekend_triggers {
        record.insert("weekend_triggers", TriggerGroup::<HeatTrigger>::decode_at(dcb, offset)?);
    }
    if let Some(offset) = layout.boost {
        record.insert("boost", be_u16(dcb, offset));
    }
    if let Some(offset) = layout.hot_water_state {
        record.insert("hot_water_state", on_off_label(dcb[offset]));
    }
    if let Some(offset) = layout.weekday_hw_triggers {
        record.insert(
            "weekday_hw_triggers",
            TriggerGroup::<HotWaterTrigger>::decode_at(dcb, offset)?,
        );
    }
    if let Some(offset) = layout.weekend_hw_triggers {
        record.insert(
            "weekend_hw_triggers",
            TriggerGroup::<HotWaterTrigger>::decode_at(dcb, offset)?,
        );
    }

    if mode == ProgramMode::TwoFive {
        trace!("{model}: 2/5 mode, no per-day schedule");
        return Ok(record);
    }

    require(dcb, layout.seven_day_min_length)?;
    for (day, prefix) in DAY_PREFIXES.iter().enumerate() {
        if let Some(offset) = layout.day_triggers(day) {
            record.insert(
                &format!("{prefix}_triggers"),
                TriggerGroup::<HeatTrigger>::decode_at(dcb, offset)?,
            );
        }
    }
    for (day, prefix) in DAY_PREFIXES.iter().enumerate() {
        if let Some(offset) = layout.day_hw_triggers(day) {
            record.insert(
                &format!("{prefix}_hw_triggers"),
                TriggerGroup::<HotWaterTrigger>::decode_at(dcb, offset)?,
            );
        }
    }

    Ok(record)
}

fn decode_heating_settings(dcb: &[u8], record: &mut DecodedRecord) {
    let format = if dcb[thermostat::TEMPERATURE_FORMAT] == 0 {
        "Celsius"
    } else {
        "Fahrenheit"
    };
    record.insert("temperature_format", format);
    record.insert("switch_differential", dcb[thermostat::SWITCH_DIFFERENTIAL]);
    record.insert(
        "frost_protection_enable",
        dcb[thermostat::FROST_PROTECTION_ENABLE] == 1,
    );
    record.insert(
        "calibration_offset",
        be_u16(dcb, thermostat::CALIBRATION_OFFSET),
    );
    record.insert("output_delay_in_minutes", dcb[thermostat::OUTPUT_DELAY]);
    record.insert("up_down_key_limit", dcb[thermostat::UP_DOWN_KEY_LIMIT]);
    let sensor = SENSOR_SELECTION_LABELS
        .get(dcb[thermostat::SENSOR_SELECTION] as usize)
        .copied()
        .unwrap_or("Unknown");
    record.insert("sensor_selection", sensor);
    record.insert("optimum_start", dcb[thermostat::OPTIMUM_START]);
    record.insert("rate_of_change", dcb[thermostat::RATE_OF_CHANGE]);
}

fn decode_control_state(
    dcb: &[u8],
    layout: &Layout,
    model: DeviceModel,
    record: &mut DecodedRecord,
) {
    record.insert("on_off", on_off_label(dcb[layout.on_off]));
    let lock = if dcb[layout.key_lock] == 0 {
        "Unlock"
    } else {
        "Lock"
    };
    record.insert("key_lock", lock);

    if model.is_thermostat() {
        let run_mode = if dcb[thermostat::RUN_MODE] == 0 {
            "Heating mode (normal mode)"
        } else {
            "Frost protection mode"
        };
        record.insert("run_mode", run_mode);
    }
    if let Some(offset) = layout.away_mode {
        record.insert("away_mode", if dcb[offset] == 0 { "off" } else { "on" });
    }

    let hr = layout.holiday_return;
    record.insert("holiday_return_date_year", 2000 + u32::from(dcb[hr]));
    record.insert("holiday_return_date_month", dcb[hr + 1]);
    record.insert("holiday_return_date_day_of_month", dcb[hr + 2]);
    record.insert("holiday_return_date_hour", dcb[hr + 3]);
    record.insert("holiday_return_date_minute", dcb[hr + 4]);
    record.insert("holiday_enable", dcb[hr + 5] == 1);
}

fn decode_heating_status(dcb: &[u8], record: &mut DecodedRecord) {
    record.insert(
        "temp_hold_minutes",
        be_u16(dcb, thermostat::TEMP_HOLD_MINUTES),
    );
    // Which probes are fitted decides which temperatures are meaningful.
    let sensor = dcb[thermostat::SENSOR_SELECTION];
    if sensor == 1 || sensor == 4 {
        record.insert("air_temp", tenths(dcb, thermostat::REMOTE_AIR_TEMP));
    }
    if (2..=4).contains(&sensor) {
        record.insert("floor_temp", tenths(dcb, thermostat::FLOOR_TEMP));
    }
    if sensor == 0 || sensor == 3 {
        record.insert("air_temp", tenths(dcb, thermostat::BUILT_IN_AIR_TEMP));
    }
    record.insert("error_code", dcb[thermostat::ERROR_CODE]);
    record.insert("heating_is_currently_on", dcb[thermostat::HEATING_ACTIVE] == 1);
}

fn decode_clock(dcb: &[u8], base: usize, record: &mut DecodedRecord) {
    let year = 2000 + u32::from(dcb[base]);
    let month = dcb[base + 1];
    let day = dcb[base + 2];
    let weekday = dcb[base + 3];
    let hour = dcb[base + 4];
    let minute = dcb[base + 5];
    let second = dcb[base + 6];

    record.insert("year", year);
    record.insert("month", month);
    record.insert("day_of_month", day);
    record.insert("weekday", weekday);
    record.insert("hour", hour);
    record.insert("minute", minute);
    record.insert("second", second);

    let dow = (weekday as usize)
        .checked_sub(1)
        .and_then(|i| DAY_OF_WEEK_LABELS.get(i))
        .copied()
        .unwrap_or("???");
    record.insert(
        "clock",
        format!("{year}/{month}/{day} {dow} {hour}:{minute:02}:{second:02}"),
    );
}
