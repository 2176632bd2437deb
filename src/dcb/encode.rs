//! # DCB Field Encoding
//!
//! Maps a writable field name to its DCB write address and encodes a caller value
//! into the bytes a write request carries.
//!
//! Write addresses form a single logical map shared by every model; the compacted
//! per-model read offsets in [`super::layout`] do not apply here. Whether a field
//! can be written at all still depends on the model, so lookups are keyed by
//! `(model, name)`.
//!
//! Values are validated completely before anything is returned, so a rejected
//! value never reaches the wire.

use crate::constants::{HEAT_GROUP_WIDTH, HOT_WATER_GROUP_WIDTH};
use crate::dcb::model::DeviceModel;
use crate::dcb::value::{HeatTrigger, HotWaterTrigger, TriggerGroup, TriggerSlot};
use crate::error::{HeatmiserError, Result};
use chrono::{Datelike, Duration, Local, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use FieldKind::{Byte, Clock, HeatTriggers, HotWaterTriggers, Labels};

/// Fields present in decoded records that are deliberately not writable.
pub const READ_ONLY_FIELDS: [&str; 3] = [
    "switch_differential",
    "program_mode",
    "floor_max_limit_enable",
];

const ON_OFF: &[(&str, u8)] = &[("Off", 0), ("On", 1)];
const KEY_LOCK: &[(&str, u8)] = &[("Unlock", 0), ("Lock", 1)];
const RUN_MODE: &[(&str, u8)] = &[
    ("Heating mode (normal mode)", 0),
    ("Frost protection mode", 1),
];
const AWAY_MODE: &[(&str, u8)] = &[("off", 0), ("on", 1)];
const HOT_WATER_STATE: &[(&str, u8)] = &[("prog", 0), ("on", 1), ("off", 2)];

/// Highest hour a trigger may carry; 24 marks an unused slot.
const TRIGGER_HOUR_MAX: u8 = 24;
const TRIGGER_MINUTE_MAX: u8 = 59;

/// How a writable field's value is validated and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single unsigned byte.
    Byte,
    /// One of a fixed set of labels, each mapped to a byte.
    Labels(&'static [(&'static str, u8)]),
    /// Four heating slots, 12 bytes.
    HeatTriggers,
    /// Four hot water slots, 16 bytes.
    HotWaterTriggers,
    /// Date and time, given as a minute offset from the current time.
    Clock,
}

/// Which models accept a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSet {
    All,
    Thermostats,
    AllButTm1,
    WithClock,
    HeatingSchedule,
    HotWater,
}

impl ModelSet {
    pub fn contains(self, model: DeviceModel) -> bool {
        match self {
            ModelSet::All => true,
            ModelSet::Thermostats => model.is_thermostat(),
            ModelSet::AllButTm1 => model != DeviceModel::Tm1,
            ModelSet::WithClock => model.has_clock(),
            ModelSet::HeatingSchedule => model.has_heating_schedule(),
            ModelSet::HotWater => model.has_hot_water(),
        }
    }
}

/// A writable DCB field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub address: u16,
    pub kind: FieldKind,
    pub models: ModelSet,
    /// Only meaningful while the thermostat runs a per-day schedule.
    pub seven_day_only: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, address: u16, kind: FieldKind, models: ModelSet) -> Self {
        FieldSpec {
            name,
            address,
            kind,
            models,
            seven_day_only: false,
        }
    }

    const fn seven_day(name: &'static str, address: u16, kind: FieldKind, models: ModelSet) -> Self {
        FieldSpec {
            name,
            address,
            kind,
            models,
            seven_day_only: true,
        }
    }

    /// Writable on every known model, so no prior read is needed to validate it.
    pub fn is_universal(&self) -> bool {
        DeviceModel::KNOWN.iter().all(|m| self.models.contains(*m))
    }

    /// Bytes the encoded value occupies.
    pub fn width(&self) -> usize {
        match self.kind {
            FieldKind::Byte | FieldKind::Labels(_) => 1,
            FieldKind::HeatTriggers => HEAT_GROUP_WIDTH,
            FieldKind::HotWaterTriggers => HOT_WATER_GROUP_WIDTH,
            FieldKind::Clock => 7,
        }
    }
}

/// Every writable field and its logical write address.
pub static WRITABLE_FIELDS: [FieldSpec; 27] = [
    FieldSpec::new("frost_protect_temperature", 17, Byte, ModelSet::Thermostats),
    FieldSpec::new("set_room_temp", 18, Byte, ModelSet::Thermostats),
    FieldSpec::new("floor_max_limit", 19, Byte, ModelSet::Thermostats),
    FieldSpec::new("on_off", 21, Labels(ON_OFF), ModelSet::All),
    FieldSpec::new("key_lock", 22, Labels(KEY_LOCK), ModelSet::All),
    FieldSpec::new("run_mode", 23, Labels(RUN_MODE), ModelSet::Thermostats),
    FieldSpec::new("away_mode", 31, Labels(AWAY_MODE), ModelSet::AllButTm1),
    FieldSpec::new("hot_water_state", 42, Labels(HOT_WATER_STATE), ModelSet::HotWater),
    FieldSpec::new("clock", 43, Clock, ModelSet::WithClock),
    FieldSpec::new("weekday_triggers", 47, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::new("weekend_triggers", 59, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::new("weekday_hw_triggers", 71, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::new("weekend_hw_triggers", 87, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("mon_triggers", 103, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("tue_triggers", 115, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("wed_triggers", 127, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("thu_triggers", 139, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("fri_triggers", 151, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("sat_triggers", 163, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("sun_triggers", 175, HeatTriggers, ModelSet::HeatingSchedule),
    FieldSpec::seven_day("mon_hw_triggers", 187, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("tue_hw_triggers", 203, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("wed_hw_triggers", 219, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("thu_hw_triggers", 235, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("fri_hw_triggers", 251, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("sat_hw_triggers", 267, HotWaterTriggers, ModelSet::HotWater),
    FieldSpec::seven_day("sun_hw_triggers", 283, HotWaterTriggers, ModelSet::HotWater),
];

type FieldIndex = HashMap<DeviceModel, HashMap<&'static str, &'static FieldSpec>>;

/// `(model, name)` index over [`WRITABLE_FIELDS`] for every known model.
static FIELD_INDEX: Lazy<FieldIndex> = Lazy::new(|| {
    let mut index: FieldIndex = HashMap::new();
    for model in DeviceModel::KNOWN {
        let fields = index.entry(model).or_default();
        for spec in WRITABLE_FIELDS.iter().filter(|s| s.models.contains(model)) {
            fields.insert(spec.name, spec);
        }
    }
    index
});

/// Looks up a field by name alone, ignoring model support.
pub fn field_by_name(name: &str) -> Option<&'static FieldSpec> {
    WRITABLE_FIELDS.iter().find(|spec| spec.name == name)
}

/// Looks up the writable field `name` for `model`.
///
/// Models with an unknown layout only accept fields every known model accepts.
pub fn lookup(model: DeviceModel, name: &str) -> Result<&'static FieldSpec> {
    if READ_ONLY_FIELDS.contains(&name) {
        return Err(HeatmiserError::unknown_field(name, model, "read-only"));
    }
    let found = match model {
        DeviceModel::Unknown(_) => field_by_name(name).filter(|spec| spec.is_universal()),
        known => FIELD_INDEX
            .get(&known)
            .and_then(|fields| fields.get(name))
            .copied(),
    };
    match found {
        Some(spec) => Ok(spec),
        None if field_by_name(name).is_some() => Err(HeatmiserError::unknown_field(
            name,
            model,
            "not present on this model",
        )),
        None => Err(HeatmiserError::unknown_field(name, model, "no such field")),
    }
}

/// Looks up `name` when no model is known yet.
///
/// Only fields writable on every model resolve; other known fields need the model
/// from a previous read.
pub fn lookup_any_model(name: &str) -> Result<&'static FieldSpec> {
    if READ_ONLY_FIELDS.contains(&name) {
        return Err(HeatmiserError::unknown_field(name, "any model", "read-only"));
    }
    match field_by_name(name) {
        Some(spec) if spec.is_universal() => Ok(spec),
        Some(_) => Err(HeatmiserError::ReadRequiredFirst {
            field: name.to_string(),
        }),
        None => Err(HeatmiserError::unknown_field(name, "any model", "no such field")),
    }
}

/// A caller-supplied value for a writable field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Byte fields, or a minute offset from now for the clock.
    Number(i64),
    /// Label fields, or `"now"` for the clock.
    Text(String),
    /// Trigger groups as raw packed bytes.
    Bytes(Vec<u8>),
    HeatTriggers(TriggerGroup<HeatTrigger>),
    HotWaterTriggers(TriggerGroup<HotWaterTrigger>),
    /// An absolute clock value.
    DateTime(NaiveDateTime),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bytes(b) => {
                let parts: Vec<String> = b.iter().map(|x| x.to_string()).collect();
                f.write_str(&parts.join(","))
            }
            FieldValue::HeatTriggers(g) => write!(f, "{:?}", g.to_bytes()),
            FieldValue::HotWaterTriggers(g) => write!(f, "{:?}", g.to_bytes()),
            FieldValue::DateTime(t) => write!(f, "{t}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<TriggerGroup<HeatTrigger>> for FieldValue {
    fn from(v: TriggerGroup<HeatTrigger>) -> Self {
        FieldValue::HeatTriggers(v)
    }
}

impl From<TriggerGroup<HotWaterTrigger>> for FieldValue {
    fn from(v: TriggerGroup<HotWaterTrigger>) -> Self {
        FieldValue::HotWaterTriggers(v)
    }
}

/// The address and bytes of one encoded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    pub address: u16,
    pub data: Vec<u8>,
}

/// Encodes `value` for `name` on `model`, resolving clock offsets against the local time.
pub fn encode_field(model: DeviceModel, name: &str, value: &FieldValue) -> Result<EncodedField> {
    encode_field_at(model, name, value, Local::now().naive_local())
}

/// Encodes `value` for `name` on `model`, resolving clock offsets against `now`.
pub fn encode_field_at(
    model: DeviceModel,
    name: &str,
    value: &FieldValue,
    now: NaiveDateTime,
) -> Result<EncodedField> {
    let spec = lookup(model, name)?;
    encode_spec(spec, value, now)
}

/// Encodes `value` against an already resolved field.
pub fn encode_spec(spec: &FieldSpec, value: &FieldValue, now: NaiveDateTime) -> Result<EncodedField> {
    let data = match spec.kind {
        FieldKind::Byte => vec![encode_byte(spec.name, value)?],
        FieldKind::Labels(labels) => vec![encode_label(spec.name, labels, value)?],
        FieldKind::HeatTriggers => encode_triggers::<HeatTrigger>(spec.name, value)?,
        FieldKind::HotWaterTriggers => encode_triggers::<HotWaterTrigger>(spec.name, value)?,
        FieldKind::Clock => encode_clock(spec.name, value, now)?,
    };
    Ok(EncodedField {
        address: spec.address,
        data,
    })
}

fn encode_byte(name: &str, value: &FieldValue) -> Result<u8> {
    match value {
        FieldValue::Number(n) => u8::try_from(*n)
            .map_err(|_| HeatmiserError::invalid_value(name, n, "must be between 0 and 255")),
        FieldValue::Text(s) => s
            .trim()
            .parse::<u8>()
            .map_err(|_| HeatmiserError::invalid_value(name, s, "must be between 0 and 255")),
        other => Err(HeatmiserError::invalid_value(name, other, "expected a number")),
    }
}

fn valid_labels(labels: &[(&str, u8)]) -> String {
    let quoted: Vec<String> = labels.iter().map(|(l, _)| format!("'{l}'")).collect();
    format!("Valid values: {}", quoted.join(" or "))
}

fn encode_label(name: &str, labels: &[(&str, u8)], value: &FieldValue) -> Result<u8> {
    let text = match value {
        FieldValue::Text(s) => s,
        other => return Err(HeatmiserError::invalid_value(name, other, valid_labels(labels))),
    };
    labels
        .iter()
        .find(|(label, _)| label == text)
        .map(|(_, byte)| *byte)
        .ok_or_else(|| HeatmiserError::invalid_value(name, text, valid_labels(labels)))
}

/// Hour and minute of every slot, in slot order.
trait SlotTimes {
    fn times(&self) -> Vec<(u8, u8)>;
}

impl SlotTimes for HeatTrigger {
    fn times(&self) -> Vec<(u8, u8)> {
        vec![(self.hour, self.minute)]
    }
}

impl SlotTimes for HotWaterTrigger {
    fn times(&self) -> Vec<(u8, u8)> {
        vec![(self.hour_on, self.minute_on), (self.hour_off, self.minute_off)]
    }
}

fn encode_triggers<T>(name: &str, value: &FieldValue) -> Result<Vec<u8>>
where
    T: TriggerSlot + SlotTimes,
    TriggerGroup<T>: GroupValue,
{
    let group: TriggerGroup<T> = match value {
        FieldValue::Bytes(bytes) => {
            if bytes.len() != TriggerGroup::<T>::WIDTH {
                return Err(HeatmiserError::invalid_value(
                    name,
                    value,
                    format!("expected {} bytes, got {}", TriggerGroup::<T>::WIDTH, bytes.len()),
                ));
            }
            TriggerGroup::from_bytes(bytes)
        }
        other => TriggerGroup::<T>::from_value(other).ok_or_else(|| {
            HeatmiserError::invalid_value(name, other, "expected a trigger group")
        })?,
    };

    for (i, slot) in group.slots.iter().enumerate() {
        for (hour, minute) in slot.times() {
            if hour > TRIGGER_HOUR_MAX || minute > TRIGGER_MINUTE_MAX {
                return Err(HeatmiserError::invalid_value(
                    name,
                    value,
                    format!("time{} has invalid time {hour}:{minute:02}", i + 1),
                ));
            }
        }
    }
    Ok(group.to_bytes())
}

/// Extracts a typed group from the matching [`FieldValue`] variant.
trait GroupValue: Sized {
    fn from_value(value: &FieldValue) -> Option<Self>;
}

impl GroupValue for TriggerGroup<HeatTrigger> {
    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::HeatTriggers(g) => Some(*g),
            _ => None,
        }
    }
}

impl GroupValue for TriggerGroup<HotWaterTrigger> {
    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::HotWaterTriggers(g) => Some(*g),
            _ => None,
        }
    }
}

fn encode_clock(name: &str, value: &FieldValue, now: NaiveDateTime) -> Result<Vec<u8>> {
    let when = match value {
        FieldValue::Number(minutes) => Duration::try_minutes(*minutes)
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or_else(|| HeatmiserError::invalid_value(name, minutes, "offset out of range"))?,
        FieldValue::Text(s) if s.eq_ignore_ascii_case("now") => now,
        FieldValue::Text(s) => {
            let minutes = s.trim().parse::<i64>().map_err(|_| {
                HeatmiserError::invalid_value(name, s, "expected 'now' or a minute offset")
            })?;
            return encode_clock(name, &FieldValue::Number(minutes), now);
        }
        FieldValue::DateTime(t) => *t,
        other => {
            return Err(HeatmiserError::invalid_value(
                name,
                other,
                "expected 'now' or a minute offset",
            ))
        }
    };

    let year = when
        .year()
        .checked_sub(2000)
        .and_then(|y| u8::try_from(y).ok())
        .ok_or_else(|| HeatmiserError::invalid_value(name, when, "year must be 2000-2255"))?;
    Ok(vec![
        year,
        when.month() as u8,
        when.day() as u8,
        when.weekday().number_from_monday() as u8,
        when.hour() as u8,
        when.minute() as u8,
        when.second() as u8,
    ])
}

/// Parses command-line text into a value of the kind `name` expects.
///
/// Trigger groups are given as comma-separated bytes; every other kind is passed
/// through as text and validated by the encoder.
pub fn parse_field_value(name: &str, raw: &str) -> Result<FieldValue> {
    let kind = field_by_name(name).map(|spec| spec.kind);
    match kind {
        Some(FieldKind::HeatTriggers) | Some(FieldKind::HotWaterTriggers) => raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u8>())
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map(FieldValue::Bytes)
            .map_err(|_| {
                HeatmiserError::invalid_value(name, raw, "expected comma-separated bytes")
            }),
        _ => Ok(FieldValue::Text(raw.to_string())),
    }
}
