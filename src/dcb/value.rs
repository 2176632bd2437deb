//! Decoded DCB values
//!
//! A [`DecodedRecord`] is an ordered list of named values, rebuilt from scratch on
//! every read. Trigger groups keep their four fixed slots even when the thermostat
//! leaves some of them unconfigured.

use crate::constants::{HEAT_TRIGGER_WIDTH, HOT_WATER_TRIGGER_WIDTH, TRIGGER_SLOTS};
use crate::dcb::model::{DeviceModel, ProgramMode};
use crate::error::{HeatmiserError, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// A packed, fixed-width schedule slot.
pub trait TriggerSlot: Sized + Copy + Default {
    /// Bytes per slot on the wire.
    const WIDTH: usize;

    fn from_bytes(bytes: &[u8]) -> Self;
    fn write_bytes(&self, out: &mut Vec<u8>);
    /// Named components, in wire order.
    fn components(&self) -> Vec<(&'static str, u8)>;
}

/// Heating schedule slot: switch to `set_temp` at `hour:minute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeatTrigger {
    pub hour: u8,
    pub minute: u8,
    pub set_temp: u8,
}

impl TriggerSlot for HeatTrigger {
    const WIDTH: usize = HEAT_TRIGGER_WIDTH;

    fn from_bytes(bytes: &[u8]) -> Self {
        HeatTrigger {
            hour: bytes[0],
            minute: bytes[1],
            set_temp: bytes[2],
        }
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.hour, self.minute, self.set_temp]);
    }

    fn components(&self) -> Vec<(&'static str, u8)> {
        vec![
            ("hour", self.hour),
            ("minute", self.minute),
            ("set_temp", self.set_temp),
        ]
    }
}

/// Hot water schedule slot: on at `hour_on:minute_on`, off at `hour_off:minute_off`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HotWaterTrigger {
    pub hour_on: u8,
    pub minute_on: u8,
    pub hour_off: u8,
    pub minute_off: u8,
}

impl TriggerSlot for HotWaterTrigger {
    const WIDTH: usize = HOT_WATER_TRIGGER_WIDTH;

    fn from_bytes(bytes: &[u8]) -> Self {
        HotWaterTrigger {
            hour_on: bytes[0],
            minute_on: bytes[1],
            hour_off: bytes[2],
            minute_off: bytes[3],
        }
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.hour_on, self.minute_on, self.hour_off, self.minute_off]);
    }

    fn components(&self) -> Vec<(&'static str, u8)> {
        vec![
            ("hour_on", self.hour_on),
            ("minute_on", self.minute_on),
            ("hour_off", self.hour_off),
            ("minute_off", self.minute_off),
        ]
    }
}

/// Four schedule slots for one day category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerGroup<T: TriggerSlot> {
    pub slots: [T; TRIGGER_SLOTS],
}

impl<T: TriggerSlot> TriggerGroup<T> {
    /// Bytes per group on the wire.
    pub const WIDTH: usize = TRIGGER_SLOTS * T::WIDTH;

    pub fn new(slots: [T; TRIGGER_SLOTS]) -> Self {
        TriggerGroup { slots }
    }

    /// Decodes a group starting at `offset` in the DCB.
    pub fn decode_at(dcb: &[u8], offset: usize) -> Result<Self> {
        let end = offset + Self::WIDTH;
        let bytes = dcb.get(offset..end).ok_or(HeatmiserError::RecordTooShort {
            required: end,
            actual: dcb.len(),
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Decodes a group from exactly [`Self::WIDTH`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut slots = [T::default(); TRIGGER_SLOTS];
        for (slot, chunk) in slots.iter_mut().zip(bytes.chunks_exact(T::WIDTH)) {
            *slot = T::from_bytes(chunk);
        }
        TriggerGroup { slots }
    }

    /// All four slots concatenated, whether or not they are in use.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIDTH);
        for slot in &self.slots {
            slot.write_bytes(&mut out);
        }
        out
    }
}

impl<T: TriggerSlot + Serialize> Serialize for TriggerGroup<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TRIGGER_SLOTS))?;
        for (i, slot) in self.slots.iter().enumerate() {
            map.serialize_entry(&format!("time{}", i + 1), slot)?;
        }
        map.end()
    }
}

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    UInt(u32),
    Float(f64),
    Bool(bool),
    Text(String),
    HeatTriggers(TriggerGroup<HeatTrigger>),
    HotWaterTriggers(TriggerGroup<HotWaterTrigger>),
}

impl Value {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Value::HeatTriggers(_) | Value::HotWaterTriggers(_))
    }
}

fn write_group<T: TriggerSlot>(
    f: &mut fmt::Formatter<'_>,
    group: &TriggerGroup<T>,
    indent: &str,
) -> fmt::Result {
    for (i, slot) in group.slots.iter().enumerate() {
        writeln!(f, "{indent}time{}:", i + 1)?;
        for (name, value) in slot.components() {
            writeln!(f, "{indent}    {name} = {value}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.1}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::HeatTriggers(group) => write_group(f, group, ""),
            Value::HotWaterTriggers(group) => write_group(f, group, ""),
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt(v as u32)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt(v as u32)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<TriggerGroup<HeatTrigger>> for Value {
    fn from(v: TriggerGroup<HeatTrigger>) -> Self {
        Value::HeatTriggers(v)
    }
}

impl From<TriggerGroup<HotWaterTrigger>> for Value {
    fn from(v: TriggerGroup<HotWaterTrigger>) -> Self {
        Value::HotWaterTriggers(v)
    }
}

/// The decoded contents of one DCB, in thermostat order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    model: DeviceModel,
    program_mode: ProgramMode,
    entries: Vec<(String, Value)>,
}

impl DecodedRecord {
    pub(crate) fn new(model: DeviceModel, program_mode: ProgramMode) -> Self {
        DecodedRecord {
            model,
            program_mode,
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces a field, keeping its original position on replacement.
    pub(crate) fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn model(&self) -> DeviceModel {
        self.model
    }

    pub fn program_mode(&self) -> ProgramMode {
        self.program_mode
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            match value {
                Value::HeatTriggers(group) => {
                    writeln!(f, "{name}:")?;
                    write_group(f, group, "    ")?;
                }
                Value::HotWaterTriggers(group) => {
                    writeln!(f, "{name}:")?;
                    write_group(f, group, "    ")?;
                }
                scalar => writeln!(f, "{name} = {scalar}")?,
            }
        }
        Ok(())
    }
}

impl Serialize for DecodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
