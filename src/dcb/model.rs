//! Thermostat model and schedule mode
//!
//! Both are read from the DCB and decide which layout applies to every other field.

use serde::Serialize;
use std::fmt;

/// Thermostat family, taken from DCB byte 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceModel {
    Dt,
    DtE,
    Prt,
    PrtE,
    PrtHw,
    Tm1,
    Unknown(u8),
}

impl DeviceModel {
    /// Every model with a known layout.
    pub const KNOWN: [DeviceModel; 6] = [
        DeviceModel::Dt,
        DeviceModel::DtE,
        DeviceModel::Prt,
        DeviceModel::PrtE,
        DeviceModel::PrtHw,
        DeviceModel::Tm1,
    ];

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => DeviceModel::Dt,
            1 => DeviceModel::DtE,
            2 => DeviceModel::Prt,
            3 => DeviceModel::PrtE,
            4 => DeviceModel::PrtHw,
            5 => DeviceModel::Tm1,
            other => DeviceModel::Unknown(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            DeviceModel::Dt => 0,
            DeviceModel::DtE => 1,
            DeviceModel::Prt => 2,
            DeviceModel::PrtE => 3,
            DeviceModel::PrtHw => 4,
            DeviceModel::Tm1 => 5,
            DeviceModel::Unknown(byte) => byte,
        }
    }

    /// Label used in decoded records.
    pub fn label(self) -> &'static str {
        match self {
            DeviceModel::Dt => "DT",
            DeviceModel::DtE => "DT-E",
            DeviceModel::Prt => "PRT",
            DeviceModel::PrtE => "PRT-E",
            DeviceModel::PrtHw => "PRTHW",
            DeviceModel::Tm1 => "TM1",
            DeviceModel::Unknown(_) => "Unknown",
        }
    }

    /// Room thermostats (everything up to PRT-HW) carry the heating block.
    pub fn is_thermostat(self) -> bool {
        matches!(
            self,
            DeviceModel::Dt
                | DeviceModel::DtE
                | DeviceModel::Prt
                | DeviceModel::PrtE
                | DeviceModel::PrtHw
        )
    }

    /// Models with a real-time clock and a weekly schedule.
    pub fn has_clock(self) -> bool {
        matches!(
            self,
            DeviceModel::Prt | DeviceModel::PrtE | DeviceModel::PrtHw | DeviceModel::Tm1
        )
    }

    pub fn has_heating_schedule(self) -> bool {
        matches!(
            self,
            DeviceModel::Prt | DeviceModel::PrtE | DeviceModel::PrtHw
        )
    }

    pub fn has_hot_water(self) -> bool {
        matches!(self, DeviceModel::PrtHw | DeviceModel::Tm1)
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weekly schedule layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProgramMode {
    /// One schedule for weekdays, one for the weekend.
    TwoFive,
    /// One schedule per day.
    SevenDay,
}

impl ProgramMode {
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            ProgramMode::TwoFive
        } else {
            ProgramMode::SevenDay
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgramMode::TwoFive => "2/5 mode",
            ProgramMode::SevenDay => "7 day mode",
        }
    }
}

impl fmt::Display for ProgramMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
