//! Per-model DCB read offsets
//!
//! The DCB a thermostat returns omits the sections its model lacks, so the same
//! field sits at different offsets on different models. All read offsets live in
//! the tables below; the decoder never hard-codes a model-specific position.
//!
//! Write requests use a separate, model-independent address space; see
//! [`super::encode`].

use crate::constants::{
    DCB_MIN_CLOCK_LENGTH, DCB_MIN_SEVEN_DAY_LENGTH, HEAT_GROUP_WIDTH, HOT_WATER_GROUP_WIDTH,
};
use crate::dcb::model::DeviceModel;

/// Header fields shared by every model.
pub mod header {
    pub const VENDOR_ID: usize = 2;
    pub const VERSION: usize = 3;
    pub const MODEL: usize = 4;
}

/// Heating block shared by the room thermostats (DT through PRT-HW).
pub mod thermostat {
    pub const TEMPERATURE_FORMAT: usize = 5;
    pub const SWITCH_DIFFERENTIAL: usize = 6;
    pub const FROST_PROTECTION_ENABLE: usize = 7;
    /// High byte first
    pub const CALIBRATION_OFFSET: usize = 8;
    pub const OUTPUT_DELAY: usize = 10;
    pub const UP_DOWN_KEY_LIMIT: usize = 12;
    pub const SENSOR_SELECTION: usize = 13;
    pub const OPTIMUM_START: usize = 14;
    pub const RATE_OF_CHANGE: usize = 15;
    pub const FROST_PROTECT_TEMPERATURE: usize = 17;
    pub const SET_ROOM_TEMP: usize = 18;
    pub const FLOOR_MAX_LIMIT: usize = 19;
    pub const FLOOR_MAX_LIMIT_ENABLE: usize = 20;
    pub const RUN_MODE: usize = 23;
    /// High byte first
    pub const TEMP_HOLD_MINUTES: usize = 31;
    /// Low byte first, tenths of a degree
    pub const REMOTE_AIR_TEMP: usize = 33;
    pub const FLOOR_TEMP: usize = 35;
    pub const BUILT_IN_AIR_TEMP: usize = 37;
    pub const ERROR_CODE: usize = 39;
    pub const HEATING_ACTIVE: usize = 40;
}

/// Read offsets for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub program_mode: usize,
    pub on_off: usize,
    pub key_lock: usize,
    pub away_mode: Option<usize>,
    /// Base of year, month, day, hour, minute, enable
    pub holiday_return: usize,
    /// Boost minutes, high byte first
    pub boost: Option<usize>,
    pub hot_water_state: Option<usize>,
    /// Base of year, month, day, weekday, hour, minute, second
    pub clock: Option<usize>,
    /// Bytes required before the clock section is decoded
    pub clock_min_length: usize,
    pub weekday_triggers: Option<usize>,
    pub weekend_triggers: Option<usize>,
    pub weekday_hw_triggers: Option<usize>,
    pub weekend_hw_triggers: Option<usize>,
    /// Monday heating group; the other days follow at a fixed stride
    pub seven_day_triggers: Option<usize>,
    /// Monday hot water group; the other days follow at a fixed stride
    pub seven_day_hw_triggers: Option<usize>,
    /// Bytes required before the seven-day section is decoded
    pub seven_day_min_length: usize,
}

const BASIC_LAYOUT: Layout = Layout {
    program_mode: 16,
    on_off: 21,
    key_lock: 22,
    away_mode: Some(24),
    holiday_return: 25,
    boost: None,
    hot_water_state: None,
    clock: None,
    clock_min_length: DCB_MIN_CLOCK_LENGTH,
    weekday_triggers: None,
    weekend_triggers: None,
    weekday_hw_triggers: None,
    weekend_hw_triggers: None,
    seven_day_triggers: None,
    seven_day_hw_triggers: None,
    seven_day_min_length: DCB_MIN_SEVEN_DAY_LENGTH,
};

const PRT_LAYOUT: Layout = Layout {
    clock: Some(41),
    weekday_triggers: Some(48),
    weekend_triggers: Some(60),
    seven_day_triggers: Some(72),
    ..BASIC_LAYOUT
};

const PRT_HW_LAYOUT: Layout = Layout {
    boost: Some(41),
    hot_water_state: Some(43),
    clock: Some(44),
    clock_min_length: 107,
    weekday_triggers: Some(51),
    weekend_triggers: Some(63),
    weekday_hw_triggers: Some(75),
    weekend_hw_triggers: Some(91),
    seven_day_triggers: Some(107),
    seven_day_hw_triggers: Some(191),
    seven_day_min_length: 303,
    ..BASIC_LAYOUT
};

const TM1_LAYOUT: Layout = Layout {
    program_mode: 6,
    on_off: 8,
    key_lock: 9,
    away_mode: None,
    holiday_return: 10,
    boost: None,
    hot_water_state: Some(18),
    clock: Some(19),
    clock_min_length: 58,
    weekday_triggers: None,
    weekend_triggers: None,
    weekday_hw_triggers: Some(26),
    weekend_hw_triggers: Some(42),
    seven_day_triggers: None,
    seven_day_hw_triggers: Some(58),
    seven_day_min_length: 170,
};

impl Layout {
    pub fn for_model(model: DeviceModel) -> &'static Layout {
        match model {
            DeviceModel::Prt | DeviceModel::PrtE => &PRT_LAYOUT,
            DeviceModel::PrtHw => &PRT_HW_LAYOUT,
            DeviceModel::Tm1 => &TM1_LAYOUT,
            DeviceModel::Dt | DeviceModel::DtE | DeviceModel::Unknown(_) => &BASIC_LAYOUT,
        }
    }

    /// Offset of the heating group for `day` (0 = Monday) in seven-day mode.
    pub fn day_triggers(&self, day: usize) -> Option<usize> {
        self.seven_day_triggers.map(|base| base + day * HEAT_GROUP_WIDTH)
    }

    /// Offset of the hot water group for `day` (0 = Monday) in seven-day mode.
    pub fn day_hw_triggers(&self, day: usize) -> Option<usize> {
        self.seven_day_hw_triggers
            .map(|base| base + day * HOT_WATER_GROUP_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(offset: Option<usize>, width: usize) -> usize {
        offset.map(|o| o + width).unwrap_or(0)
    }

    #[test]
    fn test_two_five_sections_fit_clock_minimum() {
        for model in DeviceModel::KNOWN {
            let layout = Layout::for_model(model);
            let furthest = [
                end(layout.clock, 7),
                end(layout.weekday_triggers, HEAT_GROUP_WIDTH),
                end(layout.weekend_triggers, HEAT_GROUP_WIDTH),
                end(layout.weekday_hw_triggers, HOT_WATER_GROUP_WIDTH),
                end(layout.weekend_hw_triggers, HOT_WATER_GROUP_WIDTH),
            ]
            .into_iter()
            .max()
            .unwrap_or(0);
            assert!(furthest <= layout.clock_min_length, "{model}");
        }
    }

    #[test]
    fn test_seven_day_sections_fit_minimum() {
        for model in DeviceModel::KNOWN {
            let layout = Layout::for_model(model);
            assert!(end(layout.day_triggers(6), HEAT_GROUP_WIDTH) <= layout.seven_day_min_length);
            assert!(
                end(layout.day_hw_triggers(6), HOT_WATER_GROUP_WIDTH)
                    <= layout.seven_day_min_length
            );
        }
    }

    #[test]
    fn test_prt_hw_seven_day_ends_at_dcb_end() {
        let layout = Layout::for_model(DeviceModel::PrtHw);
        assert_eq!(layout.day_triggers(6), Some(179));
        assert_eq!(layout.day_hw_triggers(6), Some(287));
        assert_eq!(end(layout.day_hw_triggers(6), HOT_WATER_GROUP_WIDTH), 303);
    }

    #[test]
    fn test_tm1_has_no_heating_schedule() {
        let layout = Layout::for_model(DeviceModel::Tm1);
        assert_eq!(layout.weekday_triggers, None);
        assert_eq!(layout.day_triggers(0), None);
        assert_eq!(layout.program_mode, 6);
    }
}
