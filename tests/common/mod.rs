//! DCB fixtures shared by the integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

pub const MODEL_DT: u8 = 0;
pub const MODEL_PRT: u8 = 2;
pub const MODEL_PRT_HW: u8 = 4;
pub const MODEL_TM1: u8 = 5;

/// Friday 15 March 2024, 14:30:05
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .and_then(|d| d.and_hms_opt(14, 30, 5))
        .unwrap()
}

/// Clock bytes for [`fixed_now`]: year - 2000, month, day, weekday, hour, minute, second.
pub const FIXED_CLOCK: [u8; 7] = [24, 3, 15, 5, 14, 30, 5];

pub const WEEKDAY_HEAT: [u8; 12] = [7, 0, 21, 9, 30, 16, 17, 0, 21, 22, 0, 16];
pub const WEEKDAY_HW: [u8; 16] = [6, 30, 8, 0, 17, 0, 19, 0, 24, 0, 24, 0, 24, 0, 24, 0];

/// A zeroed DCB of `len` bytes for `model`.
pub fn blank_dcb(model: u8, len: usize) -> Vec<u8> {
    let mut dcb = vec![0u8; len];
    dcb[4] = model;
    dcb
}

/// A PRT switched on, built-in sensor reading 21.5 degrees, clock at [`FIXED_CLOCK`].
pub fn prt_dcb(seven_day: bool) -> Vec<u8> {
    let len = if seven_day { 156 } else { 72 };
    let mut dcb = blank_dcb(MODEL_PRT, len);
    dcb[16] = u8::from(seven_day);
    dcb[18] = 21;
    dcb[21] = 1;
    dcb[37] = 0xD7;
    dcb[38] = 0x00;
    dcb[41..48].copy_from_slice(&FIXED_CLOCK);
    dcb[48..60].copy_from_slice(&WEEKDAY_HEAT);
    if seven_day {
        // Monday group; other days stay zero
        dcb[72..84].copy_from_slice(&WEEKDAY_HEAT);
    }
    dcb
}

/// A PRT-HW in 2/5 mode with hot water on and a 60 minute boost.
pub fn prt_hw_dcb() -> Vec<u8> {
    let mut dcb = blank_dcb(MODEL_PRT_HW, 107);
    dcb[21] = 1;
    dcb[41] = 0x00;
    dcb[42] = 0x3C;
    dcb[43] = 1;
    dcb[44..51].copy_from_slice(&FIXED_CLOCK);
    dcb[51..63].copy_from_slice(&WEEKDAY_HEAT);
    dcb[75..91].copy_from_slice(&WEEKDAY_HW);
    dcb
}

/// A TM1 timer in 2/5 mode, key lock engaged.
pub fn tm1_dcb() -> Vec<u8> {
    let mut dcb = blank_dcb(MODEL_TM1, 58);
    dcb[8] = 1;
    dcb[9] = 1;
    dcb[18] = 1;
    dcb[19..26].copy_from_slice(&FIXED_CLOCK);
    dcb[26..42].copy_from_slice(&WEEKDAY_HW);
    dcb
}

/// Hot water group with the first slot switching on at `hour`:30 for an hour.
pub fn hw_group(hour: u8) -> [u8; 16] {
    let mut group = [24, 0, 24, 0, 24, 0, 24, 0, 24, 0, 24, 0, 24, 0, 24, 0];
    group[..4].copy_from_slice(&[hour, 30, hour + 1, 30]);
    group
}

/// [`prt_hw_dcb`] switched to 7 day mode: Monday hot water at 06:30, Sunday at 09:30.
pub fn prt_hw_seven_day_dcb() -> Vec<u8> {
    let mut dcb = prt_hw_dcb();
    dcb.resize(303, 0);
    dcb[16] = 1;
    dcb[107..119].copy_from_slice(&WEEKDAY_HEAT);
    dcb[191..207].copy_from_slice(&hw_group(6));
    dcb[287..303].copy_from_slice(&hw_group(9));
    dcb
}

/// [`tm1_dcb`] switched to 7 day mode: Monday at 07:30, Sunday at 09:30.
pub fn tm1_seven_day_dcb() -> Vec<u8> {
    let mut dcb = tm1_dcb();
    dcb.resize(170, 0);
    dcb[6] = 1;
    dcb[58..74].copy_from_slice(&hw_group(7));
    dcb[154..170].copy_from_slice(&hw_group(9));
    dcb
}
