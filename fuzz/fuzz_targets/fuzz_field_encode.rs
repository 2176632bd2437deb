#![no_main]

use heatmiser_rs::dcb::{encode_field, parse_field_value, DeviceModel};
use libfuzzer_sys::fuzz_target;

const FIELDS: [&str; 6] = [
    "on_off",
    "set_room_temp",
    "clock",
    "weekday_triggers",
    "weekday_hw_triggers",
    "away_mode",
];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let model = DeviceModel::from_byte(data[0] % 7);
    let name = FIELDS[data[1] as usize % FIELDS.len()];
    if let Ok(raw) = std::str::from_utf8(&data[2..]) {
        if let Ok(value) = parse_field_value(name, raw) {
            if let Ok(encoded) = encode_field(model, name, &value) {
                assert!(!encoded.data.is_empty());
            }
        }
    }
});
