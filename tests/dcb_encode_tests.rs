//! Tests for looking up writable fields and encoding their values.

mod common;

use chrono::NaiveDate;
use common::*;
use heatmiser_rs::dcb::{
    encode_field, encode_field_at, lookup, lookup_any_model, parse_field_value, DeviceModel,
    EncodedField, FieldValue, HeatTrigger, TriggerGroup, READ_ONLY_FIELDS,
};
use heatmiser_rs::HeatmiserError;

fn unknown_reason(result: Result<EncodedField, HeatmiserError>) -> String {
    match result {
        Err(HeatmiserError::UnknownField { reason, .. }) => reason,
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

fn assert_invalid(result: Result<EncodedField, HeatmiserError>) {
    assert!(
        matches!(result, Err(HeatmiserError::InvalidFieldValue { .. })),
        "expected InvalidFieldValue, got {result:?}"
    );
}

/// Tests switching a thermostat on.
#[test]
fn test_on_off() {
    let encoded = encode_field(DeviceModel::Prt, "on_off", &"On".into()).unwrap();
    assert_eq!(
        encoded,
        EncodedField {
            address: 21,
            data: vec![1]
        }
    );
    let encoded = encode_field(DeviceModel::Tm1, "on_off", &"Off".into()).unwrap();
    assert_eq!(encoded.data, vec![0]);
}

/// Tests that an unknown label is rejected with the valid choices listed.
#[test]
fn test_on_off_invalid_label() {
    match encode_field(DeviceModel::Prt, "on_off", &"Sideways".into()) {
        Err(HeatmiserError::InvalidFieldValue {
            field,
            value,
            reason,
        }) => {
            assert_eq!(field, "on_off");
            assert_eq!(value, "Sideways");
            assert_eq!(reason, "Valid values: 'Off' or 'On'");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Tests that labels are matched exactly.
#[test]
fn test_labels_are_case_sensitive() {
    assert_invalid(encode_field(DeviceModel::Prt, "on_off", &"on".into()));
    let encoded = encode_field(DeviceModel::Prt, "away_mode", &"on".into()).unwrap();
    assert_eq!(encoded, EncodedField { address: 31, data: vec![1] });
}

/// Tests the remaining label fields.
#[test]
fn test_other_labels() {
    let lock = encode_field(DeviceModel::Dt, "key_lock", &"Lock".into()).unwrap();
    assert_eq!(lock, EncodedField { address: 22, data: vec![1] });

    let run = encode_field(DeviceModel::Prt, "run_mode", &"Frost protection mode".into()).unwrap();
    assert_eq!(run, EncodedField { address: 23, data: vec![1] });

    let hw = encode_field(DeviceModel::PrtHw, "hot_water_state", &"off".into()).unwrap();
    assert_eq!(hw, EncodedField { address: 42, data: vec![2] });
}

/// Tests byte fields given as numbers or numeric text.
#[test]
fn test_byte_fields() {
    let encoded = encode_field(DeviceModel::Prt, "set_room_temp", &21i64.into()).unwrap();
    assert_eq!(encoded, EncodedField { address: 18, data: vec![21] });

    let encoded = encode_field(DeviceModel::Dt, "frost_protect_temperature", &"12".into()).unwrap();
    assert_eq!(encoded, EncodedField { address: 17, data: vec![12] });

    let encoded = encode_field(DeviceModel::PrtE, "floor_max_limit", &255i64.into()).unwrap();
    assert_eq!(encoded.address, 19);
}

/// Tests that byte fields reject values outside 0-255.
#[test]
fn test_byte_field_range() {
    assert_invalid(encode_field(DeviceModel::Prt, "set_room_temp", &256i64.into()));
    assert_invalid(encode_field(DeviceModel::Prt, "set_room_temp", &(-1i64).into()));
    assert_invalid(encode_field(DeviceModel::Prt, "set_room_temp", &"warm".into()));
}

/// Tests that read-only fields cannot be written.
#[test]
fn test_read_only_fields() {
    for name in READ_ONLY_FIELDS {
        let reason = unknown_reason(encode_field(DeviceModel::Prt, name, &1i64.into()));
        assert_eq!(reason, "read-only", "{name}");
    }
}

/// Tests that fields outside the model's capabilities are rejected.
#[test]
fn test_model_capabilities() {
    let reason = unknown_reason(encode_field(
        DeviceModel::Tm1,
        "weekday_triggers",
        &vec![0u8; 12].into(),
    ));
    assert_eq!(reason, "not present on this model");

    assert!(lookup(DeviceModel::Tm1, "away_mode").is_err());
    assert!(lookup(DeviceModel::Tm1, "set_room_temp").is_err());
    assert!(lookup(DeviceModel::Prt, "hot_water_state").is_err());
    assert!(lookup(DeviceModel::Dt, "clock").is_err());
    assert!(lookup(DeviceModel::DtE, "weekday_triggers").is_err());
    assert!(lookup(DeviceModel::Tm1, "weekday_hw_triggers").is_ok());
    assert!(lookup(DeviceModel::PrtHw, "sun_hw_triggers").is_ok());
}

/// Tests that a name nobody knows is reported as such.
#[test]
fn test_no_such_field() {
    let reason = unknown_reason(encode_field(DeviceModel::Prt, "bogus", &1i64.into()));
    assert_eq!(reason, "no such field");
}

/// Tests that a model with an unknown layout accepts only universal fields.
#[test]
fn test_unknown_model_fields() {
    assert!(lookup(DeviceModel::Unknown(9), "on_off").is_ok());
    assert!(lookup(DeviceModel::Unknown(9), "key_lock").is_ok());
    assert!(lookup(DeviceModel::Unknown(9), "set_room_temp").is_err());
}

/// Tests lookups made before the model is known.
#[test]
fn test_lookup_any_model() {
    assert_eq!(lookup_any_model("on_off").unwrap().address, 21);
    assert_eq!(
        lookup_any_model("set_room_temp"),
        Err(HeatmiserError::ReadRequiredFirst {
            field: "set_room_temp".to_string()
        })
    );
    assert!(matches!(
        lookup_any_model("program_mode"),
        Err(HeatmiserError::UnknownField { .. })
    ));
}

/// Tests the write addresses of the schedule groups.
#[test]
fn test_schedule_addresses() {
    let cases = [
        (DeviceModel::Prt, "weekday_triggers", 47),
        (DeviceModel::Prt, "weekend_triggers", 59),
        (DeviceModel::PrtHw, "weekday_hw_triggers", 71),
        (DeviceModel::PrtHw, "weekend_hw_triggers", 87),
        (DeviceModel::Prt, "mon_triggers", 103),
        (DeviceModel::Prt, "sun_triggers", 175),
        (DeviceModel::Tm1, "mon_hw_triggers", 187),
        (DeviceModel::Tm1, "sun_hw_triggers", 283),
    ];
    for (model, name, address) in cases {
        assert_eq!(lookup(model, name).unwrap().address, address, "{name}");
    }
}

/// Tests encoding a heating schedule from raw bytes and from a typed group.
#[test]
fn test_heat_triggers() {
    let encoded =
        encode_field(DeviceModel::Prt, "weekday_triggers", &WEEKDAY_HEAT.to_vec().into()).unwrap();
    assert_eq!(encoded.address, 47);
    assert_eq!(encoded.data, WEEKDAY_HEAT.to_vec());

    let group = TriggerGroup::new([
        HeatTrigger { hour: 7, minute: 0, set_temp: 21 },
        HeatTrigger { hour: 9, minute: 30, set_temp: 16 },
        HeatTrigger { hour: 17, minute: 0, set_temp: 21 },
        HeatTrigger { hour: 22, minute: 0, set_temp: 16 },
    ]);
    let encoded = encode_field(DeviceModel::Prt, "weekday_triggers", &group.into()).unwrap();
    assert_eq!(encoded.data, WEEKDAY_HEAT.to_vec());
}

/// Tests that schedules of the wrong size or with impossible times are rejected.
#[test]
fn test_trigger_validation() {
    assert_invalid(encode_field(DeviceModel::Prt, "weekday_triggers", &vec![0u8; 11].into()));
    assert_invalid(encode_field(DeviceModel::PrtHw, "weekday_hw_triggers", &vec![0u8; 12].into()));

    let mut bad_hour = WEEKDAY_HEAT.to_vec();
    bad_hour[3] = 25;
    assert_invalid(encode_field(DeviceModel::Prt, "weekday_triggers", &bad_hour.into()));

    let mut bad_minute = WEEKDAY_HW.to_vec();
    bad_minute[3] = 60;
    assert_invalid(encode_field(DeviceModel::PrtHw, "weekday_hw_triggers", &bad_minute.into()));

    // Hour 24 marks an unused slot
    let unused = [24u8, 0, 0].repeat(4);
    assert!(encode_field(DeviceModel::Prt, "weekend_triggers", &unused.into()).is_ok());
}

/// Tests that the clock is encoded from a minute offset relative to now.
#[test]
fn test_clock_offsets() {
    let now = fixed_now();
    let encoded = encode_field_at(DeviceModel::Prt, "clock", &0i64.into(), now).unwrap();
    assert_eq!(encoded.address, 43);
    assert_eq!(encoded.data, FIXED_CLOCK.to_vec());

    let encoded = encode_field_at(DeviceModel::Prt, "clock", &90i64.into(), now).unwrap();
    assert_eq!(encoded.data, vec![24, 3, 15, 5, 16, 0, 5]);

    // Crossing midnight moves the date and weekday
    let encoded = encode_field_at(DeviceModel::Tm1, "clock", &(10 * 60i64).into(), now).unwrap();
    assert_eq!(encoded.data, vec![24, 3, 16, 6, 0, 30, 5]);
}

/// Tests the other accepted clock forms.
#[test]
fn test_clock_forms() {
    let now = fixed_now();
    let from_now = encode_field_at(DeviceModel::PrtHw, "clock", &"now".into(), now).unwrap();
    assert_eq!(from_now.data, FIXED_CLOCK.to_vec());

    let from_text = encode_field_at(DeviceModel::PrtHw, "clock", &"-30".into(), now).unwrap();
    assert_eq!(from_text.data, vec![24, 3, 15, 5, 14, 0, 5]);

    let sunday = NaiveDate::from_ymd_opt(2024, 3, 17)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap();
    let absolute =
        encode_field_at(DeviceModel::Prt, "clock", &FieldValue::DateTime(sunday), now).unwrap();
    assert_eq!(absolute.data, vec![24, 3, 17, 7, 8, 0, 0]);
}

/// Tests that clock values outside the encodable range are rejected.
#[test]
fn test_clock_invalid() {
    let now = fixed_now();
    let old = NaiveDate::from_ymd_opt(1999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 0, 0))
        .unwrap();
    assert_invalid(encode_field_at(DeviceModel::Prt, "clock", &FieldValue::DateTime(old), now));
    assert_invalid(encode_field_at(DeviceModel::Prt, "clock", &"yesterday".into(), now));
    assert_invalid(encode_field_at(DeviceModel::Prt, "clock", &i64::MAX.into(), now));
}

/// Tests parsing command-line values by field kind.
#[test]
fn test_parse_field_value() {
    assert_eq!(
        parse_field_value("weekday_triggers", "7,0,21, 9,30,16, 17,0,21, 22,0,16").unwrap(),
        FieldValue::Bytes(WEEKDAY_HEAT.to_vec())
    );
    assert_eq!(
        parse_field_value("mon_hw_triggers", "6 30 8 0").unwrap(),
        FieldValue::Bytes(vec![6, 30, 8, 0])
    );
    assert!(parse_field_value("weekday_triggers", "7,x").is_err());
    assert_eq!(
        parse_field_value("on_off", "On").unwrap(),
        FieldValue::Text("On".to_string())
    );
}
