#![no_main]

use heatmiser_rs::dcb::{decode, decode_with_model, DeviceModel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode(data);

    // Every layout must bounds-check against any DCB length
    for model in DeviceModel::KNOWN {
        let _ = decode_with_model(model, data);
    }
});
