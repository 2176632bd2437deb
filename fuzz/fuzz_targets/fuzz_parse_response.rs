#![no_main]

use heatmiser_rs::protocol::frame::{build_response, parse_response};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the validator
    let _ = parse_response(data);

    // A well-formed frame around the same bytes must round-trip
    if !data.is_empty() && data.len() < 1000 {
        let frame = build_response(0, data);
        let response = parse_response(&frame).expect("valid frame rejected");
        assert_eq!(response.payload, data);

        // Corrupting the last byte must be caught by the checksum
        let mut corrupted = frame.clone();
        if let Some(last) = corrupted.last_mut() {
            *last = last.wrapping_add(1);
            assert!(parse_response(&corrupted).is_err());
        }
    }
});
