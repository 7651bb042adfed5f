//! Fuzz target: `decode_advertisement`
//!
//! Drives arbitrary advertisement payloads through the AD-structure walk
//! and the manufacturer-data decoder.  Truncated lengths, zero-length
//! fields and out-of-range readings must be rejected without panicking.
//!
//! cargo fuzz run fuzz_adv_decoder

#![no_main]

use fridgemon::adapters::ble_sensor::decode_advertisement;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(Ok(reading)) = decode_advertisement(data) {
        assert!(reading.temperature_f.is_finite(), "non-finite temperature");
        assert!(reading.battery <= 100, "battery above 100%");
    }
});
