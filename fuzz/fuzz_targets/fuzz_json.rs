#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(dataset) = hps_distfit::io::read_json_from_bytes(data, "fuzz") {
        let _ = dataset.validate();
        let _ = dataset.strata();
    }
});
