#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(dataset) = hps_distfit::io::read_csv_from_bytes(data, "fuzz") {
        for (species, cover) in dataset.strata() {
            if let Ok(stratum) = dataset.stratum(&species, &cover) {
                let _ = stratum.series(2.0);
            }
        }
    }
});
