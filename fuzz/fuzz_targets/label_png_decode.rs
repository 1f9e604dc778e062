//! Fuzz target for label PNG decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use segexport::packing::png::decode_label_png;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = decode_label_png(data);
});
