//! Fuzz target for COCO compressed RLE strings.
//!
//! Parses arbitrary strings as counts and, when they parse, decodes them
//! against the size the counts add up to.

#![no_main]

use libfuzzer_sys::fuzz_target;
use segexport::mask::rle::{self, Rle};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(parsed) = Rle::from_compressed_str(text, 1, 0) else {
        return;
    };
    let total: u64 = parsed.counts.iter().map(|&c| c as u64).sum();
    if total > 1 << 22 {
        return;
    }

    let column = Rle {
        height: 1,
        width: total as u32,
        counts: parsed.counts,
    };
    if let Ok(mask) = rle::decode(&column) {
        let _ = rle::encode(&mask, column.height, column.width);
    }
});
