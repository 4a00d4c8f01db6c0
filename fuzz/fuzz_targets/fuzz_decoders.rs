#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use pixdim::{ByteSource, ImageFormat, Limits};

// Runs every decoder regardless of signature, under tight walk limits.
fuzz_target!(|data: &[u8]| {
    let limits = Limits::default()
        .with_max_boxes(64)
        .with_max_ifds(16)
        .with_max_segments(256);
    for format in ImageFormat::ALL {
        if let Ok(src) = ByteSource::new(Cursor::new(data)) {
            let mut src = src.with_limits(limits);
            let _ = format.decode(&mut src);
        }
    }
});
