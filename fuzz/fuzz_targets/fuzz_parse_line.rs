#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Telemetry exports are text; feed whatever decodes as UTF-8 to the line
    // parser. It must either produce a reading or reject the line - never
    // panic.
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            let _ = fracwatch::ingest::parse_line(line);
        }
    }
});
