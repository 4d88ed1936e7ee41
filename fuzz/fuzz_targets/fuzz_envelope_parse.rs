#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(payloads) = invoice_bridge::import::parse_envelope(s) {
            for payload in &payloads {
                let _ = invoice_bridge::import::ExternalInvoiceRecord::from_value(payload);
            }
        }
    }
});
