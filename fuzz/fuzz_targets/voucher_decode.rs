#![no_main]

use blind_drop::{decode_voucher, encode_voucher};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to the same bytes.
    if let Ok(v) = decode_voucher(data) {
        let again = encode_voucher(&v).expect("decoded voucher re-encodes");
        assert_eq!(again, data);
    }
});
