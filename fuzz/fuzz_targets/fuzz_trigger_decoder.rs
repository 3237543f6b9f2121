//! Fuzz target: `decode_trigger`
//!
//! Drives arbitrary byte sequences into the trigger decoder and asserts
//! that it never panics, only accepts UTF-8 text and answers the same way
//! every time.
//!
//! cargo fuzz run fuzz_trigger_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use vendnode::error::DecodeError;
use vendnode::mqtt::codec::decode_trigger;

fuzz_target!(|data: &[u8]| {
    match decode_trigger(data) {
        Ok(_) => {
            assert!(core::str::from_utf8(data).is_ok(), "accepted non-UTF-8 payload");
        }
        Err(DecodeError::Malformed) | Err(DecodeError::UnrecognizedAction) => {}
    }

    // Decoding is pure: the same input always gives the same answer.
    assert_eq!(decode_trigger(data), decode_trigger(data));
});
