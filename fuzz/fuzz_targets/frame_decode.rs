//! Fuzz target for SLIP unframing and frame-body decoding.
//!
//! Feeds arbitrary bytes through the incremental SLIP reader exactly as a
//! transport would, byte by byte, then attempts to decode whatever body
//! falls out. Should never panic: malformed input is always an `Err`.

#![no_main]

use dualmcu_proto::{slip, Frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = slip::Reader::new();
    for &byte in data {
        if let Some(escaped) = reader.push(byte) {
            if let Ok(body) = slip::unstuff_and_verify(&escaped) {
                let _ = Frame::decode_body(&body);
            }
        }
    }
});
