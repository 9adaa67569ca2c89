//! Fuzz target: arbitrary datagrams through the LiveLink decoder
//!
//! The decoder must never panic. A found frame must re-encode to the
//! same bytes when its identity has the standard length.

#![no_main]

use libfuzzer_sys::fuzz_target;

use facelink_core::FacelinkError;
use facelink_wire::{decode, encode, STANDARD_IDENTITY_LEN};

fuzz_target!(|data: &[u8]| {
    match decode(data) {
        Ok(decoded) if decoded.found => {
            let frame = decoded.frame;
            assert!(frame.id().starts_with('$'));
            assert!(frame.fps() > 0);
            if frame.id().len() == STANDARD_IDENTITY_LEN {
                assert_eq!(&encode(&frame)[..], data);
            }
        }
        Ok(_) => {}
        Err(FacelinkError::ChannelCount { actual, .. }) => assert_ne!(actual, 61),
        Err(e) => panic!("unexpected decode error: {e}"),
    }
});
