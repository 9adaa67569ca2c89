//! Fuzz target: structured frames survive encode then decode
//!
//! Identities shorter than a UUID can collide with header bytes that look
//! like a name length, so only standard-or-longer identities without NUL
//! characters are checked.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use facelink_core::CHANNEL_COUNT;
use facelink_state::AnimationFrame;
use facelink_wire::{decode, encode, STANDARD_IDENTITY_LEN};

#[derive(Debug, Arbitrary)]
struct FrameInput {
    id: String,
    name: String,
    fps: u32,
    denominator: u32,
    frame_number: u32,
    sub_frame: u32,
    values: Vec<f32>,
}

fuzz_target!(|input: FrameInput| {
    let Ok(mut frame) = AnimationFrame::builder()
        .id(input.id)
        .name(input.name)
        .fps(input.fps)
        .denominator(input.denominator)
        .frame_number(input.frame_number)
        .sub_frame(input.sub_frame)
        .build()
    else {
        return;
    };

    if frame.id().len() < STANDARD_IDENTITY_LEN || frame.id().contains('\0') {
        return;
    }

    let mut values = [0.0f32; CHANNEL_COUNT];
    for (slot, v) in values.iter_mut().zip(input.values) {
        *slot = v;
    }
    frame.set_values(values);

    let decoded = decode(&encode(&frame)).expect("encoded frames always decode");
    assert!(decoded.found);
    assert_eq!(decoded.frame.id(), frame.id());
    assert_eq!(decoded.frame.name(), frame.name());
    assert_eq!(decoded.frame.timecode(), frame.timecode());
    for (a, b) in decoded.frame.values().iter().zip(frame.values()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
});
