//! Benchmarks for the LiveLink codec

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use facelink_core::BlendshapeChannel;
use facelink_state::AnimationFrame;
use facelink_wire::{locate_identity, LiveLinkDecoder, LiveLinkEncoder};

fn sample_frame() -> AnimationFrame {
    let mut frame = AnimationFrame::builder()
        .name("bench")
        .fps(60)
        .filter_size(1)
        .build()
        .unwrap();
    for (i, channel) in BlendshapeChannel::ALL.iter().enumerate() {
        frame.set(*channel, i as f32 / 61.0);
    }
    frame
}

fn bench_encode(c: &mut Criterion) {
    let frame = sample_frame();

    c.bench_function("livelink_encode", |b| {
        b.iter(|| LiveLinkEncoder::encode(black_box(&frame)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = LiveLinkEncoder::encode(&sample_frame());
    let decoder = LiveLinkDecoder::new();

    c.bench_function("livelink_decode", |b| {
        b.iter(|| {
            let decoded = decoder.decode(black_box(&bytes)).unwrap();
            black_box(decoded)
        })
    });
}

fn bench_locate_short_identity(c: &mut Criterion) {
    // Non-standard identity length forces the boundary scan
    let frame = AnimationFrame::builder()
        .id("$short")
        .name("bench")
        .build()
        .unwrap();
    let bytes = LiveLinkEncoder::encode(&frame);

    c.bench_function("locate_short_identity", |b| {
        b.iter(|| locate_identity(black_box(&bytes)))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_locate_short_identity);
criterion_main!(benches);
