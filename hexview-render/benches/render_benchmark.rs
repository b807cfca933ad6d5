//! Benchmarks for hexview-render instance generation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hexview_core::{EngineConfig, FontMetrics, PointerEvent, PointerPhase, Viewport, WheelEvent};
use hexview_layout::ViewState;
use hexview_render::InstanceStream;
use hexview_text::GlyphAtlas;
use std::hint::black_box;

fn view(width: f64, height: f64, bytes: usize) -> ViewState {
    let metrics = FontMetrics::new(14, 9, 17);
    let mut view = ViewState::new(EngineConfig::default(), Viewport::new(width, height, 1.0), metrics);
    view.replace_data((0..bytes).map(|i| (i * 31 % 256) as u8).collect());
    view
}

/// Benchmark: one frame's instance list at common window sizes
fn bench_stream_build(c: &mut Criterion) {
    let atlas = GlyphAtlas::new(FontMetrics::new(14, 9, 17));
    let mut group = c.benchmark_group("stream_build");
    for &(w, h) in &[(800.0, 600.0), (1920.0, 1080.0), (3840.0, 2160.0)] {
        let v = view(w, h, 1 << 20);
        let mut stream = InstanceStream::new();
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &v, |b, v| {
            b.iter(|| black_box(stream.build(black_box(v), &atlas).len()));
        });
    }
    group.finish();
}

/// Benchmark: stream build with a screen-sized selection and mid-file scroll
fn bench_stream_selected(c: &mut Criterion) {
    let atlas = GlyphAtlas::new(FontMetrics::new(14, 9, 17));
    let mut v = view(1920.0, 1080.0, 1 << 20);
    v.wheel(&WheelEvent {
        delta_y: 250_000.0,
        ..Default::default()
    });
    v.pointer(&PointerEvent::new(PointerPhase::Down, 100.0, 5.0));
    v.pointer(&PointerEvent::new(PointerPhase::Move, 1500.0, 1000.0));
    v.pointer(&PointerEvent::new(PointerPhase::Up, 1500.0, 1000.0));

    let mut stream = InstanceStream::new();
    c.bench_function("stream_build_selected_1080p", |b| {
        b.iter(|| black_box(stream.build(black_box(&v), &atlas).len()));
    });
}

criterion_group!(benches, bench_stream_build, bench_stream_selected);
criterion_main!(benches);
