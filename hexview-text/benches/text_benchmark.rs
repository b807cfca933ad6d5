use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hexview_core::FontMetrics;
use hexview_text::{FontDescription, GlyphAtlas, TextEngine, DEFAULT_FONT_FAMILY};

fn bench_measure_cell(c: &mut Criterion) {
    let mut engine = TextEngine::new();

    c.bench_function("measure_cell_14px", |b| {
        b.iter(|| engine.measure_cell(black_box(14)));
    });
}

fn bench_build_atlas(c: &mut Criterion) {
    let mut engine = TextEngine::new();
    let metrics = engine.measure_cell(14);

    c.bench_function("build_atlas_14px", |b| {
        b.iter(|| engine.build_atlas(black_box(&metrics)));
    });
}

fn bench_atlas_lookup(c: &mut Criterion) {
    let atlas = GlyphAtlas::new(FontMetrics::new(14, 8, 18));
    let line: Vec<char> = (0u8..=255).map(char::from).collect();

    c.bench_function("atlas_lookup_256", |b| {
        b.iter(|| {
            for &ch in &line {
                black_box(atlas.lookup(ch));
            }
        });
    });
}

fn bench_parse_family_chain(c: &mut Criterion) {
    c.bench_function("parse_default_family_chain", |b| {
        b.iter(|| FontDescription::from_css(black_box(DEFAULT_FONT_FAMILY)));
    });
}

criterion_group!(
    benches,
    bench_measure_cell,
    bench_build_atlas,
    bench_atlas_lookup,
    bench_parse_family_chain,
);
criterion_main!(benches);
