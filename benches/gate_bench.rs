//! Draw-gate micro-benchmarks
//!
//! Measures the per-draw cost of `ToggleEngine::on_draw` with a realistic
//! number of known pipelines, with and without enabled groups and an active
//! hunting cursor.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rustc_hash::FxHashSet;
use shader_toggler::{
    CommandContextId, PipelineHandle, PipelineStage, PipelineSubobject, ShaderHash, ShaderStage,
    SubobjectType, ToggleEngine, ToggleSettings,
};

const PIPELINES: u64 = 4096;
const DRAWS: u64 = 1024;
const CTX: CommandContextId = CommandContextId::new(1);

fn populated_engine() -> (ToggleEngine, Vec<ShaderHash>) {
    let engine = ToggleEngine::new(ToggleSettings::default());
    let mut pixel_hashes = Vec::with_capacity(PIPELINES as usize);

    for i in 1..=PIPELINES {
        let vertex = format!("vs {}", i % 64).into_bytes();
        let pixel = format!("ps {i}").into_bytes();
        let subobjects = [
            PipelineSubobject::shader(SubobjectType::VertexShader, &vertex),
            PipelineSubobject::shader(SubobjectType::PixelShader, &pixel),
        ];
        engine.on_pipeline_create(&subobjects);
        engine.on_pipeline_init(&subobjects, PipelineHandle::new(i));
        pixel_hashes.push(ShaderHash::of_code(&pixel));
    }
    (engine, pixel_hashes)
}

fn draw_frame(engine: &ToggleEngine) -> u64 {
    let mut blocked = 0;
    for i in 0..DRAWS {
        let handle = PipelineHandle::new(i * 3 % PIPELINES + 1);
        engine.on_bind_pipeline(CTX, PipelineStage::Vertex, handle);
        engine.on_bind_pipeline(CTX, PipelineStage::Pixel, handle);
        blocked += u64::from(engine.on_draw(black_box(CTX)));
    }
    blocked
}

fn bench_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate");
    group.throughput(Throughput::Elements(DRAWS));

    let (engine, _) = populated_engine();
    group.bench_function("idle", |b| b.iter(|| draw_frame(&engine)));

    let (engine, hashes) = populated_engine();
    let id = engine.add_group("every eighth");
    let members: FxHashSet<_> = hashes.iter().step_by(8).copied().collect();
    engine
        .set_group_hashes(id, ShaderStage::Pixel, members)
        .expect("group exists");
    engine.set_group_enabled(id, true).expect("group exists");
    group.bench_function("enabled_group", |b| b.iter(|| draw_frame(&engine)));

    engine.start_hunting();
    draw_frame(&engine);
    for _ in 0..ToggleSettings::default().collection_frames {
        engine.on_frame_present();
    }
    engine.step_next(ShaderStage::Pixel);
    group.bench_function("group_and_cursor", |b| b.iter(|| draw_frame(&engine)));

    group.finish();
}

criterion_group!(benches, bench_gate);
criterion_main!(benches);
