//! Criterion benchmarks for the rendering pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vellum_core::{diff_trees, Rect, VirtualNode};
use vellum_render::{merge_regions, CellBuffer, RenderConfig, Renderer};

fn dashboard(rows: usize, tick: usize) -> VirtualNode {
    VirtualNode::element("column")
        .with_prop("border", true)
        .with_children((0..rows).map(|i| {
            VirtualNode::element("row")
                .with_child(VirtualNode::element("box").with_prop("width", 12).with_child(
                    VirtualNode::text(format!("metric {i}")),
                ))
                .with_child(
                    VirtualNode::element("box")
                        .with_prop("flex-grow", 1)
                        .with_prop("background", if (i + tick) % 3 == 0 { "blue" } else { "black" })
                        .with_child(VirtualNode::text(format!("{}", (i * 37 + tick) % 1000))),
                )
        }))
}

fn quiet() -> RenderConfig {
    RenderConfig {
        verify_display_list: false,
        ..RenderConfig::default()
    }
}

// =============================================================================
// FULL RENDER BENCHMARKS
// =============================================================================

fn bench_render_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_full");
    for (w, h) in [(80u16, 24u16), (200, 60)] {
        let tree = dashboard(usize::from(h) - 2, 0);
        group.throughput(Throughput::Elements(u64::from(w) * u64::from(h)));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &tree, |b, tree| {
            let mut renderer = Renderer::with_config(CellBuffer::new(w, h), quiet());
            b.iter(|| renderer.render_full(black_box(tree.clone())));
        });
    }
    group.finish();
}

// =============================================================================
// INCREMENTAL BENCHMARKS
// =============================================================================

fn bench_single_text_update(c: &mut Criterion) {
    let before = dashboard(22, 0);
    let after = dashboard(22, 0).with_child(VirtualNode::text("status"));
    let patches = diff_trees(&before, &after);

    c.bench_function("apply_patches_one_insert_80x24", |b| {
        let mut renderer = Renderer::with_config(CellBuffer::new(80, 24), quiet());
        b.iter(|| {
            let _ = renderer.render_full(before.clone());
            renderer.apply_patches(black_box(patches.as_slice()))
        });
    });
}

fn bench_update_tick(c: &mut Criterion) {
    let mut renderer = Renderer::with_config(CellBuffer::new(80, 24), quiet());
    let _ = renderer.render_full(dashboard(22, 0));
    let mut tick = 0;

    c.bench_function("update_tick_80x24", |b| {
        b.iter(|| {
            tick += 1;
            renderer.update(black_box(dashboard(22, tick)))
        });
    });
}

fn bench_merge_regions(c: &mut Criterion) {
    let regions: Vec<Rect> = (0..64u16)
        .map(|i| Rect::new((i * 7) % 150, (i * 3) % 50, 4, 2))
        .collect();

    c.bench_function("merge_regions_64", |b| {
        b.iter(|| merge_regions(black_box(&regions)))
    });
}

criterion_group!(
    benches,
    bench_render_full,
    bench_single_text_update,
    bench_update_tick,
    bench_merge_regions
);
criterion_main!(benches);
