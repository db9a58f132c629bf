use criterion::{criterion_group, criterion_main, Criterion};

// Run with:
//    cargo bench

use offprint::export::{FormatFlags, VectorExportRenderer};
use offprint::{GraphicsManager, Handle};

/// A 3D surface of `n` x `n` cells plus a line, viewed at an angle.
fn surface_scene(n: usize) -> (GraphicsManager, Handle) {
    let step = 1.0 / n as f64;
    let grid: Vec<f64> = (0..=n).map(|i| i as f64 * step).collect();
    let zdata: Vec<Vec<f64>> = grid
        .iter()
        .map(|y| {
            grid.iter()
                .map(|x| ((x * 6.0).sin() * (y * 6.0).cos()) * 0.8)
                .collect()
        })
        .collect();
    let json = serde_json::json!({
        "figures": [{
            "position": [0, 0, 640, 480],
            "axes": [{
                "view": [-37.5, 30],
                "children": [
                    { "type": "surface", "xdata": grid.clone(), "ydata": grid, "zdata": zdata },
                    { "type": "line", "xdata": [0, 1], "ydata": [0, 1], "zdata": [-1, 1] },
                    { "type": "text", "position": [0.5, 0.5, 1], "string": "bench" }
                ]
            }]
        }]
    });
    let mut manager = GraphicsManager::new();
    let figures = manager
        .load_json(&json.to_string())
        .expect("failed to load scene");
    (manager, figures[0])
}

fn bench_raster(c: &mut Criterion) {
    let (mut manager, figure) = surface_scene(24);
    c.bench_function("raster_640x480_surface", |b| {
        b.iter(|| {
            offprint::render_image(&mut manager, figure).unwrap();
        })
    });
}

fn bench_depth_sort(c: &mut Criterion) {
    let (manager, figure) = surface_scene(24);
    let renderer = VectorExportRenderer::new("bench", 1e-3);
    let simple = FormatFlags::parse("svgis2D").unwrap();
    let bsp = FormatFlags::parse("svg").unwrap();

    c.bench_function("sort_simple", |b| {
        b.iter(|| renderer.document(&manager, figure, &simple))
    });
    c.bench_function("sort_bsp", |b| {
        b.iter(|| renderer.document(&manager, figure, &bsp))
    });
}

#[cfg(feature = "vector")]
fn bench_svg_export(c: &mut Criterion) {
    let (manager, figure) = surface_scene(24);
    let renderer = VectorExportRenderer::new("bench", 1e-3);
    let flags = FormatFlags::parse("svg").unwrap();
    c.bench_function("svg_export", |b| {
        b.iter(|| {
            let mut sink = Vec::with_capacity(1 << 20);
            renderer.draw(&manager, figure, &mut sink, &flags).unwrap();
            sink
        })
    });
}

#[cfg(not(feature = "vector"))]
fn bench_svg_export(_c: &mut Criterion) {}

criterion_group!(benches, bench_raster, bench_depth_sort, bench_svg_export);
criterion_main!(benches);
