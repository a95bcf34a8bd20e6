// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the region transforms: inpainting fill over a
// text-sized hole and strip delete with reflow.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::RgbImage;

use retusche_core::{FillMode, Rect};
use retusche_imaging::{Image, fill, strip_delete};

/// 400x300 diagonal gradient, a cheap stand-in for a photo.
fn synthetic_image() -> Image {
    Image::from_buffer(RgbImage::from_fn(400, 300, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Inpaint a 120x24 hole, roughly one line of body text.
fn bench_inpaint_fill(c: &mut Criterion) {
    let img = synthetic_image();
    let hole = Rect::new(140, 138, 260, 162);
    c.bench_function("fill inpaint (400x300, 120x24 hole)", |b| {
        b.iter(|| black_box(fill(black_box(&img), hole, FillMode::Inpaint)));
    });
}

fn bench_median_fill(c: &mut Criterion) {
    let img = synthetic_image();
    let hole = Rect::new(140, 138, 260, 162);
    c.bench_function("fill median (400x300, 120x24 hole)", |b| {
        b.iter(|| black_box(fill(black_box(&img), hole, FillMode::Median)));
    });
}

fn bench_strip_delete(c: &mut Criterion) {
    let img = synthetic_image();
    let band = Rect::new(0, 100, 400, 140);
    c.bench_function("strip_delete (400x300, 40-row band)", |b| {
        b.iter(|| black_box(strip_delete(black_box(&img), band)));
    });
}

criterion_group!(benches, bench_inpaint_fill, bench_median_fill, bench_strip_delete);
criterion_main!(benches);
