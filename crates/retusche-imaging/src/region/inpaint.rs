// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-aware inpainting by the fast marching method (Telea, 2004).
//
// Masked pixels are reconstructed in order of their distance from the mask
// boundary. Each pixel becomes a weighted average of already-known pixels
// within `radius`, weighted by direction (alignment with the marching
// front's normal), geometric distance and level-set distance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use image::{GrayImage, Luma};
use retusche_core::Rect;
use tracing::{debug, instrument};

use crate::raster::Image;

/// Neighbourhood radius used by area fill and text deletion.
pub const INPAINT_RADIUS: u32 = 3;

const INF: f32 = 1.0e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Known,
    Band,
    Inside,
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest arrival time.
#[derive(Debug, Clone, Copy)]
struct Front {
    t: f32,
    idx: usize,
}

impl PartialEq for Front {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Front {}

impl PartialOrd for Front {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Front {
    fn cmp(&self, other: &Self) -> Ordering {
        other.t.total_cmp(&self.t).then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Marching state for one image.
struct Marcher {
    width: usize,
    height: usize,
    flags: Vec<Flag>,
    t: Vec<f32>,
    pixels: Vec<[f32; 3]>,
}

impl Marcher {
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn neighbours(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (x, y) = (idx % self.width, idx / self.width);
        let w = self.width;
        let h = self.height;
        [
            (x > 0).then(|| idx - 1),
            (x + 1 < w).then(|| idx + 1),
            (y > 0).then(|| idx - w),
            (y + 1 < h).then(|| idx + w),
        ]
        .into_iter()
        .flatten()
    }

    /// Index of the pixel at offset `(dx, dy)` from `idx`, if inside the image.
    fn offset(&self, idx: usize, dx: isize, dy: isize) -> Option<usize> {
        let x = (idx % self.width) as isize + dx;
        let y = (idx / self.width) as isize + dy;
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return None;
        }
        Some(self.index(x as usize, y as usize))
    }

    /// First-order upwind solution of |grad T| = 1 from two orthogonal
    /// neighbours.
    fn solve(&self, a: Option<usize>, b: Option<usize>) -> f32 {
        let known = |i: Option<usize>| i.filter(|&i| self.flags[i] != Flag::Inside).map(|i| self.t[i]);
        match (known(a), known(b)) {
            (Some(ta), Some(tb)) => {
                let diff = ta - tb;
                let r = (2.0 - diff * diff).max(0.0).sqrt();
                let s = (ta + tb - r) / 2.0;
                if s >= ta && s >= tb {
                    s
                } else {
                    let s = s + r;
                    if s >= ta && s >= tb { s } else { INF }
                }
            }
            (Some(ta), None) => 1.0 + ta,
            (None, Some(tb)) => 1.0 + tb,
            (None, None) => INF,
        }
    }

    fn arrival_time(&self, idx: usize) -> f32 {
        let l = self.offset(idx, -1, 0);
        let r = self.offset(idx, 1, 0);
        let u = self.offset(idx, 0, -1);
        let d = self.offset(idx, 0, 1);
        self.solve(l, u)
            .min(self.solve(r, u))
            .min(self.solve(l, d))
            .min(self.solve(r, d))
    }

    /// Central-difference gradient of T at `idx`, using only non-inside
    /// neighbours.
    fn gradient(&self, idx: usize) -> (f32, f32) {
        let axis = |neg: Option<usize>, pos: Option<usize>| {
            let usable = |i: Option<usize>| i.filter(|&i| self.flags[i] != Flag::Inside);
            match (usable(neg), usable(pos)) {
                (Some(n), Some(p)) => (self.t[p] - self.t[n]) * 0.5,
                (Some(n), None) => self.t[idx] - self.t[n],
                (None, Some(p)) => self.t[p] - self.t[idx],
                (None, None) => 0.0,
            }
        };
        (
            axis(self.offset(idx, -1, 0), self.offset(idx, 1, 0)),
            axis(self.offset(idx, 0, -1), self.offset(idx, 0, 1)),
        )
    }

    /// Reconstruct the colour of `idx` from known pixels within `radius`.
    fn paint(&mut self, idx: usize, radius: i32) {
        let (gx, gy) = self.gradient(idx);
        let gnorm = (gx * gx + gy * gy).sqrt();
        let t_here = self.t[idx];

        let mut acc = [0.0f32; 3];
        let mut total = 0.0f32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let dist2 = (dx * dx + dy * dy) as f32;
                if dist2 > (radius * radius) as f32 {
                    continue;
                }
                let Some(q) = self.offset(idx, dx as isize, dy as isize) else {
                    continue;
                };
                if self.flags[q] == Flag::Inside {
                    continue;
                }
                // Vector from the neighbour to the pixel being filled.
                let (rx, ry) = (-dx as f32, -dy as f32);
                let len = dist2.sqrt();
                let direction = if gnorm > 0.0 {
                    ((rx * gx + ry * gy) / (len * gnorm)).abs().max(1.0e-6)
                } else {
                    1.0
                };
                let distance = 1.0 / dist2;
                let level = 1.0 / (1.0 + (self.t[q] - t_here).abs());
                let w = direction * distance * level;
                for (a, c) in acc.iter_mut().zip(self.pixels[q]) {
                    *a += w * c;
                }
                total += w;
            }
        }
        if total > 0.0 {
            self.pixels[idx] = acc.map(|a| a / total);
        }
    }
}

/// Reconstruct every pixel where `mask` is non-zero from its surroundings.
///
/// `mask` must have the image's dimensions; a mismatched or empty mask, or
/// one that covers the entire image (nothing to sample), returns an
/// unmodified copy.
#[instrument(skip(image, mask), fields(width = image.width(), height = image.height(), radius))]
pub fn inpaint(image: &Image, mask: &GrayImage, radius: u32) -> Image {
    if mask.dimensions() != image.dimensions() {
        debug!("Mask size does not match image; returning unchanged");
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let (width, height) = (w as usize, h as usize);
    let source = image.as_rgb();

    let mut marcher = Marcher {
        width,
        height,
        flags: vec![Flag::Known; width * height],
        t: vec![0.0; width * height],
        pixels: source.pixels().map(|p| p.0.map(f32::from)).collect(),
    };

    let mut masked = 0usize;
    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] != 0 {
            let idx = marcher.index(x as usize, y as usize);
            marcher.flags[idx] = Flag::Inside;
            marcher.t[idx] = INF;
            masked += 1;
        }
    }
    if masked == 0 || masked == width * height {
        debug!(masked, "Nothing to reconstruct; returning unchanged");
        return image.clone();
    }

    // Initial front: known pixels touching the mask.
    let mut heap = BinaryHeap::new();
    for idx in 0..width * height {
        if marcher.flags[idx] == Flag::Known
            && marcher.neighbours(idx).any(|n| marcher.flags[n] == Flag::Inside)
        {
            marcher.flags[idx] = Flag::Band;
            heap.push(Front { t: 0.0, idx });
        }
    }

    let radius = radius.max(1) as i32;
    while let Some(Front { idx, .. }) = heap.pop() {
        if marcher.flags[idx] == Flag::Known {
            continue;
        }
        marcher.flags[idx] = Flag::Known;

        let inside: Vec<usize> = marcher
            .neighbours(idx)
            .filter(|&n| marcher.flags[n] == Flag::Inside)
            .collect();
        for n in inside {
            marcher.t[n] = marcher.arrival_time(n);
            marcher.flags[n] = Flag::Band;
            marcher.paint(n, radius);
            heap.push(Front { t: marcher.t[n], idx: n });
        }
    }

    let mut out = source.clone();
    for (i, px) in out.pixels_mut().enumerate() {
        px.0 = marcher.pixels[i].map(|c| c.round().clamp(0.0, 255.0) as u8);
    }
    debug!(masked, "Inpainting complete");
    Image::from_buffer(out)
}

/// Build a mask from rectangles (clamped to the image) and inpaint it in a
/// single pass.
pub fn inpaint_rects(image: &Image, rects: &[Rect], radius: u32) -> Image {
    let mut mask = GrayImage::new(image.width(), image.height());
    for rect in rects {
        mark(&mut mask, *rect);
    }
    inpaint(image, &mask, radius)
}

/// Set every pixel of `rect` (clamped) in `mask`.
pub(crate) fn mark(mask: &mut GrayImage, rect: Rect) {
    let r = rect.clamp_to(mask.width(), mask.height());
    for y in r.y1..r.y2 {
        for x in r.x1..r.x2 {
            mask.put_pixel(x as u32, y as u32, Luma([255]));
        }
    }
}
