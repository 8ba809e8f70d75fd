//! Deterministic stroke rasterization.
//!
//! The composite is always regenerated from the original bitmap plus a
//! full stroke replay, never drawn incrementally onto a previous
//! composite. Replaying the same strokes over the same base therefore
//! yields a pixel-identical image every time.

use fieldscope_core::{Point, Stroke};
use image::{Rgba, RgbaImage};

/// Rasterize `base` plus every stroke into a fresh bitmap.
pub fn compose(base: &RgbaImage, strokes: &[Stroke]) -> RgbaImage {
    let mut out = base.clone();
    for stroke in strokes {
        draw_stroke(&mut out, stroke);
    }
    out
}

/// Stamp one polyline onto the bitmap.
pub fn draw_stroke(img: &mut RgbaImage, stroke: &Stroke) {
    for pair in stroke.points.windows(2) {
        draw_segment(img, pair[0], pair[1], stroke.width, stroke.color);
    }
}

/// Thick line segment: step along the segment and stamp a square nib at
/// each step, clipped to the bitmap bounds.
fn draw_segment(img: &mut RgbaImage, from: Point, to: Point, width: f32, color: [u8; 4]) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    // Two steps per pixel of length leaves no gaps at any angle.
    let steps = (len * 2.0).ceil() as i32;
    let half = (width / 2.0).max(0.5) as i32;
    let (w, h) = (img.width() as i32, img.height() as i32);

    for i in 0..=steps {
        let t = i as f32 / steps.max(1) as f32;
        let cx = (from.x + dx * t).round() as i32;
        let cy = (from.y + dy * t).round() as i32;
        for oy in -half..=half {
            for ox in -half..=half {
                let px = cx + ox;
                let py = cy + oy;
                if px >= 0 && px < w && py >= 0 && py < h {
                    img.put_pixel(px as u32, py as u32, Rgba(color));
                }
            }
        }
    }
}
