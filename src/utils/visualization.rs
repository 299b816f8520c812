//! Text overlays for inspecting results.

use ab_glyph::{Font, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

/// Draws `text` at `target = (x, y)` in white with a black drop shadow offset by
/// one pixel, so the label stays readable on any background.
pub fn draw_str(dst: &mut RgbImage, target: (i32, i32), text: &str, font: &impl Font, scale: f32) {
    let (x, y) = target;
    let scale = PxScale::from(scale);
    draw_text_mut(dst, Rgb([0, 0, 0]), x + 1, y + 1, scale, font, text);
    draw_text_mut(dst, Rgb([255, 255, 255]), x, y, scale, font, text);
}
