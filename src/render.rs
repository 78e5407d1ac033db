use image::{Rgba, RgbaImage};

use crate::carousel::Slot;

/// Background fill behind and between the covers.
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Paint the triptych into `surface` at the given scroll offset. Slot `i`
/// spans `[i*width, (i+1)*width)`; only spans intersecting the visible
/// window `[scroll_x, scroll_x + width)` are drawn, each cover centered
/// within its span.
pub fn compose(
    slots: &[Slot; 3],
    scroll_x: f32,
    width: u32,
    height: u32,
    surface: &mut RgbaImage,
) {
    for pixel in surface.pixels_mut() {
        *pixel = BACKGROUND;
    }
    if width == 0 || height == 0 {
        return;
    }

    let scroll = scroll_x.round() as i64;
    let width = i64::from(width);
    let height = i64::from(height);

    for (i, slot) in slots.iter().enumerate() {
        let Some(cover) = slot.cover() else { continue };
        let span_x = i as i64 * width;
        if span_x >= scroll + width || span_x + width <= scroll {
            continue;
        }
        let x = span_x - scroll + (width - i64::from(cover.width())) / 2;
        let y = (height - i64::from(cover.height())) / 2;
        image::imageops::replace(surface, cover.as_ref(), x, y);
    }
}
