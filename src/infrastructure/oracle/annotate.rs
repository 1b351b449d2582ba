//! Frame annotation: box overlay and JPEG re-encoding.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageResult, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::domain::Detection;

/// Overlay colour for detection boxes
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels
const BOX_THICKNESS: i32 = 2;

/// Draw every detection as a rectangle outline. Boxes are clipped to the
/// image; boxes entirely outside it are skipped.
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
    for detection in detections {
        draw_box(image, detection);
    }
}

fn draw_box(image: &mut RgbImage, d: &Detection) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let max_x = i32::try_from(width - 1).unwrap_or(i32::MAX);
    let max_y = i32::try_from(height - 1).unwrap_or(i32::MAX);

    let (left, right) = (d.x1.min(d.x2), d.x1.max(d.x2));
    let (top, bottom) = (d.y1.min(d.y2), d.y1.max(d.y2));
    if right < 0 || bottom < 0 || left > max_x || top > max_y {
        return;
    }

    // Clamped so a box running off the frame keeps its edge on the border.
    let (left, right) = (left.max(0), right.min(max_x));
    let (top, bottom) = (top.max(0), bottom.min(max_y));

    for inset in 0..BOX_THICKNESS {
        let w = right - left + 1 - 2 * inset;
        let h = bottom - top + 1 - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(left + inset, top + inset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}

/// Draw `detections` onto `image` and encode it as JPEG.
pub fn render(mut image: RgbImage, detections: &[Detection], quality: u8) -> ImageResult<Vec<u8>> {
    draw_detections(&mut image, detections);

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(&image)?;
    Ok(buffer)
}
