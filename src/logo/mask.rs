use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut},
    rect::Rect,
};

use super::shape::CleanZoneShape;

const OPAQUE: Luma<u8> = Luma([255]);

// Shape mask
//------------------------------------------------------------------------------

/// Renders the clean zone as a mask the size of its bounding box: 255 inside, 0 outside.
pub fn zone_mask(shape: &CleanZoneShape) -> GrayImage {
    let (w, h) = shape.bounds();
    let mut mask = GrayImage::new(w, h);

    match *shape {
        CleanZoneShape::Circle { diameter } => {
            let c = (diameter / 2) as i32;
            draw_filled_circle_mut(&mut mask, (c, c), c, OPAQUE);
        }
        CleanZoneShape::RoundedRect { width, height, corner_radius: r } => {
            // Cross of two rectangles plus a quarter circle in every corner
            if width > 2 * r && height > 0 {
                draw_filled_rect_mut(
                    &mut mask,
                    Rect::at(r as i32, 0).of_size(width - 2 * r, height),
                    OPAQUE,
                );
            }
            if height > 2 * r && width > 0 {
                draw_filled_rect_mut(
                    &mut mask,
                    Rect::at(0, r as i32).of_size(width, height - 2 * r),
                    OPAQUE,
                );
            }
            if r > 0 {
                let (ri, left, top) = (r as i32, r as i32, r as i32);
                let right = width as i32 - 1 - ri;
                let bottom = height as i32 - 1 - ri;
                for center in [(left, top), (right, top), (left, bottom), (right, bottom)] {
                    draw_filled_circle_mut(&mut mask, center, ri, OPAQUE);
                }
            }
        }
    }

    mask
}

// Pixel operations
//------------------------------------------------------------------------------

/// Overwrites every pixel of `canvas` covered by `mask` (placed at `origin`) with `color`.
/// Mask pixels falling outside the canvas are skipped.
pub fn paint_through(
    canvas: &mut RgbaImage,
    mask: &GrayImage,
    origin: (i64, i64),
    color: Rgba<u8>,
) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for (mx, my, m) in mask.enumerate_pixels() {
        if m.0[0] == 0 {
            continue;
        }
        let x = origin.0 + mx as i64;
        let y = origin.1 + my as i64;
        if (0..cw).contains(&x) && (0..ch).contains(&y) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn over(fg: u8, bk: u8, a: u8) -> u8 {
    let a = a as u32;
    ((fg as u32 * a + bk as u32 * (255 - a) + 127) / 255) as u8
}

/// Blends every pixel of `img` over `background`, leaving no transparency behind.
///
/// A translucent background is laid over white first, as the transport does with the rest of
/// the code.
pub fn flatten(img: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    let Rgba([br, bg, bb, ba]) = background;
    let (br, bg, bb) = (over(br, 255, ba), over(bg, 255, ba), over(bb, 255, ba));
    RgbaImage::from_fn(img.width(), img.height(), |x, y| {
        let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
        Rgba([over(r, br, a), over(g, bg, a), over(b, bb, a), 255])
    })
}

#[cfg(test)]
mod mask_tests {
    use image::{Rgba, RgbaImage};

    use super::{flatten, paint_through, zone_mask};
    use crate::logo::shape::CleanZoneShape;

    #[test]
    fn test_circle_mask() {
        let mask = zone_mask(&CleanZoneShape::Circle { diameter: 21 });
        assert_eq!(mask.dimensions(), (21, 21));
        assert_eq!(mask.get_pixel(10, 10).0[0], 255);
        assert_eq!(mask.get_pixel(0, 10).0[0], 255);
        assert_eq!(mask.get_pixel(20, 10).0[0], 255);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(20, 20).0[0], 0);
    }

    #[test]
    fn test_rounded_rect_mask() {
        let shape = CleanZoneShape::RoundedRect { width: 40, height: 20, corner_radius: 6 };
        let mask = zone_mask(&shape);
        assert_eq!(mask.dimensions(), (40, 20));
        // Edges are filled, corners are cut
        assert_eq!(mask.get_pixel(20, 0).0[0], 255);
        assert_eq!(mask.get_pixel(0, 10).0[0], 255);
        assert_eq!(mask.get_pixel(39, 10).0[0], 255);
        assert_eq!(mask.get_pixel(20, 19).0[0], 255);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(39, 0).0[0], 0);
        assert_eq!(mask.get_pixel(0, 19).0[0], 0);
        assert_eq!(mask.get_pixel(39, 19).0[0], 0);
    }

    #[test]
    fn test_square_corner_mask_is_full() {
        let shape = CleanZoneShape::RoundedRect { width: 8, height: 5, corner_radius: 0 };
        let mask = zone_mask(&shape);
        assert!(mask.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_paint_through_clips() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let shape = CleanZoneShape::RoundedRect { width: 4, height: 4, corner_radius: 0 };
        let mask = zone_mask(&shape);
        paint_through(&mut canvas, &mask, (8, -2), Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(9, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(9, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(9, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(7, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_flatten() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 0, Rgba([200, 0, 0, 0]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 128]));
        let flat = flatten(&img, Rgba([255, 255, 255, 255]));
        assert_eq!(flat.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(flat.get_pixel(2, 0), &Rgba([127, 127, 127, 255]));
    }

    #[test]
    fn test_flatten_translucent_background() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 128]));
        // Fully transparent background behaves like white
        let flat = flatten(&img, Rgba([0, 0, 0, 0]));
        assert_eq!(flat.get_pixel(0, 0), &Rgba([255, 127, 127, 255]));
        assert_eq!(flat, flatten(&img, Rgba([255, 255, 255, 255])));

        // Half transparent black background is mid gray
        let flat = flatten(&RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 0])), Rgba([0, 0, 0, 128]));
        assert_eq!(flat.get_pixel(0, 0), &Rgba([127, 127, 127, 255]));
    }
}
