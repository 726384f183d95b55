//! Synthetic rendered pages: white background, dark shape outlines.

/// Blank (white) 8-bit grayscale page buffer.
pub fn blank_page(width: usize, height: usize) -> Vec<u8> {
    vec![255u8; width * height]
}

/// Draw an axis-aligned rectangle outline with the given stroke thickness.
pub fn draw_rect_outline(
    buf: &mut [u8],
    page_w: usize,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    thickness: usize,
) {
    for t in 0..thickness {
        for x in x0..=x1 {
            buf[(y0 + t) * page_w + x] = 0;
            buf[(y1 - t) * page_w + x] = 0;
        }
        for y in y0..=y1 {
            buf[y * page_w + x0 + t] = 0;
            buf[y * page_w + x1 - t] = 0;
        }
    }
}

/// Draw a circle outline: pixels whose distance to the center is within
/// `thickness / 2` of the radius.
pub fn draw_circle_outline(
    buf: &mut [u8],
    page_w: usize,
    cx: f64,
    cy: f64,
    radius: f64,
    thickness: f64,
) {
    let r_out = radius + thickness / 2.0;
    let r_in = radius - thickness / 2.0;
    let x_min = (cx - r_out).floor().max(0.0) as usize;
    let x_max = (cx + r_out).ceil() as usize;
    let y_min = (cy - r_out).floor().max(0.0) as usize;
    let y_max = (cy + r_out).ceil() as usize;
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d >= r_in && d <= r_out {
                buf[y * page_w + x] = 0;
            }
        }
    }
}
