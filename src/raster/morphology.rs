//! Binary morphology with a 3x3 structuring element.
//!
//! Closing (dilate then erode) bridges the one- or two-pixel gaps that
//! anti-aliasing leaves in rendered label outlines. Out-of-bounds neighbors
//! count as background for both operators.

/// Binary mask, row-major, 0 = background / 1 = foreground.
#[derive(Clone, Debug)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl Mask {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.w + x] = v;
    }
}

/// One dilation pass: a pixel turns on if any 3x3 neighbor is on.
pub fn dilate(mask: &Mask) -> Mask {
    let w = mask.w as isize;
    let h = mask.h as isize;
    let mut out = Mask::new(mask.w, mask.h);
    for y in 0..h {
        for x in 0..w {
            let mut v = 0u8;
            'probe: for dy in -1..=1 {
                for dx in -1..=1 {
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx >= 0 && nx < w && ny >= 0 && ny < h {
                        if mask.get(nx as usize, ny as usize) != 0 {
                            v = 1;
                            break 'probe;
                        }
                    }
                }
            }
            out.set(x as usize, y as usize, v);
        }
    }
    out
}

/// One erosion pass: a pixel survives only if all 3x3 neighbors are on.
/// Out-of-bounds neighbors are background, so the outer frame erodes.
pub fn erode(mask: &Mask) -> Mask {
    let w = mask.w as isize;
    let h = mask.h as isize;
    let mut out = Mask::new(mask.w, mask.h);
    for y in 0..h {
        for x in 0..w {
            let mut v = 1u8;
            'probe: for dy in -1..=1 {
                for dx in -1..=1 {
                    let nx = x + dx;
                    let ny = y + dy;
                    let on = nx >= 0
                        && nx < w
                        && ny >= 0
                        && ny < h
                        && mask.get(nx as usize, ny as usize) != 0;
                    if !on {
                        v = 0;
                        break 'probe;
                    }
                }
            }
            out.set(x as usize, y as usize, v);
        }
    }
    out
}

/// Morphological closing: `iterations` dilations followed by the same
/// number of erosions.
pub fn close(mask: &Mask, iterations: usize) -> Mask {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = dilate(&current);
    }
    for _ in 0..iterations {
        current = erode(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&[u8]]) -> Mask {
        let h = rows.len();
        let w = rows[0].len();
        let mut m = Mask::new(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                m.set(x, y, v);
            }
        }
        m
    }

    #[test]
    fn closing_bridges_single_pixel_gap() {
        let m = mask_from(&[
            &[0, 0, 0, 0, 0, 0, 0],
            &[0, 1, 1, 0, 1, 1, 0],
            &[0, 0, 0, 0, 0, 0, 0],
        ]);
        let closed = close(&m, 1);
        assert_eq!(closed.get(3, 1), 1, "gap should be bridged");
    }

    #[test]
    fn erode_removes_isolated_pixel() {
        let m = mask_from(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let eroded = erode(&m);
        assert!(eroded.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn dilate_grows_by_one_ring() {
        let m = mask_from(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let dilated = dilate(&m);
        assert!(dilated.data.iter().all(|&v| v == 1));
    }
}
