//! Image gradients (Sobel/Scharr) with per-pixel magnitude.
//!
//! Convolves a 3x3 kernel pair with border clamping and emits `gx`, `gy`,
//! and `mag = sqrt(gx^2 + gy^2)`. Rows are independent, so the convolution
//! runs row-parallel. Complexity: O(W*H); memory: three float planes.

use rayon::prelude::*;

use super::page::Plane;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const SCHARR_KERNEL_X: Kernel3 = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_KERNEL_Y: Kernel3 = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];

/// Gradient kernel choice. Scharr has better rotational symmetry; Sobel is
/// the default the thresholding stage is tuned against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKernel {
    #[default]
    Sobel,
    Scharr,
}

/// Per-pixel gradient planes.
#[derive(Clone, Debug)]
pub struct Grad {
    pub gx: Plane,
    pub gy: Plane,
    pub mag: Plane,
}

/// Compute gradients of a luma plane with the chosen kernel.
pub fn image_gradients(l: &Plane, kernel: GradientKernel) -> Grad {
    let (kernel_x, kernel_y) = match kernel {
        GradientKernel::Sobel => (&SOBEL_KERNEL_X, &SOBEL_KERNEL_Y),
        GradientKernel::Scharr => (&SCHARR_KERNEL_X, &SCHARR_KERNEL_Y),
    };

    let w = l.w;
    let h = l.h;
    let mut gx = Plane::new(w, h);
    let mut gy = Plane::new(w, h);
    let mut mag = Plane::new(w, h);

    if w == 0 || h == 0 {
        return Grad { gx, gy, mag };
    }

    gx.data
        .par_chunks_mut(w)
        .zip(gy.data.par_chunks_mut(w))
        .zip(mag.data.par_chunks_mut(w))
        .enumerate()
        .for_each(|(y, ((gx_row, gy_row), mag_row))| {
            let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
            let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
            for x in 0..w {
                let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

                let mut sum_x = 0.0;
                let mut sum_y = 0.0;
                for (ky, src_row) in rows.iter().enumerate() {
                    let kx_row = &kernel_x[ky];
                    let ky_row = &kernel_y[ky];
                    sum_x += src_row[x_idx[0]] * kx_row[0]
                        + src_row[x_idx[1]] * kx_row[1]
                        + src_row[x_idx[2]] * kx_row[2];
                    sum_y += src_row[x_idx[0]] * ky_row[0]
                        + src_row[x_idx[1]] * ky_row[1]
                        + src_row[x_idx[2]] * ky_row[2];
                }

                gx_row[x] = sum_x;
                gy_row[x] = sum_y;
                mag_row[x] = (sum_x * sum_x + sum_y * sum_y).sqrt();
            }
        });

    Grad { gx, gy, mag }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_plane(w: usize, h: usize, split_x: usize) -> Plane {
        let mut p = Plane::new(w, h);
        for y in 0..h {
            for x in 0..w {
                p.set(x, y, if x < split_x { 0.0 } else { 1.0 });
            }
        }
        p
    }

    #[test]
    fn vertical_step_yields_horizontal_gradient() {
        let p = step_plane(16, 8, 8);
        let g = image_gradients(&p, GradientKernel::Sobel);
        // Strongest response straddles the step.
        assert!(g.mag.get(7, 4) > 0.0);
        assert!(g.gx.get(7, 4).abs() > g.gy.get(7, 4).abs());
        // Flat region stays silent.
        assert_eq!(g.mag.get(2, 4), 0.0);
    }

    #[test]
    fn flat_plane_has_zero_gradients() {
        let p = Plane::new(8, 8);
        let g = image_gradients(&p, GradientKernel::Scharr);
        assert!(g.mag.data.iter().all(|&v| v == 0.0));
    }
}
