//! Separable Sobel kernels for image gradients.
//!
//! The horizontal kernel is `smooth(row) · diff(col)`. The vertical kernel is
//! `-diff(row) · smooth(col)`, negated because rows grow downwards while
//! math `y` grows upwards.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientKernel {
    smooth: &'static [f64],
    diff: &'static [f64],
}

impl GradientKernel {
    pub const SOBEL_3: GradientKernel = GradientKernel {
        smooth: &[1.0, 2.0, 1.0],
        diff: &[-1.0, 0.0, 1.0],
    };

    pub const SOBEL_5: GradientKernel = GradientKernel {
        smooth: &[1.0, 4.0, 6.0, 4.0, 1.0],
        diff: &[-1.0, -2.0, 0.0, 2.0, 1.0],
    };

    /// Pixels on each side of the center.
    pub fn order(&self) -> usize {
        self.smooth.len() / 2
    }

    /// Convolves around a center pixel. `sample(dc, dr)` returns the value
    /// at column offset `dc` and row offset `dr`.
    pub fn gradient(&self, mut sample: impl FnMut(isize, isize) -> f64) -> (f64, f64) {
        let order = self.order() as isize;
        let mut gx = 0.0;
        let mut gy = 0.0;
        for (r, (&smooth_r, &diff_r)) in self.smooth.iter().zip(self.diff).enumerate() {
            for (c, (&smooth_c, &diff_c)) in self.smooth.iter().zip(self.diff).enumerate() {
                let value = sample(c as isize - order, r as isize - order);
                gx += value * smooth_r * diff_c;
                gy -= value * diff_r * smooth_c;
            }
        }
        (gx, gy)
    }
}
