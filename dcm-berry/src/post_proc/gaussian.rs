//! 可分离的二维高斯平滑.

use crate::consts::GAUSSIAN_TRUNCATE;
use crate::error::{PipelineError, PipelineResult};
use ndarray::{Array2, ArrayView2, Axis};

/// 归一化的一维高斯核.
///
/// - 半径为 `⌊GAUSSIAN_TRUNCATE * sigma + 0.5⌋`;
/// - 权重和为 1.
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    sigma: f64,
    radius: usize,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// 构建高斯核. `sigma` 必须为有限正数.
    pub fn new(sigma: f64) -> PipelineResult<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(PipelineError::invalid(format!(
                "sigma must be positive and finite, got {sigma}"
            )));
        }
        let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
        let sigma2 = sigma * sigma;
        let mut weights: Vec<f64> = (0..=2 * radius)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-0.5 * x * x / sigma2).exp()
            })
            .collect();
        let sum: f64 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);

        Ok(Self {
            sigma,
            radius,
            weights,
        })
    }

    /// 标准差.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// 核半径.
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// 权重, 长度为 `2 * radius + 1`.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// 对图像依次沿高、宽两个方向做卷积.
    ///
    /// 越界位置按半像素对称反射取值 (`d c b a | a b c d | d c b a`).
    pub fn smooth(&self, src: ArrayView2<f64>) -> Array2<f64> {
        let tmp = self.convolve_axis(src, Axis(0));
        self.convolve_axis(tmp.view(), Axis(1))
    }

    fn convolve_axis(&self, src: ArrayView2<f64>, axis: Axis) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros(src.raw_dim());
        let mut line = Vec::with_capacity(src.len_of(axis));
        let r = self.radius as isize;

        for (lane, mut dst) in src.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
            line.clear();
            line.extend(lane.iter().copied());
            let n = line.len();
            for (i, d) in dst.iter_mut().enumerate() {
                *d = self
                    .weights
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * line[reflect(i as isize + k as isize - r, n)])
                    .sum();
            }
        }
        out
    }
}

/// 半像素对称反射, 周期为 `2n`. `n` 必须非零.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n {
        m
    } else {
        2 * n - 1 - m
    }
}

#[cfg(test)]
mod tests {
    use super::{reflect, GaussianKernel};
    use ndarray::Array2;

    #[test]
    fn test_kernel_properties() {
        let k = GaussianKernel::new(1.0).unwrap();
        assert_eq!(k.radius(), 4);
        assert_eq!(k.weights().len(), 9);

        let sum: f64 = k.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        for i in 1..=k.radius() {
            assert_eq!(k.weights()[4 + i], k.weights()[4 - i]);
        }
        assert!(GaussianKernel::new(0.0).is_err());
        assert!(GaussianKernel::new(f64::NAN).is_err());
    }

    #[test]
    fn test_reflect() {
        // d c b a | a b c d | d c b a
        let got: Vec<usize> = (-4..8).map(|i| reflect(i, 4)).collect();
        assert_eq!(got, [3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
        // 单像素宽度的图像.
        assert!((-5..5).all(|i| reflect(i, 1) == 0));
    }

    #[test]
    fn test_constant_image_unchanged() {
        let k = GaussianKernel::new(1.0).unwrap();
        let img = Array2::from_elem((3, 7), 42.0);
        let out = k.smooth(img.view());
        assert!(out.iter().all(|v| (v - 42.0).abs() < 1e-9));
    }

    #[test]
    fn test_impulse_spreads_and_preserves_mass() {
        let k = GaussianKernel::new(1.0).unwrap();
        let mut img = Array2::<f64>::zeros((21, 21));
        img[(10, 10)] = 1.0;
        let out = k.smooth(img.view());
        assert!((out.sum() - 1.0).abs() < 1e-9);
        assert!(out[(10, 10)] > out[(10, 11)]);
        assert!((out[(10, 11)] - out[(11, 10)]).abs() < 1e-12);
        assert!((out[(10, 10)] - k.weights()[4].powi(2)).abs() < 1e-12);
    }
}
