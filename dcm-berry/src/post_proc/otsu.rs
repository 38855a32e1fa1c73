//! 三类 Otsu 阈值.

use crate::consts::OTSU_BINS;
use crate::error::{PipelineError, PipelineResult};
use itertools::{Itertools, MinMaxResult};
use ndarray::ArrayView2;

/// 等宽直方图. 区间为数据的 `[min, max]`.
struct Histogram {
    counts: Vec<u64>,
    centers: Vec<f64>,
}

impl Histogram {
    /// 常数图像的区间扩展为 `[v - 0.5, v + 0.5]`.
    fn build(data: ArrayView2<f64>, nbins: usize) -> PipelineResult<Self> {
        let (lo, hi) = match data.iter().copied().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => {
                return Err(PipelineError::invalid("no finite pixel to threshold"))
            }
            MinMaxResult::OneElement(v) => (v - 0.5, v + 0.5),
            MinMaxResult::MinMax(lo, hi) if lo == hi => (lo - 0.5, hi + 0.5),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let width = (hi - lo) / nbins as f64;
        let mut counts = vec![0u64; nbins];
        for v in data.iter().copied().filter(|v| v.is_finite()) {
            // 最大值落入最后一个 bin.
            let idx = (((v - lo) / width) as usize).min(nbins - 1);
            counts[idx] += 1;
        }
        let centers = (0..nbins).map(|i| lo + (i as f64 + 0.5) * width).collect();
        Ok(Self { counts, centers })
    }
}

/// 对 `data` 求两个 Otsu 阈值 `(t0, t1)`, 将像素分为三类. 保证 `t0 < t1`.
///
/// 阈值取自 [`OTSU_BINS`] 个 bin 的中心. 穷举搜索使类间方差最大的一对阈值,
/// 存在并列时取搜索顺序中最先出现者.
///
/// - 非空 bin 少于 3 个时返回 [`PipelineError::InvalidParameter`];
/// - 恰好 3 个时直接取前两个非空 bin 的中心.
pub fn multi_otsu(data: ArrayView2<f64>) -> PipelineResult<(f64, f64)> {
    let hist = Histogram::build(data, OTSU_BINS)?;
    let occupied: Vec<usize> = hist
        .counts
        .iter()
        .positions(|&c| c > 0)
        .take(3)
        .collect();
    let occupied_count = hist.counts.iter().filter(|&&c| c > 0).count();

    let (i0, i1) = match occupied_count {
        0..=2 => {
            return Err(PipelineError::invalid(format!(
                "at least 3 distinct intensity levels are required, found {occupied_count}"
            )))
        }
        3 => (occupied[0], occupied[1]),
        _ => search(&hist.counts),
    };
    Ok((hist.centers[i0], hist.centers[i1]))
}

/// 在累积矩上穷举 `(t0, t1)`, 返回 bin 下标.
fn search(counts: &[u64]) -> (usize, usize) {
    let nbins = counts.len();
    let total: u64 = counts.iter().sum();

    // 以 bin 下标为灰度的零阶、一阶累积矩.
    let mut zeroth = Vec::with_capacity(nbins);
    let mut first = Vec::with_capacity(nbins);
    let (mut m0, mut m1) = (0.0, 0.0);
    for (i, &c) in counts.iter().enumerate() {
        let p = c as f64 / total as f64;
        m0 += p;
        m1 += p * i as f64;
        zeroth.push(m0);
        first.push(m1);
    }

    // bin 区间 [lo, hi] 的 m1² / m0.
    let var = |lo: usize, hi: usize| {
        let (mut w, mut mu) = (zeroth[hi], first[hi]);
        if lo > 0 {
            w -= zeroth[lo - 1];
            mu -= first[lo - 1];
        }
        if w > 0.0 {
            mu * mu / w
        } else {
            0.0
        }
    };

    let mut best = f64::NEG_INFINITY;
    let mut best_idx = (0, 1);
    for t0 in 0..=nbins - 3 {
        for t1 in t0 + 1..=nbins - 2 {
            let sigma = var(0, t0) + var(t0 + 1, t1) + var(t1 + 1, nbins - 1);
            if sigma > best {
                best = sigma;
                best_idx = (t0, t1);
            }
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::multi_otsu;
    use crate::PipelineError;
    use ndarray::Array2;

    fn three_levels(a: f64, b: f64, c: f64) -> Array2<f64> {
        Array2::from_shape_fn((12, 10), |(h, _)| match h / 4 {
            0 => a,
            1 => b,
            _ => c,
        })
    }

    #[test]
    fn test_three_levels_separated() {
        let img = three_levels(0.0, 100.0, 255.0);
        let (t0, t1) = multi_otsu(img.view()).unwrap();
        assert!(t0 < t1);
        // 恰好三个非空 bin: 取前两个 bin 的中心.
        let width = 255.0 / 256.0;
        assert!((t0 - 0.5 * width).abs() < 1e-9);
        assert!((t1 - 100.5 * width).abs() < 1e-9);
        // 各类原始值与阈值的关系: 0 <= t0 < 100 <= t1 < 255.
        assert!(0.0 <= t0 && t0 < 100.0 && 100.0 <= t1 && t1 < 255.0);
    }

    #[test]
    fn test_noisy_clusters() {
        let img = Array2::from_shape_fn((30, 30), |(h, w)| {
            let jitter = ((h * 7 + w * 13) % 9) as f64;
            match h / 10 {
                0 => 10.0 + jitter,
                1 => 128.0 + jitter,
                _ => 240.0 + jitter,
            }
        });
        let (t0, t1) = multi_otsu(img.view()).unwrap();
        assert!(t0 < t1);
        // 阈值为 bin 中心, 可能略低于同一 bin 内的最大值.
        assert!(t0 > 17.0 && t0 < 128.0, "t0 = {t0}");
        assert!(t1 > 135.0 && t1 < 240.0, "t1 = {t1}");
    }

    #[test]
    fn test_degenerate_inputs() {
        let constant = Array2::from_elem((4, 4), 7.0);
        assert!(matches!(
            multi_otsu(constant.view()),
            Err(PipelineError::InvalidParameter(_))
        ));

        let two = Array2::from_shape_fn((4, 4), |(h, _)| if h < 2 { 1.0 } else { 9.0 });
        assert!(multi_otsu(two.view()).is_err());

        let empty = Array2::<f64>::zeros((0, 3));
        assert!(multi_otsu(empty.view()).is_err());
    }
}
