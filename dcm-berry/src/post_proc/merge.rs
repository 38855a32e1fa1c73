//! 多通道 (多序列) 加权融合.

use crate::data::PixelBuffer;
use crate::error::{PipelineError, PipelineResult};
use ndarray::Array2;

/// 校验并归一化权重. `n` 为参与融合的缓冲个数.
fn normalized_weights(weights: Option<&[f64]>, n: usize) -> PipelineResult<Vec<f64>> {
    let Some(weights) = weights else {
        return Ok(vec![1.0 / n as f64; n]);
    };
    if weights.len() != n {
        return Err(PipelineError::invalid(format!(
            "expected {n} weights, got {}",
            weights.len()
        )));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(PipelineError::invalid(format!(
            "weights must be finite and non-negative, got {w}"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(PipelineError::invalid("weights sum to zero"));
    }
    Ok(weights.iter().map(|w| w / sum).collect())
}

/// 将 `primary` 与 `others` 加权融合为一个新缓冲.
///
/// - 所有缓冲形状必须与 `primary` 一致, 否则返回 [`PipelineError::DimensionMismatch`];
/// - `weights` 缺省时等权, 给出时长度必须为 `others.len() + 1`, 并按总和归一化;
/// - 以 `f64` 累加, 结果截断为 `primary` 的元素类型.
///
/// 输入均不会被修改.
pub fn merge_channels(
    primary: &PixelBuffer,
    others: &[&PixelBuffer],
    weights: Option<&[f64]>,
) -> PipelineResult<PixelBuffer> {
    let expected = primary.shape();
    if let Some(found) = others.iter().map(|b| b.shape()).find(|&s| s != expected) {
        return Err(PipelineError::DimensionMismatch { expected, found });
    }

    let weights = normalized_weights(weights, others.len() + 1)?;
    let mut acc = Array2::<f64>::zeros(expected);
    for (buf, &w) in std::iter::once(primary).chain(others.iter().copied()).zip(&weights) {
        acc.scaled_add(w, &buf.to_f64());
    }
    Ok(PixelBuffer::from_f64(primary.pixel_type(), acc.view()))
}

#[cfg(test)]
mod tests {
    use super::merge_channels;
    use crate::{PipelineError, PixelBuffer};
    use ndarray::array;

    #[test]
    fn test_merge_identical_is_identity() {
        let a = PixelBuffer::from(array![[10u16, 20], [30, 40]]);
        let b = a.clone();
        assert_eq!(merge_channels(&a, &[&b], None).unwrap(), a);
        assert_eq!(merge_channels(&a, &[], None).unwrap(), a);
    }

    #[test]
    fn test_merge_weighted() {
        let a = PixelBuffer::from(array![[0.0f32, 10.0]]);
        let b = PixelBuffer::from(array![[100.0f32, 20.0]]);
        // [1, 3] 归一化为 [0.25, 0.75].
        let out = merge_channels(&a, &[&b], Some(&[1.0, 3.0])).unwrap();
        assert_eq!(out, PixelBuffer::from(array![[75.0f32, 17.5]]));

        // 截断为主缓冲的类型.
        let a = PixelBuffer::from(array![[1u8, 2]]);
        let b = PixelBuffer::from(array![[2.0f64, 3.0]]);
        let out = merge_channels(&a, &[&b], None).unwrap();
        assert_eq!(out, PixelBuffer::from(array![[1u8, 2]]));
    }

    #[test]
    fn test_merge_dimension_mismatch() {
        let a = PixelBuffer::from(array![[1u16, 2], [3, 4]]);
        let b = PixelBuffer::from(array![[1u16, 2, 3], [4, 5, 6]]);
        let err = merge_channels(&a, &[&b], Some(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DimensionMismatch {
                expected: (2, 2),
                found: (2, 3)
            }
        ));
    }

    #[test]
    fn test_merge_invalid_weights() {
        let a = PixelBuffer::from(array![[1i16]]);
        let b = PixelBuffer::from(array![[2i16]]);
        for w in [
            &[1.0][..],
            &[1.0, 1.0, 1.0][..],
            &[-1.0, 2.0][..],
            &[0.0, 0.0][..],
            &[f64::NAN, 1.0][..],
        ] {
            assert!(
                matches!(
                    merge_channels(&a, &[&b], Some(w)),
                    Err(PipelineError::InvalidParameter(_))
                ),
                "{w:?}"
            );
        }
    }
}
