//! 二值形态学操作, 结构元为 3x3 全 1 矩阵.
//!
//! 图像外的像素一律视为背景, 膨胀与腐蚀均如此. 因此闭运算之后,
//! 图像最外一圈像素总是背景.

use crate::Idx2d;
use ndarray::{Array2, ArrayView2};

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

/// 3x3 膨胀: 自身或任一 8-邻居为前景则为前景.
pub fn dilate3x3(src: ArrayView2<bool>) -> Array2<bool> {
    Array2::from_shape_fn(src.raw_dim(), |pos| {
        src[pos]
            || neighbour8(pos)
                .into_iter()
                .any(|p| src.get(p).copied().unwrap_or(false))
    })
}

/// 3x3 腐蚀: 自身与全部 8-邻居均为前景 (且都在图像内) 才为前景.
pub fn erode3x3(src: ArrayView2<bool>) -> Array2<bool> {
    Array2::from_shape_fn(src.raw_dim(), |pos| {
        src[pos]
            && neighbour8(pos)
                .into_iter()
                .all(|p| src.get(p).copied().unwrap_or(false))
    })
}

/// 3x3 闭运算: 先膨胀, 后腐蚀.
pub fn close3x3(src: ArrayView2<bool>) -> Array2<bool> {
    erode3x3(dilate3x3(src).view())
}

#[cfg(test)]
mod tests {
    use super::{close3x3, dilate3x3, erode3x3};
    use ndarray::{array, Array2};

    #[test]
    fn test_dilate_and_erode() {
        let mut src = Array2::from_elem((5, 5), false);
        src[(2, 2)] = true;
        let d = dilate3x3(src.view());
        assert_eq!(d.iter().filter(|&&v| v).count(), 9);
        assert!(d[(1, 1)] && d[(3, 3)] && !d[(0, 0)]);

        let e = erode3x3(d.view());
        assert_eq!(e, src);
    }

    #[test]
    fn test_border_counts_as_background() {
        let all = Array2::from_elem((4, 5), true);
        let e = erode3x3(all.view());
        assert_eq!(
            e,
            array![
                [false, false, false, false, false],
                [false, true, true, true, false],
                [false, true, true, true, false],
                [false, false, false, false, false],
            ]
        );
        // 闭运算同样清空边框.
        assert_eq!(close3x3(all.view()), e);
    }

    #[test]
    fn test_close_fills_hole() {
        let mut src = Array2::from_elem((7, 7), false);
        src.slice_mut(ndarray::s![1..6, 1..6]).fill(true);
        src[(3, 3)] = false;
        let closed = close3x3(src.view());
        assert!(closed[(3, 3)]);
        assert_eq!(closed.iter().filter(|&&v| v).count(), 25);
    }

    #[test]
    fn test_empty_image() {
        let src = Array2::<bool>::from_elem((0, 0), false);
        assert_eq!(close3x3(src.view()).dim(), (0, 0));
    }
}
