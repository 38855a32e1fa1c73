//! 脑组织三分类分割 (脑脊液 / 灰质 / 白质).

use super::gaussian::GaussianKernel;
use super::morph::close3x3;
use super::otsu::multi_otsu;
use crate::consts::DEFAULT_SIGMA;
use crate::data::PixelBuffer;
use crate::diag::{Diagnostics, Silent};
use crate::error::PipelineResult;
use crate::Idx2d;
use log::Level;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// 分割结果. 两个掩码形状与输入一致.
///
/// 两个掩码分别做闭运算, 因此允许同一像素同时属于灰质和白质,
/// 也允许某像素两者都不属于. 这里不做任何修正.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResult {
    /// 灰质掩码.
    pub gray_matter: Array2<bool>,

    /// 白质掩码.
    pub white_matter: Array2<bool>,

    /// 分割所用的 Otsu 阈值 `(t0, t1)`.
    pub thresholds: (f64, f64),
}

impl SegmentationResult {
    /// 掩码形状 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.gray_matter.dim()
    }

    /// 同时属于灰质和白质的像素.
    pub fn overlap(&self) -> Array2<bool> {
        Zip::from(&self.gray_matter)
            .and(&self.white_matter)
            .map_collect(|&g, &w| g && w)
    }

    /// 同时属于灰质和白质的像素个数.
    pub fn overlap_count(&self) -> usize {
        Zip::from(&self.gray_matter)
            .and(&self.white_matter)
            .fold(0, |acc, &g, &w| acc + (g && w) as usize)
    }
}

/// 闭运算之前的三分类结果. 三个掩码互不相交且覆盖全部有限像素.
#[derive(Clone, Debug, PartialEq)]
pub struct TissueClasses {
    /// 脑脊液: `v <= t0`.
    pub csf: Array2<bool>,

    /// 灰质: `t0 < v <= t1`.
    pub gray_matter: Array2<bool>,

    /// 白质: `v > t1`.
    pub white_matter: Array2<bool>,

    /// `(t0, t1)`.
    pub thresholds: (f64, f64),
}

/// 组织分割器.
///
/// 流程:
///
/// 1. 转为 `f64` 并做高斯平滑;
/// 2. 三类 Otsu 求阈值 `(t0, t1)`;
/// 3. 按阈值划分脑脊液 / 灰质 / 白质;
/// 4. 灰质与白质掩码分别做 3x3 闭运算.
#[derive(Clone, Debug)]
pub struct TissueSegmenter {
    kernel: GaussianKernel,
}

impl Default for TissueSegmenter {
    fn default() -> Self {
        Self {
            kernel: GaussianKernel::new(DEFAULT_SIGMA).expect("default sigma is valid"),
        }
    }
}

impl TissueSegmenter {
    /// 以平滑标准差 `sigma` 构建. 非正或非有限值返回错误.
    pub fn new(sigma: f64) -> PipelineResult<Self> {
        Ok(Self {
            kernel: GaussianKernel::new(sigma)?,
        })
    }

    /// 平滑标准差.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.kernel.sigma()
    }

    /// 平滑后的 `f64` 图像.
    pub fn smooth(&self, buffer: &PixelBuffer) -> Array2<f64> {
        self.kernel.smooth(buffer.to_f64().view())
    }

    /// 平滑后求 Otsu 阈值.
    pub fn thresholds(&self, buffer: &PixelBuffer) -> PipelineResult<(f64, f64)> {
        multi_otsu(self.smooth(buffer).view())
    }

    /// 平滑、求阈值并划分三类, 不做闭运算.
    ///
    /// 阈值为 bin 中心. 与阈值同处一个 bin 且高于中心的像素划入上一类,
    /// 因此平滑后处在两类交界的像素可能被划入较高的一类.
    pub fn classify(&self, buffer: &PixelBuffer) -> PipelineResult<TissueClasses> {
        let smoothed = self.smooth(buffer);
        let (t0, t1) = multi_otsu(smoothed.view())?;
        Ok(TissueClasses {
            csf: smoothed.mapv(|v| v <= t0),
            gray_matter: smoothed.mapv(|v| t0 < v && v <= t1),
            white_matter: smoothed.mapv(|v| v > t1),
            thresholds: (t0, t1),
        })
    }

    /// 完整分割流程.
    #[inline]
    pub fn segment(&self, buffer: &PixelBuffer) -> PipelineResult<SegmentationResult> {
        self.segment_with(buffer, &Silent)
    }

    /// 同 [`Self::segment`], 并将阈值等信息输出到 `diag`.
    pub fn segment_with(
        &self,
        buffer: &PixelBuffer,
        diag: &dyn Diagnostics,
    ) -> PipelineResult<SegmentationResult> {
        let classes = self.classify(buffer)?;
        let (t0, t1) = classes.thresholds;
        diag.emit(Level::Debug, &format!("otsu thresholds: t0 = {t0}, t1 = {t1}"));

        let result = SegmentationResult {
            gray_matter: close3x3(classes.gray_matter.view()),
            white_matter: close3x3(classes.white_matter.view()),
            thresholds: classes.thresholds,
        };
        let overlap = result.overlap_count();
        if overlap > 0 {
            diag.emit(
                Level::Debug,
                &format!("{overlap} pixels belong to both gray and white matter"),
            );
        }
        Ok(result)
    }
}
