//! 外部解码器交付的 DICOM 元信息与像素矩阵.

use super::PixelBuffer;
use crate::error::PipelineResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 本 crate 关心的 DICOM 字段.
///
/// 除 `manufacturer` 外的所有字段都是可选的. 缺失即为 `None`,
/// 与 "存在但为空字符串" 严格区分.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DicomMetadata {
    /// (0008,0070) Manufacturer.
    pub manufacturer: String,

    /// (0018,0050) Slice Thickness, 毫米.
    pub slice_thickness: Option<f64>,

    /// (0018,0081) Echo Time, 毫秒.
    pub echo_time: Option<f64>,

    /// (0018,0080) Repetition Time, 毫秒.
    pub repetition_time: Option<f64>,

    /// (0018,0024) Sequence Name.
    pub sequence_name: Option<String>,

    /// (0018,1030) Protocol Name.
    pub protocol_name: Option<String>,

    /// (0008,103E) Series Description.
    pub series_description: Option<String>,

    /// (0028,1053) Rescale Slope.
    pub rescale_slope: Option<f64>,

    /// (0028,1052) Rescale Intercept.
    pub rescale_intercept: Option<f64>,
}

impl DicomMetadata {
    /// 仅以厂商字段构建, 其余字段全部缺失.
    pub fn new(manufacturer: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            ..Default::default()
        }
    }

    /// 大写化的厂商字段, 用于适配器匹配.
    #[inline]
    pub fn manufacturer_upper(&self) -> String {
        self.manufacturer.to_uppercase()
    }

    /// 若斜率与截距同时存在, 则返回线性标定.
    #[inline]
    pub fn rescale(&self) -> Option<Rescale> {
        Some(Rescale::new(self.rescale_slope?, self.rescale_intercept?))
    }
}

/// Modality LUT 的线性标定: `slope * x + intercept`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rescale {
    /// 斜率.
    pub slope: f64,

    /// 截距.
    pub intercept: f64,
}

impl Rescale {
    /// 直接初始化.
    #[inline]
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// 对单个存储值做标定.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.slope + self.intercept
    }
}

/// 解码完成的一幅图像: 元信息 + 原始存储像素.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// 元信息.
    pub metadata: DicomMetadata,

    /// 未标定的存储像素.
    pub pixels: PixelBuffer,
}

impl DecodedImage {
    /// 直接初始化.
    #[inline]
    pub fn new(metadata: DicomMetadata, pixels: PixelBuffer) -> Self {
        Self { metadata, pixels }
    }
}

/// 外部 DICOM 解码器. 本 crate 不负责文件格式解析, 只消费其结果.
///
/// 解码失败应返回 [`crate::PipelineError::DecodeFailure`].
pub trait DicomDecoder: Sync {
    /// 解码 `path` 指向的文件.
    fn decode(&self, path: &Path) -> PipelineResult<DecodedImage>;
}
