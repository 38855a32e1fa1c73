//! 运行时错误.

use crate::Idx2d;
use thiserror::Error;

/// 处理流水线的运行时错误. 所有错误都只影响当前调用 (或当前图像),
/// 不会导致进程退出.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 外部解码器无法将文件解码为元信息 + 像素矩阵. 此处不重试.
    #[error("DICOM decode failure: {0}")]
    DecodeFailure(String),

    /// 没有任何适配器能识别该厂商.
    #[error("no compatible adapter for manufacturer `{manufacturer}`")]
    UnsupportedVendor {
        /// 元信息中的原始 `Manufacturer` 字段.
        manufacturer: String,
    },

    /// 在加载图像之前请求了依赖图像的操作.
    #[error("no image loaded")]
    NotLoaded,

    /// 参与融合的像素缓冲形状不一致.
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        /// 主通道形状 (高, 宽).
        expected: Idx2d,

        /// 第一个不一致的通道形状 (高, 宽).
        found: Idx2d,
    },

    /// 参数非法, 例如非正窗宽, 或权重个数与通道数不符.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// 不支持的协议信息输出格式.
    #[error("unsupported output format `{0}`, use `json` or `xml`")]
    OutputFormatError(String),

    /// 可视化结果写入失败.
    #[error("export error: {0}")]
    Export(#[from] image::ImageError),
}

/// 流水线运行结果.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// 便捷构造 [`PipelineError::InvalidParameter`].
    #[inline]
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
