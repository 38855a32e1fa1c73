#![warn(missing_docs)]

//! 多厂商 MR 图像处理核心库. 提供厂商适配、协议信息提取、像素标定、
//! 窗宽窗位、多序列融合和脑组织 (脑脊液 / 灰质 / 白质) 分割.
//!
//! 本 crate 不解析 DICOM 文件本身, 而是消费外部解码器 ([`DicomDecoder`])
//! 给出的元信息与像素矩阵.
//!
//! # 注意
//!
//! 1. 所有变换都返回新的数据, 不会修改输入.
//! 2. 错误只影响当前调用 (批处理时只影响当前图像), 不会 panic.
//! 3. 诊断信息通过显式传入的 [`Diagnostics`] 输出, 日志后端由上层应用初始化.
//!
//! # 开发计划
//!
//! ### 厂商适配 ✅
//!
//! 西门子、GE、飞利浦、联影四个内置厂商, 以及基于识别子串或判定函数的自定义厂商.
//! 适配器按注册顺序解析, 内置厂商优先.
//!
//! 实现位于 `dcm-berry/src/adapter`.
//!
//! ### 协议信息 JSON / XML 输出 ✅
//!
//! 保持插入顺序. 层厚、回波时间、重复时间附带固定的有效范围.
//!
//! 实现位于 `dcm-berry/src/data/protocol.rs`.
//!
//! ### 窗宽窗位 ✅
//!
//! 提供一个独立的窗口对象, 以便将标定后的像素值转换为 8-bit 灰度值.
//!
//! 实现位于 `dcm-berry/src/data/window.rs`.
//!
//! ### 多序列加权融合 ✅
//!
//! 实现位于 `dcm-berry/src/post_proc/merge.rs`.
//!
//! ### 脑组织分割 ✅
//!
//! 高斯平滑 + 三类 Otsu + 3x3 闭运算.
//!
//! 实现位于 `dcm-berry/src/post_proc/segment.rs`.
//!
//! ### 批处理 ✅
//!
//! 借助 `rayon` 在图像之间并行.
//!
//! 实现位于 `dcm-berry/src/batch.rs`.
//!
//! ### 可视化 ✅
//!
//! 叠加图 (R: 灰度, G: 灰质, B: 白质) 与 PNG 导出.
//!
//! 实现位于 `dcm-berry/src/data/save.rs`.

/// 二维索引 (高, 宽), 同时也用作图像形状.
pub type Idx2d = (usize, usize);

mod data;
mod error;

pub use data::{
    apply_window, DecodedImage, DicomDecoder, DicomMetadata, ImageRecord, ImgWriteRaw,
    ImgWriteVis, OutputFormat, PixelBuffer, PixelType, ProtocolInfo, ProtocolValue, Rescale,
    WindowSettings,
};

pub use data::{save, window};

pub use error::{PipelineError, PipelineResult};

pub use diag::Diagnostics;

pub mod adapter;
pub mod batch;
pub mod config;
pub mod consts;
pub mod diag;
pub mod post_proc;
pub mod prelude;
pub mod session;
