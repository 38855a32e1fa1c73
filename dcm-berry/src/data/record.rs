//! 已加载的图像记录.

use super::{DecodedImage, DicomMetadata, OutputFormat, PixelBuffer, ProtocolInfo, WindowSettings};
use crate::adapter::{AdapterRegistry, VendorKind};
use crate::diag::Diagnostics;
use crate::error::PipelineResult;
use crate::Idx2d;
use log::Level;
use serde::Serialize;

/// 一幅已加载的图像: 元信息、厂商、协议信息与标定后的像素.
///
/// 加载完成后不可修改. 窗口、融合、分割等操作都返回新的数据.
#[derive(Clone, Debug, Serialize)]
pub struct ImageRecord {
    metadata: DicomMetadata,
    vendor: VendorKind,
    protocol: ProtocolInfo,
    pixels: PixelBuffer,
}

impl ImageRecord {
    /// 由解码结果构建.
    ///
    /// 依次完成厂商解析、协议提取和像素标定. 任何一步失败都不会产生部分结果.
    pub fn load(
        registry: &AdapterRegistry,
        decoded: DecodedImage,
        diag: &dyn Diagnostics,
    ) -> PipelineResult<Self> {
        let DecodedImage { metadata, pixels } = decoded;
        let adapter = match registry.resolve(&metadata) {
            Ok(a) => a,
            Err(e) => {
                diag.emit(Level::Warn, &e.to_string());
                return Err(e);
            }
        };
        let protocol = adapter.extract_protocol(&metadata);
        let pixels = adapter.calibrate_pixels(&pixels, &metadata);

        let (h, w) = pixels.shape();
        diag.emit(
            Level::Info,
            &format!(
                "loaded {} image, {h}x{w} {:?}, rescaled: {}",
                adapter.name(),
                pixels.pixel_type(),
                metadata.rescale().is_some()
            ),
        );

        Ok(Self {
            vendor: adapter.kind(),
            metadata,
            protocol,
            pixels,
        })
    }

    /// 原始元信息.
    #[inline]
    pub fn metadata(&self) -> &DicomMetadata {
        &self.metadata
    }

    /// 解析得到的厂商.
    #[inline]
    pub fn vendor(&self) -> &VendorKind {
        &self.vendor
    }

    /// 协议信息.
    #[inline]
    pub fn protocol(&self) -> &ProtocolInfo {
        &self.protocol
    }

    /// 标定后的像素.
    #[inline]
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.pixels.shape()
    }

    /// 以 `format` (`json` / `xml`, 不区分大小写) 渲染协议信息.
    #[inline]
    pub fn protocol_text(&self, format: &str) -> PipelineResult<String> {
        self.protocol.render(format)
    }

    /// 以给定格式渲染协议信息.
    #[inline]
    pub fn protocol_as(&self, format: OutputFormat) -> String {
        self.protocol.render_as(format)
    }

    /// 窗宽窗位变换后的 `u8` 图像.
    #[inline]
    pub fn windowed(&self, window: WindowSettings) -> PixelBuffer {
        window.apply(&self.pixels)
    }
}
