//! 单图像会话: 持有一个适配器表、一份流水线配置和 (至多) 一幅已加载的图像.
//!
//! 所有依赖图像的操作在加载之前调用都会返回 [`PipelineError::NotLoaded`].

use crate::adapter::{AdapterRegistry, CustomAdapter};
use crate::config::PipelineConfig;
use crate::data::save::overlay;
use crate::data::{DecodedImage, ImageRecord, PixelBuffer, WindowSettings};
use crate::diag::Diagnostics;
use crate::error::{PipelineError, PipelineResult};
use crate::post_proc::{self, SegmentationResult, TissueSegmenter};
use std::path::{Path, PathBuf};

/// 单图像会话.
///
/// 配置中的窗口、输出格式、融合权重和导出目录分别作为
/// [`Self::windowed`], [`Self::protocol_report`], [`Self::merge_channels`]
/// 和 [`Self::export_overlay`] 的缺省参数.
#[derive(Clone, Debug, Default)]
pub struct Session {
    registry: AdapterRegistry,
    segmenter: TissueSegmenter,
    config: PipelineConfig,
    record: Option<ImageRecord>,
}

impl Session {
    /// 使用内置适配器和默认配置.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用给定的适配器表.
    pub fn with_registry(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// 按配置构建.
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        Ok(Self {
            segmenter: config.segmenter()?,
            config: config.clone(),
            ..Self::default()
        })
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 适配器表.
    #[inline]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// 注册自定义厂商适配器. 排在全部已有适配器之后.
    #[inline]
    pub fn register_adapter(&mut self, adapter: CustomAdapter) {
        self.registry.register_custom(adapter);
    }

    /// 加载一幅图像, 替换之前加载的图像.
    ///
    /// 失败时之前加载的图像保持不变.
    pub fn load(
        &mut self,
        decoded: DecodedImage,
        diag: &dyn Diagnostics,
    ) -> PipelineResult<&ImageRecord> {
        let record = ImageRecord::load(&self.registry, decoded, diag)?;
        Ok(self.record.insert(record))
    }

    /// 当前加载的图像.
    #[inline]
    pub fn record(&self) -> Option<&ImageRecord> {
        self.record.as_ref()
    }

    /// 当前加载的图像, 未加载时返回 [`PipelineError::NotLoaded`].
    #[inline]
    pub fn loaded(&self) -> PipelineResult<&ImageRecord> {
        self.record.as_ref().ok_or(PipelineError::NotLoaded)
    }

    /// 以 `json` / `xml` 输出协议信息.
    pub fn protocol_text(&self, format: &str) -> PipelineResult<String> {
        self.loaded()?.protocol_text(format)
    }

    /// 以配置的格式输出协议信息.
    pub fn protocol_report(&self) -> PipelineResult<String> {
        Ok(self.loaded()?.protocol_as(self.config.format))
    }

    /// 窗宽窗位变换.
    pub fn adjust_window(&self, width: i32, level: i32) -> PipelineResult<PixelBuffer> {
        let record = self.loaded()?;
        Ok(record.windowed(WindowSettings::new(width, level)?))
    }

    /// 以配置的窗口做窗宽窗位变换.
    pub fn windowed(&self) -> PipelineResult<PixelBuffer> {
        Ok(self.loaded()?.windowed(self.config.window))
    }

    /// 将本会话的图像与 `others` 中各会话的图像融合. 本会话的图像为主通道.
    ///
    /// `weights` 为 `None` 时使用配置中的权重; 配置中也没有时等权.
    pub fn merge_channels(
        &self,
        others: &[&Session],
        weights: Option<&[f64]>,
    ) -> PipelineResult<PixelBuffer> {
        let primary = self.loaded()?.pixels();
        let others = others
            .iter()
            .map(|s| s.loaded().map(ImageRecord::pixels))
            .collect::<PipelineResult<Vec<_>>>()?;
        let weights = weights.or(self.config.merge_weights.as_deref());
        post_proc::merge_channels(primary, &others, weights)
    }

    /// 组织分割.
    pub fn segment(&self) -> PipelineResult<SegmentationResult> {
        self.segmenter.segment(self.loaded()?.pixels())
    }

    /// 同 [`Self::segment`], 并输出诊断信息.
    pub fn segment_with(&self, diag: &dyn Diagnostics) -> PipelineResult<SegmentationResult> {
        self.segmenter.segment_with(self.loaded()?.pixels(), diag)
    }

    /// 以配置的窗口分割并生成叠加图.
    #[inline]
    pub fn visualize(&self) -> PipelineResult<image::RgbImage> {
        self.visualize_with(self.config.window)
    }

    /// 分割并生成叠加图 (窗口图像 + 灰质 / 白质掩码).
    pub fn visualize_with(&self, window: WindowSettings) -> PipelineResult<image::RgbImage> {
        let seg = self.segment()?;
        overlay(&self.loaded()?.windowed(window), &seg)
    }

    /// 将叠加图保存到配置的导出目录下的 `file_name`, 返回完整路径.
    ///
    /// 目录不存在时自动创建. 未配置导出目录时返回 [`PipelineError::InvalidParameter`].
    pub fn export_overlay<P: AsRef<Path>>(&self, file_name: P) -> PipelineResult<PathBuf> {
        let img = self.visualize()?;
        let dir = self
            .config
            .export_dir
            .as_ref()
            .ok_or_else(|| PipelineError::invalid("no export directory configured"))?;
        std::fs::create_dir_all(dir).map_err(image::ImageError::from)?;
        let path = dir.join(file_name);
        img.save(&path)?;
        Ok(path)
    }

    /// 当前使用的分割器.
    #[inline]
    pub fn segmenter(&self) -> &TissueSegmenter {
        &self.segmenter
    }
}
