//! 厂商适配器表: 按注册顺序解析图像所属厂商.

use super::{CustomAdapter, VendorAdapter};
use crate::data::DicomMetadata;
use crate::error::{PipelineError, PipelineResult};

/// 有序适配器表.
///
/// 内置适配器固定排在最前 (西门子, GE, 飞利浦, 联影), 自定义适配器按注册顺序追加.
/// 解析时按顺序扫描, 第一个兼容的适配器胜出, 因此结果是确定的.
///
/// `resolve` 只需共享借用, 可在多线程间并发调用; `register` 需要独占借用.
/// 若要在共享之后继续注册, 请先 `clone` 一份.
#[derive(Clone, Debug)]
pub struct AdapterRegistry {
    adapters: Vec<VendorAdapter>,
}

impl Default for AdapterRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry {
    /// 含全部内置适配器的表.
    pub fn new() -> Self {
        Self {
            adapters: VendorAdapter::BUILTIN.to_vec(),
        }
    }

    /// 空表. 主要用于测试或完全自定义的部署.
    #[inline]
    pub fn empty() -> Self {
        Self { adapters: vec![] }
    }

    /// 在末尾追加适配器. 允许重复注册, 靠前者在解析时优先.
    #[inline]
    pub fn register(&mut self, adapter: VendorAdapter) {
        self.adapters.push(adapter);
    }

    /// [`Self::register`] 的便捷形式.
    #[inline]
    pub fn register_custom(&mut self, adapter: CustomAdapter) {
        self.register(VendorAdapter::Custom(adapter));
    }

    /// 查找第一个兼容 `meta` 的适配器.
    ///
    /// 没有任何适配器兼容时返回 [`PipelineError::UnsupportedVendor`].
    pub fn resolve(&self, meta: &DicomMetadata) -> PipelineResult<&VendorAdapter> {
        self.adapters
            .iter()
            .find(|a| a.is_compatible(meta))
            .ok_or_else(|| PipelineError::UnsupportedVendor {
                manufacturer: meta.manufacturer.clone(),
            })
    }

    /// 适配器个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// 按解析顺序迭代.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &VendorAdapter> {
        self.adapters.iter()
    }
}
