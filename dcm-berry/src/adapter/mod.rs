//! 厂商适配器: 兼容性判定、协议提取与像素标定.
//!
//! 内置厂商是一个封闭集合, 直接以枚举分派. 新厂商通过 [`CustomAdapter`]
//! 注册 (兼容性判定函数 + 提取函数), 无需实现任何 trait.

mod custom;
mod registry;

pub use custom::{CompatFn, CustomAdapter, ExtractFn};
pub use registry::AdapterRegistry;

use crate::consts::{key, marker, range};
use crate::data::{DicomMetadata, PixelBuffer, ProtocolInfo, ProtocolValue};
use serde::{Deserialize, Serialize};

/// 厂商类别.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum VendorKind {
    /// 西门子.
    Siemens,

    /// GE.
    Ge,

    /// 飞利浦.
    Philips,

    /// 联影.
    UnitedImaging,

    /// 自定义厂商, 携带其名称.
    Custom(String),
}

impl VendorKind {
    /// 写入协议信息 `Manufacturer` 字段的规范名.
    pub fn canonical_name(&self) -> &str {
        match self {
            Self::Custom(name) => name,
            _ => self.builtin_name().unwrap_or_default(),
        }
    }

    /// 内置厂商的规范名. 自定义厂商为 `None`.
    fn builtin_name(&self) -> Option<&'static str> {
        match self {
            Self::Siemens => Some("Siemens"),
            Self::Ge => Some("GE"),
            Self::Philips => Some("Philips"),
            Self::UnitedImaging => Some("United Imaging"),
            Self::Custom(_) => None,
        }
    }
}

/// 厂商适配器.
#[derive(Clone, Debug)]
pub enum VendorAdapter {
    /// 西门子.
    Siemens,

    /// GE.
    Ge,

    /// 飞利浦.
    Philips,

    /// 联影.
    UnitedImaging,

    /// 自定义厂商.
    Custom(CustomAdapter),
}

impl VendorAdapter {
    /// 全部内置适配器, 按解析优先级排列.
    pub const BUILTIN: [VendorAdapter; 4] = [
        VendorAdapter::Siemens,
        VendorAdapter::Ge,
        VendorAdapter::Philips,
        VendorAdapter::UnitedImaging,
    ];

    /// 厂商类别.
    pub fn kind(&self) -> VendorKind {
        match self {
            Self::Siemens => VendorKind::Siemens,
            Self::Ge => VendorKind::Ge,
            Self::Philips => VendorKind::Philips,
            Self::UnitedImaging => VendorKind::UnitedImaging,
            Self::Custom(c) => VendorKind::Custom(c.name().to_owned()),
        }
    }

    /// 规范名, 与 [`VendorKind::canonical_name`] 一致.
    pub fn name(&self) -> &str {
        match self {
            Self::Custom(c) => c.name(),
            _ => self.kind().builtin_name().unwrap_or_default(),
        }
    }

    /// 该适配器是否适用于 `meta`.
    ///
    /// 内置厂商: 大写化的 `Manufacturer` 包含固定识别子串.
    pub fn is_compatible(&self, meta: &DicomMetadata) -> bool {
        let m = match self {
            Self::Siemens => marker::SIEMENS,
            Self::Ge => marker::GE,
            Self::Philips => marker::PHILIPS,
            Self::UnitedImaging => marker::UNITED_IMAGING,
            Self::Custom(c) => return c.is_compatible(meta),
        };
        meta.manufacturer_upper().contains(m)
    }

    /// 提取协议信息.
    ///
    /// 顺序为 `Manufacturer`, `SeriesDescription`, 厂商名称字段 (西门子为
    /// `SequenceName`, 其它内置厂商为 `ProtocolName`), 再依次追加
    /// `SliceThickness`, `EchoTime`, `RepetitionTime`. 自定义厂商不带名称字段,
    /// 改为在末尾追加 `CustomParameter`.
    pub fn extract_protocol(&self, meta: &DicomMetadata) -> ProtocolInfo {
        let mut p = ProtocolInfo::new();
        p.insert(key::MANUFACTURER, ProtocolValue::scalar(self.name()));
        p.insert(
            key::SERIES_DESCRIPTION,
            ProtocolValue::scalar(text_or_empty(&meta.series_description)),
        );
        match self {
            Self::Siemens => {
                p.insert(
                    key::SEQUENCE_NAME,
                    ProtocolValue::scalar(text_or_empty(&meta.sequence_name)),
                );
            }
            Self::Ge | Self::Philips | Self::UnitedImaging => {
                p.insert(
                    key::PROTOCOL_NAME,
                    ProtocolValue::scalar(text_or_empty(&meta.protocol_name)),
                );
            }
            Self::Custom(_) => {}
        }
        insert_common_ranges(&mut p, meta);
        if let Self::Custom(c) = self {
            p.insert(key::CUSTOM_PARAMETER, c.custom_parameter(meta));
        }
        p
    }

    /// 像素标定.
    ///
    /// 若元信息同时含有 Rescale Slope 和 Rescale Intercept, 则逐像素计算
    /// `raw * slope + intercept` (以 `f64` 计算, 再截断回原元素类型);
    /// 否则返回原数据的拷贝. 各厂商规则相同.
    pub fn calibrate_pixels(&self, raw: &PixelBuffer, meta: &DicomMetadata) -> PixelBuffer {
        match meta.rescale() {
            Some(r) => raw.map_f64(|v| r.apply(v)),
            None => raw.clone(),
        }
    }
}

/// 三个通用参数, 附带固定有效范围.
fn insert_common_ranges(p: &mut ProtocolInfo, meta: &DicomMetadata) {
    for (name, value, valid_range) in [
        (key::SLICE_THICKNESS, meta.slice_thickness, range::SLICE_THICKNESS),
        (key::ECHO_TIME, meta.echo_time, range::ECHO_TIME),
        (key::REPETITION_TIME, meta.repetition_time, range::REPETITION_TIME),
    ] {
        p.insert(name, ProtocolValue::ranged(number_or_empty(value), valid_range));
    }
}

#[inline]
fn text_or_empty(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or_default()
}

/// 数值字段的文本形式. `f64` 的 `Display` 不带多余的小数位, 如 `5` 和 `2.5`.
#[inline]
fn number_or_empty(field: Option<f64>) -> String {
    field.map(|v| v.to_string()).unwrap_or_default()
}
