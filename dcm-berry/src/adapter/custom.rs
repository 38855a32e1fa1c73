//! 自定义厂商扩展点.

use crate::data::{DicomMetadata, ProtocolValue};
use std::fmt;

/// 兼容性判定函数.
pub type CompatFn = fn(&DicomMetadata) -> bool;

/// `CustomParameter` 提取函数.
pub type ExtractFn = fn(&DicomMetadata) -> ProtocolValue;

/// 兼容性判定方式.
#[derive(Clone)]
enum Compat {
    /// 大写化 `Manufacturer` 包含该子串 (子串本身按原样比较).
    Marker(String),

    /// 调用方提供的判定函数.
    Predicate(CompatFn),
}

/// 自定义厂商适配器.
///
/// 默认以构造时给出的识别子串判定兼容性, `CustomParameter` 取
/// `{CustomValue, CustomRange}`. 两者均可分别替换.
///
/// ```
/// use dcm_berry::adapter::CustomAdapter;
/// use dcm_berry::{DicomMetadata, ProtocolValue};
///
/// let adapter = CustomAdapter::new("Neusoft", "NEUSOFT")
///     .with_extractor(|m| {
///         ProtocolValue::ranged(m.protocol_name.clone().unwrap_or_default(), "n/a")
///     });
/// assert!(adapter.is_compatible(&DicomMetadata::new("Neusoft Medical")));
/// ```
#[derive(Clone)]
pub struct CustomAdapter {
    name: String,
    compat: Compat,
    extract: Option<ExtractFn>,
}

impl CustomAdapter {
    /// 以厂商名 `name` 和识别子串 `marker` 构建.
    ///
    /// `marker` 会与 **大写化** 的 `Manufacturer` 比较, 因此通常应当传入大写子串.
    pub fn new(name: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compat: Compat::Marker(marker.into()),
            extract: None,
        }
    }

    /// 以厂商名和判定函数构建.
    pub fn with_predicate(name: impl Into<String>, pred: CompatFn) -> Self {
        Self {
            name: name.into(),
            compat: Compat::Predicate(pred),
            extract: None,
        }
    }

    /// 替换 `CustomParameter` 的提取函数.
    #[inline]
    pub fn with_extractor(mut self, extract: ExtractFn) -> Self {
        self.extract = Some(extract);
        self
    }

    /// 厂商名, 同时也是协议信息中的 `Manufacturer`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 该适配器是否适用于 `meta`.
    pub fn is_compatible(&self, meta: &DicomMetadata) -> bool {
        match &self.compat {
            Compat::Marker(m) => meta.manufacturer_upper().contains(m.as_str()),
            Compat::Predicate(pred) => pred(meta),
        }
    }

    /// 提取 `CustomParameter`.
    pub fn custom_parameter(&self, meta: &DicomMetadata) -> ProtocolValue {
        match self.extract {
            Some(f) => f(meta),
            None => ProtocolValue::ranged("CustomValue", "CustomRange"),
        }
    }
}

impl fmt::Debug for CustomAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compat = match &self.compat {
            Compat::Marker(m) => m.as_str(),
            Compat::Predicate(_) => "<predicate>",
        };
        f.debug_struct("CustomAdapter")
            .field("name", &self.name)
            .field("compat", &compat)
            .field("custom_extractor", &self.extract.is_some())
            .finish()
    }
}
