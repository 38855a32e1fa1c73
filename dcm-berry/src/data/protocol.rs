//! 统一的扫描协议描述, 及其 JSON / XML 文本输出.

use crate::consts::key;
use crate::error::{PipelineError, PipelineResult};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

/// 协议参数值: 单个文本, 或带有效范围的取值.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolValue {
    /// 纯文本参数.
    Scalar(String),

    /// `{value, valid_range}` 参数.
    Ranged {
        /// 取值. 元信息缺失时为空字符串.
        value: String,

        /// 有效范围描述, 如 `0.1-10 mm`.
        valid_range: String,
    },
}

impl ProtocolValue {
    /// 构造纯文本参数.
    #[inline]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// 构造带范围参数.
    #[inline]
    pub fn ranged(value: impl Into<String>, valid_range: impl Into<String>) -> Self {
        Self::Ranged {
            value: value.into(),
            valid_range: valid_range.into(),
        }
    }

    /// 参数取值.
    #[inline]
    pub fn value(&self) -> &str {
        match self {
            Self::Scalar(v) | Self::Ranged { value: v, .. } => v,
        }
    }
}

impl Serialize for ProtocolValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(v) => serializer.serialize_str(v),
            Self::Ranged { value, valid_range } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(key::VALUE, value)?;
                map.serialize_entry(key::VALID_RANGE, valid_range)?;
                map.end()
            }
        }
    }
}

/// 协议信息输出格式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 4 空格缩进的 JSON.
    #[default]
    Json,

    /// 带固定声明头的 XML.
    Xml,
}

impl FromStr for OutputFormat {
    type Err = PipelineError;

    /// 大小写不敏感.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(PipelineError::OutputFormatError(s.to_owned())),
        }
    }
}

/// 按插入顺序保存的协议参数表.
///
/// 重复插入同名键时原位替换其值, 不改变顺序.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolInfo {
    entries: Vec<(String, ProtocolValue)>,
}

impl ProtocolInfo {
    /// 空表.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入参数. 若键已存在则原位替换并返回旧值.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: ProtocolValue,
    ) -> Option<ProtocolValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// 获取参数.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&ProtocolValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// 是否含有该参数.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 参数个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序迭代全部 `(键, 值)`.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &ProtocolValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 按插入顺序迭代全部键.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// 以 `format` 指定的格式 (`json` 或 `xml`, 大小写不敏感) 输出.
    ///
    /// 格式不受支持时返回 [`PipelineError::OutputFormatError`], 自身不变.
    pub fn render(&self, format: &str) -> PipelineResult<String> {
        Ok(self.render_as(format.parse()?))
    }

    /// 以给定格式输出.
    pub fn render_as(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Xml => self.to_xml(),
        }
    }

    /// 4 空格缩进、保持插入顺序的 JSON.
    pub fn to_json(&self) -> String {
        let mut buf = Vec::with_capacity(64 * self.len());
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        // 写入 `Vec` 且全部键为字符串, 不会失败.
        self.serialize(&mut ser).expect("Serialization error");
        String::from_utf8(buf).expect("serde_json emits UTF-8")
    }

    /// 以 `<Protocol>` 为根的 XML. 带范围参数展开为一层子元素.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Protocol>\n");
        // 写入 `String` 不会失败.
        for (k, v) in self.iter() {
            match v {
                ProtocolValue::Scalar(text) => {
                    let _ = writeln!(xml, "  <{k}>{}</{k}>", escape(text));
                }
                ProtocolValue::Ranged { value, valid_range } => {
                    let _ = writeln!(xml, "  <{k}>");
                    let _ = writeln!(xml, "    <{0}>{1}</{0}>", key::VALUE, escape(value));
                    let _ = writeln!(
                        xml,
                        "    <{0}>{1}</{0}>",
                        key::VALID_RANGE,
                        escape(valid_range)
                    );
                    let _ = writeln!(xml, "  </{k}>");
                }
            }
        }
        xml.push_str("</Protocol>");
        xml
    }
}

impl Serialize for ProtocolInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// 转义 XML 文本内容中的 `&`, `<`, `>`.
fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains(&['&', '<', '>'][..]) {
        return text.into();
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out.into()
}
