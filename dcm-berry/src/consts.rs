//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 叠加图中掩码所占的通道强度 (`0.5 * 255` 截断).
    pub const HALF: u8 = 0b_0111_1111;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;
}

/// 厂商识别子串. 与大写化后的 `Manufacturer` 字段做包含匹配.
pub mod marker {
    /// 西门子.
    pub const SIEMENS: &str = "SIEMENS";

    /// GE.
    pub const GE: &str = "GE MEDICAL SYSTEMS";

    /// 飞利浦.
    pub const PHILIPS: &str = "PHILIPS";

    /// 联影.
    pub const UNITED_IMAGING: &str = "UNITED IMAGING";
}

/// 协议信息中出现的键.
pub mod key {
    /// 厂商规范名.
    pub const MANUFACTURER: &str = "Manufacturer";

    /// 序列描述.
    pub const SERIES_DESCRIPTION: &str = "SeriesDescription";

    /// 序列名 (仅西门子).
    pub const SEQUENCE_NAME: &str = "SequenceName";

    /// 协议名 (西门子以外的内置厂商).
    pub const PROTOCOL_NAME: &str = "ProtocolName";

    /// 层厚.
    pub const SLICE_THICKNESS: &str = "SliceThickness";

    /// 回波时间.
    pub const ECHO_TIME: &str = "EchoTime";

    /// 重复时间.
    pub const REPETITION_TIME: &str = "RepetitionTime";

    /// 自定义适配器附加的参数.
    pub const CUSTOM_PARAMETER: &str = "CustomParameter";

    /// 带范围参数的取值子键.
    pub const VALUE: &str = "value";

    /// 带范围参数的有效范围子键.
    pub const VALID_RANGE: &str = "valid_range";
}

/// 各参数的固定有效范围文本.
pub mod range {
    /// 层厚.
    pub const SLICE_THICKNESS: &str = "0.1-10 mm";

    /// 回波时间.
    pub const ECHO_TIME: &str = "0-500 ms";

    /// 重复时间.
    pub const REPETITION_TIME: &str = "0-5000 ms";
}

/// Otsu 直方图的 bin 个数.
pub const OTSU_BINS: usize = 256;

/// 组织分割前高斯平滑的默认标准差.
pub const DEFAULT_SIGMA: f64 = 1.0;

/// 高斯核截断倍数, 核半径为 `⌊TRUNCATE * sigma + 0.5⌋`.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;
