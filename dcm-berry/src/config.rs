//! 流水线配置.
//!
//! 配置来源依次为: 内置默认值, JSON 文本, 环境变量. 环境变量只覆盖其给出的字段.

use crate::consts::DEFAULT_SIGMA;
use crate::data::{OutputFormat, WindowSettings};
use crate::error::{PipelineError, PipelineResult};
use crate::post_proc::TissueSegmenter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 窗宽.
pub const ENV_WINDOW_WIDTH: &str = "DCM_BERRY_WINDOW_WIDTH";

/// 窗位.
pub const ENV_WINDOW_LEVEL: &str = "DCM_BERRY_WINDOW_LEVEL";

/// 高斯平滑标准差.
pub const ENV_SIGMA: &str = "DCM_BERRY_SIGMA";

/// 协议信息输出格式.
pub const ENV_FORMAT: &str = "DCM_BERRY_FORMAT";

/// 可视化结果输出目录.
pub const ENV_EXPORT_DIR: &str = "DCM_BERRY_EXPORT_DIR";

/// 获取 `{用户主目录}/dcm-berry` 目录.
pub fn home_export_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dcm-berry");
    Some(ans)
}

/// 流水线配置.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 可视化窗口.
    pub window: WindowSettings,

    /// 分割前高斯平滑的标准差.
    pub sigma: f64,

    /// 多通道融合权重. `None` 表示等权.
    pub merge_weights: Option<Vec<f64>>,

    /// 协议信息输出格式.
    pub format: OutputFormat,

    /// 可视化结果输出目录. 无法确定用户主目录时为 `None`.
    pub export_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::soft_tissue(),
            sigma: DEFAULT_SIGMA,
            merge_weights: None,
            format: OutputFormat::Json,
            export_dir: home_export_dir(),
        }
    }
}

impl PipelineConfig {
    /// 默认配置叠加环境变量.
    pub fn from_env() -> PipelineResult<Self> {
        Self::default().with_lookup(|k| std::env::var(k).ok())
    }

    /// 解析 JSON 配置. 缺省字段取默认值.
    pub fn from_json(text: &str) -> PipelineResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| PipelineError::invalid(format!("bad config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 以 `lookup` 查询各环境变量并覆盖对应字段.
    pub fn with_lookup<F>(mut self, lookup: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let width = parse_var(&lookup, ENV_WINDOW_WIDTH)?.unwrap_or(self.window.width());
        let level = parse_var(&lookup, ENV_WINDOW_LEVEL)?.unwrap_or(self.window.level());
        self.window = WindowSettings::new(width, level)?;

        if let Some(sigma) = parse_var(&lookup, ENV_SIGMA)? {
            self.sigma = sigma;
        }
        if let Some(format) = parse_var(&lookup, ENV_FORMAT)? {
            self.format = format;
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            self.export_dir = Some(PathBuf::from(dir));
        }
        self.validate()?;
        Ok(self)
    }

    /// 按配置的 `sigma` 构建分割器.
    #[inline]
    pub fn segmenter(&self) -> PipelineResult<TissueSegmenter> {
        TissueSegmenter::new(self.sigma)
    }

    fn validate(&self) -> PipelineResult<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(PipelineError::invalid(format!(
                "sigma must be positive and finite, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> PipelineResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| PipelineError::invalid(format!("{key}=`{raw}`: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::{PipelineConfig, ENV_EXPORT_DIR, ENV_FORMAT, ENV_SIGMA, ENV_WINDOW_WIDTH};
    use crate::data::{OutputFormat, WindowSettings};
    use crate::PipelineError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_default() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.window, WindowSettings::soft_tissue());
        assert_eq!(cfg.sigma, 1.0);
        assert_eq!(cfg.format, OutputFormat::Json);
        assert!(cfg.merge_weights.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = PipelineConfig::default()
            .with_lookup(lookup(&[
                (ENV_WINDOW_WIDTH, "80"),
                (ENV_SIGMA, " 1.5 "),
                (ENV_FORMAT, "XML"),
                (ENV_EXPORT_DIR, "/tmp/out"),
            ]))
            .unwrap();
        assert_eq!(cfg.window, WindowSettings::new(80, 40).unwrap());
        assert_eq!(cfg.sigma, 1.5);
        assert_eq!(cfg.format, OutputFormat::Xml);
        assert_eq!(cfg.export_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cfg.segmenter().unwrap().sigma(), 1.5);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        for vars in [
            [(ENV_WINDOW_WIDTH, "0")],
            [(ENV_WINDOW_WIDTH, "wide")],
            [(ENV_SIGMA, "-2")],
            [(ENV_FORMAT, "yaml")],
        ] {
            let err = PipelineConfig::default().with_lookup(lookup(&vars)).unwrap_err();
            assert!(
                matches!(
                    err,
                    PipelineError::InvalidParameter(_) | PipelineError::OutputFormatError(_)
                ),
                "{vars:?}"
            );
        }
    }

    #[test]
    fn test_from_json() {
        let cfg = PipelineConfig::from_json(
            r#"{
                "window": {"width": 80, "level": 40},
                "format": "xml",
                "merge_weights": [1.0, 3.0]
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.window, WindowSettings::brain());
        assert_eq!(cfg.format, OutputFormat::Xml);
        assert_eq!(cfg.merge_weights.as_deref(), Some(&[1.0, 3.0][..]));
        assert_eq!(cfg.sigma, 1.0);

        assert!(PipelineConfig::from_json(r#"{"window": {"width": 0, "level": 40}}"#).is_err());
        assert!(PipelineConfig::from_json(r#"{"sigma": 0.0}"#).is_err());
    }
}
