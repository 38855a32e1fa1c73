//! 显示窗口 (窗宽窗位) 及其到 `u8` 灰度的映射.

use super::PixelBuffer;
use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// 显示窗口, 包含窗宽 (window width) 和窗位 (window level).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
/// 窗宽恒为正数.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct WindowSettings {
    width: i32,
    level: i32,
}

/// 反序列化时的未校验形式.
#[derive(Deserialize)]
struct RawWindow {
    width: i32,
    level: i32,
}

impl TryFrom<RawWindow> for WindowSettings {
    type Error = PipelineError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.level)
    }
}

impl WindowSettings {
    /// 构建窗口.
    ///
    /// `width` 必须为正, 否则返回 [`PipelineError::InvalidParameter`].
    pub fn new(width: i32, level: i32) -> PipelineResult<Self> {
        if width > 0 {
            Ok(Self { width, level })
        } else {
            Err(PipelineError::invalid(format!(
                "window width must be positive, got {width}"
            )))
        }
    }

    /// 便于观察脑实质的窗口. 窗宽 80, 窗位 40.
    #[inline]
    pub const fn brain() -> Self {
        Self {
            width: 80,
            level: 40,
        }
    }

    /// 软组织窗口. 窗宽 400, 窗位 40.
    #[inline]
    pub const fn soft_tissue() -> Self {
        Self {
            width: 400,
            level: 40,
        }
    }

    /// 窗下限. 使用整数向下取整的半窗宽, 奇数窗宽时上下不对称.
    #[inline]
    pub fn lower_bound(&self) -> i64 {
        self.level as i64 - (self.width as i64).div_euclid(2)
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> i64 {
        self.level as i64 + (self.width as i64).div_euclid(2)
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> i32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// 求在当前窗口设置下, 像素值 `v` 对应的灰度值 (0 <= value <= 255).
    ///
    /// 先截断到 `[lower, upper]`, 再按窗宽线性映射并向零截断.
    /// NaN 映射为 0.
    pub fn eval(&self, v: f64) -> u8 {
        let lb = self.lower_bound() as f64;
        let clipped = v.clamp(lb, self.upper_bound() as f64);
        // 255, not 256.
        ((clipped - lb) / self.width as f64 * 255.0) as u8
    }

    /// 对整幅图像做窗宽窗位变换, 返回新的 `u8` 缓冲. 输入不会被修改.
    pub fn apply(&self, buffer: &PixelBuffer) -> PixelBuffer {
        PixelBuffer::U8(buffer.to_f64().mapv(|v| self.eval(v)))
    }
}

/// 以 `width` / `level` 对 `buffer` 做窗宽窗位变换.
///
/// 非正窗宽返回 [`PipelineError::InvalidParameter`].
pub fn apply_window(buffer: &PixelBuffer, width: i32, level: i32) -> PipelineResult<PixelBuffer> {
    Ok(WindowSettings::new(width, level)?.apply(buffer))
}

#[cfg(test)]
mod tests {
    use super::{apply_window, WindowSettings};
    use crate::{PipelineError, PixelBuffer};
    use ndarray::array;

    fn is_valid_init(width: i32, level: i32) -> bool {
        WindowSettings::new(width, level).is_ok()
    }

    #[test]
    fn test_window_invalid_input() {
        assert!(!is_valid_init(-1, 0));
        assert!(!is_valid_init(0, 0));
        assert!(is_valid_init(1, 0));
        assert!(matches!(
            apply_window(&PixelBuffer::from(array![[1u16]]), 0, 40),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_window_bounds() {
        let w = WindowSettings::soft_tissue();
        assert_eq!((w.lower_bound(), w.upper_bound()), (-160, 240));

        // 奇数窗宽: 3 div 2 = 1.
        let w = WindowSettings::new(3, 10).unwrap();
        assert_eq!((w.lower_bound(), w.upper_bound()), (9, 11));
        let w = WindowSettings::new(3, -10).unwrap();
        assert_eq!((w.lower_bound(), w.upper_bound()), (-11, -9));
    }

    #[test]
    fn test_window_generic() {
        // [-160, 240]
        let w = WindowSettings::new(400, 40).unwrap();
        assert_eq!(w.eval(f64::NAN), 0);
        assert_eq!(w.eval(f64::MIN), 0);
        assert_eq!(w.eval(f64::MAX), 255);

        assert_eq!(w.eval(-200.0), 0);
        assert_eq!(w.eval(-160.0), 0);
        assert_eq!(w.eval(300.0), 255);
        assert_eq!(w.eval(240.0), 255);

        // (40 + 160) / 400 * 255 = 127.5
        assert_eq!(w.eval(40.0), 127);
        assert_eq!(w.eval(-60.0), (255.0 * 0.25) as u8);
        assert_eq!(w.eval(140.0), (255.0 * 0.75) as u8);

        // boundary
        assert_eq!(w.eval(239.9), 254);
    }

    #[test]
    fn test_window_apply_is_pure() {
        let src = PixelBuffer::from(array![[-200i16, 40], [300, 240]]);
        let before = src.clone();
        let out = apply_window(&src, 400, 40).unwrap();
        assert_eq!(out, PixelBuffer::U8(array![[0, 127], [255, 255]]));
        assert_eq!(src, before);
    }
}
