//! 图像的持久化存储与叠加可视化.

use super::{PixelBuffer, WindowSettings};
use crate::consts::gray::{BLACK, HALF, WHITE};
use crate::error::{PipelineError, PipelineResult};
use crate::post_proc::SegmentationResult;
use ndarray::Array2;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于任意元素类型的 `PixelBuffer`, 保存时用软组织窗口规范化;
/// 对于二值掩码, 前景映射为白色, 背景映射为黑色.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// 仅 `u8` 像素可以按原样保存, 其它元素类型需要先做窗口变换.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()>;
}

/// 将 `u8` 矩阵转为灰度图.
fn to_gray(data: &Array2<u8>) -> image::GrayImage {
    let (height, width) = data.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in data.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
    }
    buf
}

/// 窗位 40, 窗宽 400.
impl ImgWriteVis for PixelBuffer {
    fn save<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        let windowed = WindowSettings::soft_tissue().apply(self);
        windowed.save_raw(path)
    }
}

impl ImgWriteRaw for PixelBuffer {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        let data = self.as_u8().ok_or_else(|| {
            PipelineError::invalid(format!(
                "only u8 pixels can be saved as is, got {:?}",
                self.pixel_type()
            ))
        })?;
        Ok(to_gray(data).save(path)?)
    }
}

/// 前景为白色, 背景为黑色.
impl ImgWriteVis for Array2<bool> {
    fn save<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        let data = self.mapv(|v| if v { WHITE } else { BLACK });
        Ok(to_gray(&data).save(path)?)
    }
}

/// 将分割结果叠加到窗口变换后的图像上.
///
/// - R: 灰度值;
/// - G: 灰质为 127, 否则为 0;
/// - B: 白质为 127, 否则为 0.
///
/// `windowed` 必须是 `u8` 缓冲, 且形状与分割结果一致.
pub fn overlay(
    windowed: &PixelBuffer,
    seg: &SegmentationResult,
) -> PipelineResult<image::RgbImage> {
    let data = windowed
        .as_u8()
        .ok_or_else(|| PipelineError::invalid("overlay requires a windowed (u8) image"))?;
    let expected = data.dim();
    for found in [seg.gray_matter.dim(), seg.white_matter.dim()] {
        if found != expected {
            return Err(PipelineError::DimensionMismatch { expected, found });
        }
    }

    let (height, width) = expected;
    let mut buf = image::RgbImage::new(width as u32, height as u32);
    for ((h, w), &gray) in data.indexed_iter() {
        let g = if seg.gray_matter[(h, w)] { HALF } else { BLACK };
        let b = if seg.white_matter[(h, w)] { HALF } else { BLACK };
        buf.put_pixel(w as u32, h as u32, image::Rgb([gray, g, b]));
    }
    Ok(buf)
}

/// 生成叠加图并保存到 `path`.
pub fn save_overlay<P: AsRef<Path>>(
    path: P,
    windowed: &PixelBuffer,
    seg: &SegmentationResult,
) -> PipelineResult<()> {
    Ok(overlay(windowed, seg)?.save(path)?)
}

#[cfg(test)]
mod tests {
    use super::{overlay, save_overlay, ImgWriteRaw, ImgWriteVis};
    use crate::post_proc::SegmentationResult;
    use crate::{PipelineError, PixelBuffer};
    use ndarray::array;

    fn seg() -> SegmentationResult {
        SegmentationResult {
            gray_matter: array![[true, false], [true, false]],
            white_matter: array![[false, false], [true, true]],
            thresholds: (1.0, 2.0),
        }
    }

    #[test]
    fn test_overlay_channels() {
        let windowed = PixelBuffer::U8(array![[10, 20], [30, 40]]);
        let img = overlay(&windowed, &seg()).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 127, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [20, 0, 0]);
        assert_eq!(img.get_pixel(0, 1).0, [30, 127, 127]);
        assert_eq!(img.get_pixel(1, 1).0, [40, 0, 127]);
    }

    #[test]
    fn test_overlay_rejects_bad_input() {
        let raw = PixelBuffer::from(array![[10u16, 20], [30, 40]]);
        assert!(matches!(
            overlay(&raw, &seg()),
            Err(PipelineError::InvalidParameter(_))
        ));

        let small = PixelBuffer::U8(array![[1, 2, 3]]);
        assert!(matches!(
            overlay(&small, &seg()),
            Err(PipelineError::DimensionMismatch {
                expected: (1, 3),
                found: (2, 2)
            })
        ));
    }

    #[test]
    fn test_save_png() {
        let dir = std::env::temp_dir().join(format!("dcm-berry-save-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let windowed = PixelBuffer::U8(array![[10, 20], [30, 40]]);
        windowed.save_raw(dir.join("raw.png")).unwrap();
        PixelBuffer::from(array![[-500i16, 0], [40, 900]])
            .save(dir.join("vis.png"))
            .unwrap();
        seg().gray_matter.save(dir.join("gm.png")).unwrap();
        save_overlay(dir.join("overlay.png"), &windowed, &seg()).unwrap();

        let back = image::open(dir.join("raw.png")).unwrap().into_luma8();
        assert_eq!(back.get_pixel(1, 1).0, [40]);
        let back = image::open(dir.join("overlay.png")).unwrap().into_rgb8();
        assert_eq!(back.get_pixel(0, 1).0, [30, 127, 127]);

        assert!(PixelBuffer::from(array![[1.0f32]])
            .save_raw(dir.join("bad.png"))
            .is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
