//! 二维像素缓冲. 元素类型在标定之后保持不变.

use crate::Idx2d;
use ndarray::{Array2, ArrayView2};
use num::traits::AsPrimitive;
use serde::{Deserialize, Serialize};

/// 像素缓冲元素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    /// `u8`.
    U8,

    /// `u16`, 多数 MR / CT 原始存储类型.
    U16,

    /// `i16`.
    I16,

    /// `i32`.
    I32,

    /// `f32`.
    F32,

    /// `f64`.
    F64,
}

/// 不可变的二维像素缓冲, 按 (高, 宽) 组织.
///
/// 所有变换 (标定、窗口、融合) 都返回新的缓冲, 不会就地修改.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PixelBuffer {
    /// `u8` 像素.
    U8(Array2<u8>),

    /// `u16` 像素.
    U16(Array2<u16>),

    /// `i16` 像素.
    I16(Array2<i16>),

    /// `i32` 像素.
    I32(Array2<i32>),

    /// `f32` 像素.
    F32(Array2<f32>),

    /// `f64` 像素.
    F64(Array2<f64>),
}

/// 对所有变体执行同一段代码. `$a` 绑定内部的 `Array2<T>`.
macro_rules! each_variant {
    ($buf: expr, $a: ident => $body: expr) => {
        match $buf {
            PixelBuffer::U8($a) => $body,
            PixelBuffer::U16($a) => $body,
            PixelBuffer::I16($a) => $body,
            PixelBuffer::I32($a) => $body,
            PixelBuffer::F32($a) => $body,
            PixelBuffer::F64($a) => $body,
        }
    };
}

/// 将 `f64` 数组按 `as` 语义 (向零截断, 越界饱和) 转换为 `T`.
#[inline]
fn cast_array<T>(src: ArrayView2<f64>) -> Array2<T>
where
    T: Copy + 'static,
    f64: AsPrimitive<T>,
{
    src.mapv(AsPrimitive::<T>::as_)
}

/// 将任意数值数组转换为 `f64`.
#[inline]
fn widen<T>(src: &Array2<T>) -> Array2<f64>
where
    T: AsPrimitive<f64>,
{
    src.mapv(AsPrimitive::<f64>::as_)
}

impl PixelBuffer {
    /// 元素类型.
    pub fn pixel_type(&self) -> PixelType {
        match self {
            Self::U8(_) => PixelType::U8,
            Self::U16(_) => PixelType::U16,
            Self::I16(_) => PixelType::I16,
            Self::I32(_) => PixelType::I32,
            Self::F32(_) => PixelType::F32,
            Self::F64(_) => PixelType::F64,
        }
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        each_variant!(self, a => a.dim())
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 图像是否不含任何像素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 以 `f64` 精度复制全部像素.
    pub fn to_f64(&self) -> Array2<f64> {
        each_variant!(self, a => widen(a))
    }

    /// 获取给定位置 (高, 宽) 的像素值 (以 `f64` 表示). 越界时返回 `None`.
    pub fn get_f64(&self, pos: Idx2d) -> Option<f64> {
        each_variant!(self, a => a.get(pos).map(|&v| AsPrimitive::<f64>::as_(v)))
    }

    /// 将 `f64` 数据按 `ty` 类型截断转换, 构造新的缓冲.
    pub fn from_f64(ty: PixelType, data: ArrayView2<f64>) -> Self {
        match ty {
            PixelType::U8 => Self::U8(cast_array(data)),
            PixelType::U16 => Self::U16(cast_array(data)),
            PixelType::I16 => Self::I16(cast_array(data)),
            PixelType::I32 => Self::I32(cast_array(data)),
            PixelType::F32 => Self::F32(cast_array(data)),
            PixelType::F64 => Self::F64(data.to_owned()),
        }
    }

    /// 在 `f64` 精度下逐像素应用 `op`, 再转换回原元素类型.
    ///
    /// 形状与元素类型保持不变.
    pub fn map_f64<F: Fn(f64) -> f64>(&self, op: F) -> Self {
        let data = self.to_f64().mapv_into(op);
        Self::from_f64(self.pixel_type(), data.view())
    }

    /// 若元素类型为 `u8`, 则借出底层数据.
    #[inline]
    pub fn as_u8(&self) -> Option<&Array2<u8>> {
        match self {
            Self::U8(a) => Some(a),
            _ => None,
        }
    }
}

macro_rules! impl_from_array {
    ($($t: ty => $variant: ident),+) => {
        $(
            impl From<Array2<$t>> for PixelBuffer {
                #[inline]
                fn from(value: Array2<$t>) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_from_array!(
    u8 => U8,
    u16 => U16,
    i16 => I16,
    i32 => I32,
    f32 => F32,
    f64 => F64
);
