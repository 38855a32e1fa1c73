//! 标定后的图像处理: 多通道融合与组织分割.

mod gaussian;
mod merge;
mod morph;
mod otsu;
mod segment;

pub use gaussian::GaussianKernel;
pub use merge::merge_channels;
pub use morph::{close3x3, dilate3x3, erode3x3};
pub use otsu::multi_otsu;
pub use segment::{SegmentationResult, TissueClasses, TissueSegmenter};
