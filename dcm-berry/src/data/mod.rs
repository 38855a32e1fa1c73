//! 图像数据结构: 元信息、协议信息、像素缓冲、显示窗口与持久化.

mod metadata;
mod pixel;
mod protocol;
mod record;
pub mod save;
pub mod window;

pub use metadata::{DecodedImage, DicomDecoder, DicomMetadata, Rescale};
pub use pixel::{PixelBuffer, PixelType};
pub use protocol::{OutputFormat, ProtocolInfo, ProtocolValue};
pub use record::ImageRecord;
pub use save::{ImgWriteRaw, ImgWriteVis};
pub use window::{apply_window, WindowSettings};
