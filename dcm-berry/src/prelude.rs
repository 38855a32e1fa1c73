//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::adapter::{AdapterRegistry, CustomAdapter, VendorAdapter, VendorKind};
pub use crate::data::{
    DecodedImage, DicomDecoder, DicomMetadata, ImageRecord, ImgWriteRaw, ImgWriteVis,
    OutputFormat, PixelBuffer, PixelType, ProtocolInfo, ProtocolValue, WindowSettings,
};
pub use crate::error::{PipelineError, PipelineResult};

pub use crate::batch::{process_batch, process_decoded, process_paths};
pub use crate::config::PipelineConfig;
pub use crate::diag::{Collector, Diagnostics, LogSink, Silent};
pub use crate::post_proc::{merge_channels, SegmentationResult, TissueSegmenter};
pub use crate::session::Session;
