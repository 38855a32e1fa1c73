//! 批处理. 图像之间互不依赖, 开启 `rayon` feature 时并行执行.
//!
//! 结果顺序与输入顺序一致, 单幅图像失败不影响其它图像.

use crate::adapter::AdapterRegistry;
use crate::data::{DecodedImage, DicomDecoder, ImageRecord};
use crate::diag::Diagnostics;
use crate::error::PipelineResult;
use log::Level;
use std::path::Path;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        fn map_ordered<I, T, F>(inputs: Vec<I>, op: F) -> Vec<PipelineResult<T>>
        where
            I: Send,
            T: Send,
            F: Fn(I) -> PipelineResult<T> + Sync + Send,
        {
            inputs.into_par_iter().map(op).collect()
        }
    } else {
        fn map_ordered<I, T, F>(inputs: Vec<I>, op: F) -> Vec<PipelineResult<T>>
        where
            F: Fn(I) -> PipelineResult<T>,
        {
            inputs.into_iter().map(op).collect()
        }
    }
}

/// 对每个输入执行 `op`, 按输入顺序返回各自的结果.
pub fn process_batch<I, T, F>(inputs: Vec<I>, op: F) -> Vec<PipelineResult<T>>
where
    I: Send,
    T: Send,
    F: Fn(I) -> PipelineResult<T> + Sync + Send,
{
    map_ordered(inputs, op)
}

/// 加载一批已解码的图像, 并对每幅图像执行 `op`.
pub fn process_decoded<T, F>(
    registry: &AdapterRegistry,
    images: Vec<DecodedImage>,
    op: F,
    diag: &dyn Diagnostics,
) -> Vec<PipelineResult<T>>
where
    T: Send,
    F: Fn(&ImageRecord) -> PipelineResult<T> + Sync + Send,
{
    process_batch(images, |img| op(&ImageRecord::load(registry, img, diag)?))
}

/// 以 `decoder` 解码 `paths` 指向的文件, 加载后对每幅图像执行 `op`.
///
/// 结束时向 `diag` 汇报失败个数.
pub fn process_paths<D, P, T, F>(
    decoder: &D,
    registry: &AdapterRegistry,
    paths: &[P],
    op: F,
    diag: &dyn Diagnostics,
) -> Vec<PipelineResult<T>>
where
    D: DicomDecoder + ?Sized,
    P: AsRef<Path> + Sync,
    T: Send,
    F: Fn(&ImageRecord) -> PipelineResult<T> + Sync + Send,
{
    let results = process_batch(paths.iter().collect(), |p: &P| {
        let path = p.as_ref();
        let decoded = decoder.decode(path).map_err(|e| {
            diag.emit(Level::Warn, &format!("{}: {e}", path.display()));
            e
        })?;
        op(&ImageRecord::load(registry, decoded, diag)?)
    });

    let failed = results.iter().filter(|r| r.is_err()).count();
    let level = if failed == 0 { Level::Info } else { Level::Warn };
    diag.emit(
        level,
        &format!("batch finished: {} images, {failed} failed", results.len()),
    );
    results
}
