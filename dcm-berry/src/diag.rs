//! 诊断输出.
//!
//! 需要输出诊断信息的调用显式接受一个 [`Diagnostics`] 实现,
//! 而不是修改全局 logger 状态. 日志后端的初始化由上层应用负责.

use log::Level;
use std::sync::Mutex;

/// 诊断信息接收端.
pub trait Diagnostics: Sync {
    /// 接收一条诊断信息.
    fn emit(&self, level: Level, message: &str);
}

/// 转发到 `log` facade, target 为 `dcm_berry`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl Diagnostics for LogSink {
    #[inline]
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: "dcm_berry", level, "{message}");
    }
}

/// 丢弃全部诊断信息.
#[derive(Copy, Clone, Debug, Default)]
pub struct Silent;

impl Diagnostics for Silent {
    #[inline]
    fn emit(&self, _: Level, _: &str) {}
}

/// 在内存中收集诊断信息. 多用于测试与批处理报告.
#[derive(Debug, Default)]
pub struct Collector(Mutex<Vec<(Level, String)>>);

impl Collector {
    /// 空收集器.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出目前收集到的全部信息.
    pub fn take(&self) -> Vec<(Level, String)> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Diagnostics for Collector {
    fn emit(&self, level: Level, message: &str) {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::{Collector, Diagnostics, LogSink};
    use log::Level;

    #[test]
    fn test_collector() {
        let c = Collector::new();
        c.emit(Level::Warn, "first");
        c.emit(Level::Debug, "second");
        assert_eq!(
            c.take(),
            [(Level::Warn, "first".to_owned()), (Level::Debug, "second".to_owned())]
        );
        assert!(c.take().is_empty());
    }

    #[test]
    fn test_log_sink_forwards() {
        // 可能已被其它测试初始化.
        let _ = simple_logger::SimpleLogger::new().init();
        LogSink.emit(Level::Info, "log sink smoke test");
    }
}
