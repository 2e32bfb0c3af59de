//! 进度与取消
//!
//! ProgressTracker 只做转发：多久 step 一次由引擎决定，描述文本由 scope 生成。

use crate::kernel::services::ports::find::{ErrorSink, FindError, ProgressMonitor};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct ProgressTracker<'a> {
    monitor: &'a dyn ProgressMonitor,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(monitor: &'a dyn ProgressMonitor) -> Self {
        Self { monitor }
    }

    pub fn begin_task(&self, description: &str, total_steps: usize) {
        self.monitor.begin_task(description, total_steps);
    }

    pub fn step(&self, work: usize) {
        self.monitor.step(work);
    }

    pub fn end_task(&self) {
        self.monitor.end_task();
    }

    #[inline]
    pub fn is_cancel_requested(&self) -> bool {
        self.monitor.is_cancel_requested()
    }
}

/// 基于共享 AtomicBool 的 monitor，可以从任意线程（或信号处理）取消
#[derive(Debug, Clone, Default)]
pub struct CancelFlagMonitor {
    cancelled: Arc<AtomicBool>,
    steps: Arc<AtomicUsize>,
}

impl CancelFlagMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            cancelled,
            steps: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }
}

impl ProgressMonitor for CancelFlagMonitor {
    fn begin_task(&self, description: &str, total_steps: usize) {
        self.steps.store(0, Ordering::Relaxed);
        tracing::debug!(description, total_steps, "find task started");
    }

    fn step(&self, work: usize) {
        let done = self.steps.fetch_add(work, Ordering::Relaxed) + work;
        tracing::trace!(done, "find progress");
    }

    fn end_task(&self) {
        tracing::debug!(steps = self.steps(), "find task ended");
    }

    fn is_cancel_requested(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// 默认 error sink：只记日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, path: &Path, error: &FindError) {
        tracing::warn!(path = %path.display(), error = %error, "skipping file");
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/find/progress.rs"]
mod tests;
