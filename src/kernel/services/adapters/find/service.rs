//! 异步 Find/Replace 服务
//!
//! 引擎本身是同步的；这里把它放到 tokio 的 blocking 线程上执行，
//! 通过 SyncSender 推送开始/进度/单文件错误/完成/取消消息。

use super::engine::FindReplace;
use crate::kernel::services::ports::find::{
    ErrorSink, FindError, FindMessage, FindRequest, ProgressMonitor, Scope,
};
use crate::kernel::services::ports::settings::FindSettings;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;

static FIND_ID: AtomicU64 = AtomicU64::new(0);

fn next_find_id() -> u64 {
    FIND_ID.fetch_add(1, Ordering::Relaxed)
}

pub struct FindTask {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl FindTask {
    pub fn new() -> Self {
        Self {
            id: next_find_id(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancelled_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

impl Default for FindTask {
    fn default() -> Self {
        Self::new()
    }
}

/// 同时充当一次任务的 ProgressMonitor 与 ErrorSink
struct TaskReporter {
    search_id: u64,
    cancelled: Arc<AtomicBool>,
    engine: Arc<FindReplace>,
    tx: SyncSender<FindMessage>,
}

impl ProgressMonitor for TaskReporter {
    fn begin_task(&self, description: &str, total_steps: usize) {
        let _ = self.tx.send(FindMessage::Started {
            search_id: self.search_id,
            description: description.to_string(),
            total_steps,
        });
    }

    fn step(&self, _work: usize) {
        let _ = self.tx.send(FindMessage::Progress {
            search_id: self.search_id,
            files_searched: self.engine.searched_files_count(),
            matches_found: self.engine.found_matches_count(),
        });
    }

    fn end_task(&self) {}

    fn is_cancel_requested(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl ErrorSink for TaskReporter {
    fn report(&self, path: &Path, error: &FindError) {
        tracing::warn!(path = %path.display(), error = %error, "find: file skipped");
        let _ = self.tx.send(FindMessage::FileError {
            search_id: self.search_id,
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }
}

pub struct FindReplaceService {
    runtime: tokio::runtime::Handle,
    engine: Arc<FindReplace>,
}

impl FindReplaceService {
    pub fn new(runtime: tokio::runtime::Handle, settings: FindSettings) -> Self {
        Self {
            runtime,
            engine: Arc::new(FindReplace::new(settings)),
        }
    }

    pub fn engine(&self) -> &Arc<FindReplace> {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn find_in_scope<S>(
        &self,
        scope: S,
        request: FindRequest,
        tx: SyncSender<FindMessage>,
    ) -> FindTask
    where
        S: Scope + Send + 'static,
    {
        let task = FindTask::new();
        let search_id = task.id();
        let cancelled = task.cancelled_flag();
        let engine = self.engine.clone();

        self.runtime.spawn(async move {
            // 校验失败时不启动任何工作
            if let Err(e) = FindReplace::validate_pattern(&request.filter, &request.pattern) {
                let _ = tx.send(FindMessage::Error {
                    search_id,
                    message: e.to_string(),
                });
                return;
            }

            let reporter = TaskReporter {
                search_id,
                cancelled: cancelled.clone(),
                engine: engine.clone(),
                tx: tx.clone(),
            };
            let result = tokio::task::spawn_blocking(move || {
                let results = engine.find_all(&scope, &request, &reporter, &reporter)?;
                Ok::<_, FindError>((
                    results,
                    engine.searched_files_count(),
                    engine.found_matches_count(),
                ))
            })
            .await;

            let message = match result {
                Ok(Ok((results, _, _))) if cancelled.load(Ordering::Relaxed) => {
                    FindMessage::Cancelled { search_id, results }
                }
                Ok(Ok((results, total_files, total_matches))) => FindMessage::Complete {
                    search_id,
                    results,
                    total_files,
                    total_matches,
                },
                Ok(Err(e)) => FindMessage::Error {
                    search_id,
                    message: e.to_string(),
                },
                Err(e) => {
                    if cancelled.load(Ordering::Relaxed) {
                        FindMessage::Cancelled {
                            search_id,
                            results: Vec::new(),
                        }
                    } else {
                        FindMessage::Error {
                            search_id,
                            message: format!("Find task failed: {}", e),
                        }
                    }
                }
            };
            let _ = tx.send(message);
        });

        task
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/find/service.rs"]
mod tests;
