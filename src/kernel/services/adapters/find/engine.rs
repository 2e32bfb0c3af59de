//! Find/Replace in Files 引擎
//!
//! - 每次调用只编译一次 SearchConfig，之后只读共享给所有 worker
//! - worker 池大小取配置或宿主并行度，每个 worker 独占一个文件直到处理完
//! - 计数器用原子量，结果通过 mpsc 汇总到调用线程
//! - 取消在三个粒度轮询：开始一个文件之前、单文件的匹配循环内、替换循环内

use super::matcher::{Matches, SearchConfig};
use super::progress::ProgressTracker;
use super::replace::apply_replacements;
use crate::kernel::services::ports::find::{
    ErrorSink, FileProvider, FilterOptions, FindError, FindRequest, MatchSpan, ProgressMonitor,
    Result, Scope, SearchResult,
};
use crate::kernel::services::ports::settings::FindSettings;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::vec;

type WorkQueue = Mutex<vec::IntoIter<Box<dyn FileProvider>>>;

pub struct FindReplace {
    settings: FindSettings,
    running: AtomicBool,
    found_matches: AtomicUsize,
    searched_files: AtomicUsize,
}

impl Default for FindReplace {
    fn default() -> Self {
        Self::new(FindSettings::default())
    }
}

impl FindReplace {
    pub fn new(settings: FindSettings) -> Self {
        Self {
            settings,
            running: AtomicBool::new(false),
            found_matches: AtomicUsize::new(0),
            searched_files: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &FindSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn found_matches_count(&self) -> usize {
        self.found_matches.load(Ordering::Relaxed)
    }

    pub fn searched_files_count(&self) -> usize {
        self.searched_files.load(Ordering::Relaxed)
    }

    /// 开始前的校验：Regex 模式下模式串必须能编译
    pub fn validate_pattern(filter: &FilterOptions, pattern: &str) -> Result<()> {
        SearchConfig::validate(pattern, filter)
    }

    /// 在 scope 给出的全部文件中查找；`request.replacement` 存在时就地替换
    ///
    /// 取消不是错误：返回取消前已收集的结果。单个文件的失败只报给 `errors`，不影响其它文件。
    pub fn find_all(
        &self,
        scope: &dyn Scope,
        request: &FindRequest,
        monitor: &dyn ProgressMonitor,
        errors: &dyn ErrorSink,
    ) -> Result<Vec<SearchResult>> {
        let config = SearchConfig::new(&request.pattern, &request.filter)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FindError::AlreadyRunning);
        }
        self.found_matches.store(0, Ordering::Relaxed);
        self.searched_files.store(0, Ordering::Relaxed);

        let tracker = ProgressTracker::new(monitor);
        let _guard = RunGuard {
            running: &self.running,
            tracker: &tracker,
        };

        let description = scope.description(
            &request.filter,
            &request.pattern,
            request.replacement.as_deref(),
        );
        tracker.begin_task(&description, self.settings.progress_steps);

        // 先取文件列表：遍历本身要能被取消，total_work 之后复用遍历结果
        let files = scope.files(&|| tracker.is_cancel_requested(), &request.filter)?;
        if tracker.is_cancel_requested() {
            tracing::info!("find in files cancelled before any file was searched");
            return Ok(Vec::new());
        }
        let total_work = scope.total_work(&request.filter);
        let step = self.settings.step_size(total_work);

        let run = Run {
            engine: self,
            config: &config,
            request,
            tracker: &tracker,
            errors,
            step,
        };
        let results = run.execute(files);

        tracing::info!(
            files = self.searched_files_count(),
            matches = self.found_matches_count(),
            cancelled = tracker.is_cancel_requested(),
            replace = request.is_replace(),
            "find in files finished"
        );
        Ok(results)
    }
}

/// 无论正常结束、取消还是出错都要收尾
struct RunGuard<'a> {
    running: &'a AtomicBool,
    tracker: &'a ProgressTracker<'a>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.tracker.end_task();
        self.running.store(false, Ordering::Release);
    }
}

struct Run<'a> {
    engine: &'a FindReplace,
    config: &'a SearchConfig,
    request: &'a FindRequest,
    tracker: &'a ProgressTracker<'a>,
    errors: &'a dyn ErrorSink,
    step: usize,
}

impl Run<'_> {
    fn execute(&self, files: Vec<Box<dyn FileProvider>>) -> Vec<SearchResult> {
        if files.is_empty() {
            return Vec::new();
        }

        let workers = self.engine.settings.worker_count().min(files.len());
        let queue: WorkQueue = Mutex::new(files.into_iter());
        let (tx, rx) = mpsc::channel::<Vec<SearchResult>>();

        thread::scope(|s| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                s.spawn(move || self.worker_loop(queue, tx));
            }
        });
        drop(tx);

        rx.into_iter().flatten().collect()
    }

    fn worker_loop(&self, queue: &WorkQueue, tx: Sender<Vec<SearchResult>>) {
        loop {
            if self.tracker.is_cancel_requested() {
                return;
            }

            let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
            let Some(mut provider) = next else {
                return;
            };

            let searched = self.engine.searched_files.fetch_add(1, Ordering::Relaxed) + 1;
            let path = provider.file_name().to_path_buf();

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| self.process_file(provider.as_mut())));
            match outcome {
                Ok((results, error)) => {
                    if let Some(err) = error {
                        self.errors.report(&path, &err);
                    }
                    if !results.is_empty() && tx.send(results).is_err() {
                        return;
                    }
                }
                Err(_) => self
                    .errors
                    .report(&path, &FindError::WorkerPanicked(path.clone())),
            }

            if searched % self.step == 0 {
                self.tracker.step(1);
            }
        }
    }

    /// 返回本文件产生的结果，以及（若有）需要报告的错误；替换中途失败时两者都可能非空
    fn process_file(
        &self,
        provider: &mut dyn FileProvider,
    ) -> (Vec<SearchResult>, Option<FindError>) {
        let content = match provider.read_string() {
            Ok(c) => c,
            Err(e) => return (Vec::new(), Some(e)),
        };
        if self.tracker.is_cancel_requested() {
            return (Vec::new(), None);
        }

        let filter = &self.request.filter;
        let matches = self.config.scan(&content, filter, provider.selection());

        let (results, error) = match self.request.replacement.as_deref() {
            None => (self.collect_results(provider.file_name(), matches), None),
            Some(template) => {
                let spans: Vec<MatchSpan> = matches
                    .take_while(|_| !self.tracker.is_cancel_requested())
                    .collect();
                match apply_replacements(
                    provider,
                    &content,
                    self.config,
                    spans,
                    template,
                    self.tracker,
                ) {
                    Ok(results) => (results, None),
                    Err(partial) => (partial.results, Some(partial.error)),
                }
            }
        };

        tracing::debug!(
            path = %provider.file_name().display(),
            matches = results.len(),
            "file processed"
        );
        self.engine
            .found_matches
            .fetch_add(results.len(), Ordering::Relaxed);
        (results, error)
    }

    /// 只读路径：边扫描边产出，从不修改内容
    fn collect_results(&self, path: &Path, matches: Matches<'_>) -> Vec<SearchResult> {
        let mut results = Vec::new();
        for span in matches {
            if self.tracker.is_cancel_requested() {
                break;
            }
            results.push(SearchResult::new(path, span.offset, span.length));
        }
        results
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/find/engine.rs"]
mod tests;
