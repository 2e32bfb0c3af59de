//! 批量替换
//!
//! 先收集全部匹配并展开替换文本，再打开 provider 的替换批次逐个修改。
//! 每次替换后累加 delta，后续匹配的 offset 都按 delta 平移，
//! 因此返回的位置始终对应"刚应用完这次替换"之后的缓冲区。

use super::matcher::SearchConfig;
use super::progress::ProgressTracker;
use crate::kernel::services::ports::find::{
    FileProvider, FindError, MatchSpan, Result, SearchResult,
};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// 单个文件内的累计偏移
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningDelta(isize);

impl RunningDelta {
    pub fn value(self) -> isize {
        self.0
    }

    pub fn adjust(self, offset: usize) -> Option<usize> {
        offset.checked_add_signed(self.0)
    }

    pub fn record(&mut self, match_len: usize, replacement_len: usize) {
        self.0 += replacement_len as isize - match_len as isize;
    }
}

struct PlannedEdit {
    span: MatchSpan,
    replacement: String,
}

/// 批次中途失败：已应用并随 `end_replace` 提交的结果与错误一起返回
#[derive(Debug)]
pub struct PartialReplace {
    pub results: Vec<SearchResult>,
    pub error: FindError,
}

impl PartialReplace {
    fn new(results: Vec<SearchResult>, error: FindError) -> Self {
        Self { results, error }
    }
}

pub fn apply_replacements(
    provider: &mut dyn FileProvider,
    content: &str,
    config: &SearchConfig,
    matches: Vec<MatchSpan>,
    template: &str,
    tracker: &ProgressTracker<'_>,
) -> std::result::Result<Vec<SearchResult>, PartialReplace> {
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    // 修改之前必须全部物化：展开模板依赖原始内容
    let edits: Vec<PlannedEdit> = matches
        .into_iter()
        .map(|span| PlannedEdit {
            span,
            replacement: config.expand(content, span, template),
        })
        .collect();

    let path = provider.file_name().to_path_buf();
    let mut results = Vec::with_capacity(edits.len());

    provider.begin_replace(content);
    let applied = panic::catch_unwind(AssertUnwindSafe(|| {
        apply_edits(&mut *provider, &path, content.len(), &edits, tracker, &mut results)
    }));
    // 无论取消、出错还是 panic，批次都要关闭
    let ended = provider.end_replace();

    let failure = match applied {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e),
        Err(_) => Some(FindError::WorkerPanicked(path.clone())),
    };
    match (failure, ended) {
        (None, Ok(())) => Ok(results),
        (Some(error), Ok(())) => Err(PartialReplace::new(results, error)),
        // 提交失败时已应用的修改不算数
        (Some(error), Err(_)) | (None, Err(error)) => Err(PartialReplace::new(Vec::new(), error)),
    }
}

fn apply_edits(
    provider: &mut dyn FileProvider,
    path: &Path,
    original_len: usize,
    edits: &[PlannedEdit],
    tracker: &ProgressTracker<'_>,
    results: &mut Vec<SearchResult>,
) -> Result<()> {
    let mut delta = RunningDelta::default();

    for edit in edits {
        if tracker.is_cancel_requested() {
            tracing::debug!(path = %path.display(), applied = results.len(), "replace cancelled");
            break;
        }

        let offset = delta
            .adjust(edit.span.offset)
            .ok_or_else(|| FindError::EditOutOfRange {
                path: path.to_path_buf(),
                offset: edit.span.offset,
                length: edit.span.length,
                len: original_len.saturating_add_signed(delta.value()),
            })?;

        provider.replace(offset, edit.span.length, &edit.replacement)?;
        results.push(SearchResult::new(path, offset, edit.replacement.len()));
        delta.record(edit.span.length, edit.replacement.len());
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/find/replace.rs"]
mod tests;
