//! Find/Replace in Files 的数据契约
//!
//! 引擎只依赖这里定义的 trait：Scope 决定搜哪些文件，FileProvider 提供内容与可替换的缓冲区，
//! ProgressMonitor 负责进度与取消，ErrorSink 接收单个文件的非致命错误。

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, FindError>;

#[derive(Debug, thiserror::Error)]
pub enum FindError {
    #[error("Invalid regex: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("File {} not found", .0.display())]
    SourceNotFound(PathBuf),
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Edit {offset}+{length} out of range for {} (len {len})", path.display())]
    EditOutOfRange {
        path: PathBuf,
        offset: usize,
        length: usize,
        len: usize,
    },
    #[error("Scope enumeration failed: {0}")]
    Scope(String),
    #[error("A find/replace run is already in progress")]
    AlreadyRunning,
    #[error("Worker panicked while processing {}", .0.display())]
    WorkerPanicked(PathBuf),
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl FindError {
    /// 把 io::Error 归类：NotFound 单独成为 SourceNotFound
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FindError::SourceNotFound(path.to_path_buf())
        } else {
            FindError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub regex_search: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_words_only: bool,
}

/// 选区范围，`None` 表示该侧不受限
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionBounds {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl SelectionBounds {
    pub const UNBOUNDED: Self = Self {
        start: None,
        end: None,
    };

    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => Self {
                start: Some(e),
                end: Some(s),
            },
            _ => Self { start, end },
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, span: MatchSpan) -> bool {
        self.start.is_none_or(|s| span.offset >= s) && self.end.is_none_or(|e| span.end() <= e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub offset: usize,
    pub length: usize,
}

impl MatchSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// 一条结果；位置相对于该文件在此结果之前的所有替换都已生效后的内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub path: PathBuf,
    pub offset: usize,
    pub length: usize,
}

impl SearchResult {
    pub fn new(path: impl Into<PathBuf>, offset: usize, length: usize) -> Self {
        Self {
            path: path.into(),
            offset,
            length,
        }
    }
}

/// 一次查找/替换的输入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindRequest {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default)]
    pub filter: FilterOptions,
}

impl FindRequest {
    pub fn find(pattern: impl Into<String>, filter: FilterOptions) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: None,
            filter,
        }
    }

    pub fn replace(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        filter: FilterOptions,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: Some(replacement.into()),
            filter,
        }
    }

    pub fn is_replace(&self) -> bool {
        self.replacement.is_some()
    }
}

/// 一个可搜索/可替换的内容源
///
/// 同一时刻只被一个 worker 持有；`replace` 必须包在 `begin_replace`/`end_replace` 之间。
pub trait FileProvider: Send {
    fn file_name(&self) -> &Path;

    fn read_string(&mut self) -> Result<String>;

    fn selection(&self) -> SelectionBounds {
        SelectionBounds::UNBOUNDED
    }

    fn begin_replace(&mut self, original: &str);

    /// `offset`/`length` 为当前（已应用之前编辑后的）内容中的字节位置
    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<()>;

    /// 由实现决定是写盘、刷新视图还是只提交撤销组
    fn end_replace(&mut self) -> Result<()>;
}

pub trait Scope {
    /// `cancelled` 是引擎共享的取消查询，枚举较慢的 scope 应在循环里轮询
    fn files(
        &self,
        cancelled: &(dyn Fn() -> bool + Sync),
        filter: &FilterOptions,
    ) -> Result<Vec<Box<dyn FileProvider>>>;

    fn total_work(&self, filter: &FilterOptions) -> usize;

    fn description(&self, filter: &FilterOptions, pattern: &str, replacement: Option<&str>)
        -> String;
}

pub trait ProgressMonitor: Sync {
    fn begin_task(&self, description: &str, total_steps: usize);
    fn step(&self, work: usize);
    fn end_task(&self);
    fn is_cancel_requested(&self) -> bool;
}

pub trait ErrorSink: Sync {
    fn report(&self, path: &Path, error: &FindError);
}

impl<F> ErrorSink for F
where
    F: Fn(&Path, &FindError) + Sync,
{
    fn report(&self, path: &Path, error: &FindError) {
        self(path, error)
    }
}

/// 服务层推送给调用方的消息
#[derive(Debug, Clone)]
pub enum FindMessage {
    Started {
        search_id: u64,
        description: String,
        total_steps: usize,
    },
    Progress {
        search_id: u64,
        files_searched: usize,
        matches_found: usize,
    },
    FileError {
        search_id: u64,
        path: PathBuf,
        message: String,
    },
    Complete {
        search_id: u64,
        results: Vec<SearchResult>,
        total_files: usize,
        total_matches: usize,
    },
    Cancelled {
        search_id: u64,
        results: Vec<SearchResult>,
    },
    Error {
        search_id: u64,
        message: String,
    },
}
