//! Find/Replace in Files
//!
//! - SearchConfig: 模式匹配（Literal / Regex）
//! - apply_replacements: 带 delta 的批量替换
//! - ProgressTracker: 进度与取消
//! - FindReplace: 并行遍历 scope 的引擎
//! - FindReplaceService: tokio 上的异步封装

mod engine;
mod matcher;
mod progress;
mod replace;
mod scope;
mod service;

pub use engine::FindReplace;
pub use matcher::{is_whole_word_at, is_word_char, Matches, SearchConfig};
pub use progress::{CancelFlagMonitor, LogErrorSink, ProgressTracker};
pub use replace::{apply_replacements, PartialReplace, RunningDelta};
pub use scope::{BufferScope, DirectoryScope, FileListScope};
pub use service::{FindReplaceService, FindTask};
