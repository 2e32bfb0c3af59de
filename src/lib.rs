//! zfind - 多文件查找/替换引擎
//!
//! 模块结构：
//! - kernel::services::ports: 契约（FileProvider, Scope, ProgressMonitor, FindError）
//! - kernel::services::adapters: 实现（FindReplace, 各种 Scope, 内容源, 配置）

pub mod kernel;

pub use kernel::services::adapters::{
    BufferScope, CancelFlagMonitor, DirectoryScope, FileListScope, FindReplace,
    FindReplaceService, FindTask, LocalFileProvider, LogErrorSink, MemoryFileProvider,
    SearchConfig,
};
pub use kernel::services::ports::{
    ErrorSink, FileProvider, FilterOptions, FindError, FindMessage, FindRequest, FindResult,
    FindSettings, MatchSpan, ProgressMonitor, Scope, SearchResult, SelectionBounds,
};
