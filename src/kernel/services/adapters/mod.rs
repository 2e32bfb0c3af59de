//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod file;
pub mod find;
pub mod settings;

pub use file::{LocalFileProvider, MemoryFileProvider};
pub use find::{
    BufferScope, CancelFlagMonitor, DirectoryScope, FileListScope, FindReplace,
    FindReplaceService, FindTask, LogErrorSink, ProgressTracker, SearchConfig,
};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
