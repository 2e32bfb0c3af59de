//! 内容源实现
//!
//! - LocalFileProvider: 磁盘文件
//! - MemoryFileProvider: 已打开的内存缓冲区

pub mod local;
pub mod memory;

pub use local::{is_likely_binary, LocalFileProvider};
pub use memory::MemoryFileProvider;
