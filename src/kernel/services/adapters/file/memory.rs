//! 内存缓冲区 Provider
//!
//! 文本存放在 `Arc<Mutex<Rope>>` 中，clone 出来的 provider 共享同一份缓冲区，
//! 调用方保留一份句柄即可看到替换结果（对应编辑器里已打开的文档）。

use crate::kernel::services::ports::find::{
    FileProvider, FindError, Result, SelectionBounds,
};
use ropey::Rope;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct MemoryBuffer {
    rope: Rope,
    version: u64,
    closed: bool,
}

#[derive(Clone)]
pub struct MemoryFileProvider {
    name: PathBuf,
    buffer: Arc<Mutex<MemoryBuffer>>,
    selection: SelectionBounds,
    pending_edits: usize,
}

impl MemoryFileProvider {
    pub fn new(name: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            name: name.into(),
            buffer: Arc::new(Mutex::new(MemoryBuffer {
                rope: Rope::from_str(text),
                version: 0,
                closed: false,
            })),
            selection: SelectionBounds::UNBOUNDED,
            pending_edits: 0,
        }
    }

    pub fn with_selection(mut self, selection: SelectionBounds) -> Self {
        self.selection = selection;
        self
    }

    pub fn text(&self) -> String {
        self.lock().rope.to_string()
    }

    /// 每提交一个非空的替换批次加一
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// 模拟文档被关闭：之后的读取返回 SourceNotFound
    pub fn close(&self) {
        self.lock().closed = true;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileProvider for MemoryFileProvider {
    fn file_name(&self) -> &Path {
        &self.name
    }

    fn read_string(&mut self) -> Result<String> {
        let buffer = self.lock();
        if buffer.closed {
            return Err(FindError::SourceNotFound(self.name.clone()));
        }
        Ok(buffer.rope.to_string())
    }

    fn selection(&self) -> SelectionBounds {
        self.selection
    }

    fn begin_replace(&mut self, _original: &str) {
        self.pending_edits = 0;
    }

    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<()> {
        let mut buffer = self.lock();
        let rope = &mut buffer.rope;
        let len = rope.len_bytes();
        let end = offset.saturating_add(length);

        let out_of_range = || FindError::EditOutOfRange {
            path: self.name.clone(),
            offset,
            length,
            len,
        };
        if end > len {
            return Err(out_of_range());
        }

        let start_char = rope.byte_to_char(offset);
        let end_char = rope.byte_to_char(end);
        if rope.char_to_byte(start_char) != offset || rope.char_to_byte(end_char) != end {
            return Err(out_of_range());
        }

        rope.remove(start_char..end_char);
        rope.insert(start_char, text);
        drop(buffer);

        self.pending_edits += 1;
        Ok(())
    }

    fn end_replace(&mut self) -> Result<()> {
        if std::mem::take(&mut self.pending_edits) > 0 {
            let mut buffer = self.lock();
            buffer.version = buffer.version.saturating_add(1);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/memory.rs"]
mod tests;
