//! 本地文件 Provider
//!
//! 读取走 std::fs；替换在暂存副本上进行，end_replace 时有改动才写回磁盘。

use crate::kernel::services::ports::find::{
    FileProvider, FindError, Result, SelectionBounds,
};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const BINARY_PROBE_SIZE: usize = 8192;

pub struct LocalFileProvider {
    path: PathBuf,
    selection: SelectionBounds,
    staged: Option<String>,
    dirty: bool,
}

impl LocalFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            selection: SelectionBounds::UNBOUNDED,
            staged: None,
            dirty: false,
        }
    }

    pub fn with_selection(mut self, selection: SelectionBounds) -> Self {
        self.selection = selection;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FindError::from_io(&self.path, e))?;
            }
        }
        fs::write(&self.path, content).map_err(|e| FindError::from_io(&self.path, e))
    }
}

impl FileProvider for LocalFileProvider {
    fn file_name(&self) -> &Path {
        &self.path
    }

    fn read_string(&mut self) -> Result<String> {
        if !self.path.exists() {
            return Err(FindError::SourceNotFound(self.path.clone()));
        }
        if !self.path.is_file() {
            return Err(FindError::Io {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a file"),
            });
        }
        fs::read_to_string(&self.path).map_err(|e| FindError::from_io(&self.path, e))
    }

    fn selection(&self) -> SelectionBounds {
        self.selection
    }

    fn begin_replace(&mut self, original: &str) {
        self.staged = Some(original.to_string());
        self.dirty = false;
    }

    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<()> {
        let Some(staged) = self.staged.as_mut() else {
            return Err(FindError::Io {
                path: self.path.clone(),
                source: io::Error::other("replace outside of a replace batch"),
            });
        };

        let end = offset.saturating_add(length);
        if end > staged.len() || !staged.is_char_boundary(offset) || !staged.is_char_boundary(end)
        {
            return Err(FindError::EditOutOfRange {
                path: self.path.clone(),
                offset,
                length,
                len: staged.len(),
            });
        }

        staged.replace_range(offset..end, text);
        self.dirty = true;
        Ok(())
    }

    fn end_replace(&mut self) -> Result<()> {
        let staged = self.staged.take();
        if !std::mem::take(&mut self.dirty) {
            return Ok(());
        }
        match staged {
            Some(content) => {
                self.write_file(&content)?;
                tracing::debug!(path = %self.path.display(), "replaced content written");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// 前 8KB 出现 NUL 字节即视为二进制
pub fn is_likely_binary(path: &Path) -> io::Result<bool> {
    let mut preview = [0u8; BINARY_PROBE_SIZE];
    let mut file = File::open(path)?;
    let n = file.read(&mut preview)?;
    Ok(preview[..n].contains(&0))
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;
