//! 搜索范围
//!
//! - DirectoryScope: 使用 ignore crate 的并行遍历，遵守 .gitignore，跳过二进制文件
//! - FileListScope: 显式给出的文件列表
//! - BufferScope: 已打开的内存缓冲区

use crate::kernel::services::adapters::file::{
    is_likely_binary, LocalFileProvider, MemoryFileProvider,
};
use crate::kernel::services::ports::find::{FileProvider, FilterOptions, Result, Scope};
use crate::kernel::services::ports::settings::FindSettings;
use ignore::{WalkBuilder, WalkState};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

fn describe(pattern: &str, replacement: Option<&str>, target: &str) -> String {
    match replacement {
        Some(r) => format!("Replacing '{pattern}' with '{r}' in {target}"),
        None => format!("Looking for '{pattern}' in {target}"),
    }
}

/// 遍历一个或多个根目录；完整的遍历结果在第一次使用时缓存，`total_work` 与 `files` 看到同一份列表
pub struct DirectoryScope {
    roots: Vec<PathBuf>,
    hidden: bool,
    git_ignore: bool,
    skip_binary: bool,
    walked: OnceLock<Vec<PathBuf>>,
}

impl DirectoryScope {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_roots(vec![root.into()])
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        let defaults = FindSettings::default();
        Self {
            roots,
            hidden: defaults.hidden,
            git_ignore: defaults.git_ignore,
            skip_binary: defaults.skip_binary,
            walked: OnceLock::new(),
        }
    }

    pub fn from_settings(roots: Vec<PathBuf>, settings: &FindSettings) -> Self {
        Self::with_roots(roots)
            .hidden(settings.hidden)
            .git_ignore(settings.git_ignore)
            .skip_binary(settings.skip_binary)
    }

    pub fn hidden(mut self, yes: bool) -> Self {
        self.hidden = yes;
        self
    }

    pub fn git_ignore(mut self, yes: bool) -> Self {
        self.git_ignore = yes;
        self
    }

    pub fn skip_binary(mut self, yes: bool) -> Self {
        self.skip_binary = yes;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// 被取消打断的遍历不完整，不写入缓存
    fn paths(&self, cancelled: &(dyn Fn() -> bool + Sync)) -> Cow<'_, [PathBuf]> {
        if let Some(paths) = self.walked.get() {
            return Cow::Borrowed(paths);
        }

        let paths = self.walk(cancelled);
        if cancelled() {
            return Cow::Owned(paths);
        }
        Cow::Borrowed(self.walked.get_or_init(|| paths))
    }

    fn walk(&self, cancelled: &(dyn Fn() -> bool + Sync)) -> Vec<PathBuf> {
        let Some((first, rest)) = self.roots.split_first() else {
            return Vec::new();
        };

        let mut builder = WalkBuilder::new(first);
        for root in rest {
            builder.add(root);
        }
        let walker = builder
            .hidden(!self.hidden)
            .git_ignore(self.git_ignore)
            .git_global(self.git_ignore)
            .git_exclude(self.git_ignore)
            .require_git(false)
            .build_parallel();

        let found = Mutex::new(Vec::new());
        walker.run(|| {
            let found = &found;
            Box::new(move |entry| {
                if cancelled() {
                    return WalkState::Quit;
                }

                let entry = match entry {
                    Ok(e) => e,
                    Err(err) => {
                        tracing::warn!(error = %err, "walk error");
                        return WalkState::Continue;
                    }
                };
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    return WalkState::Continue;
                }

                let path = entry.path();
                if self.skip_binary && is_likely_binary(path).unwrap_or(false) {
                    return WalkState::Continue;
                }

                found
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(path.to_path_buf());
                WalkState::Continue
            })
        });

        let mut paths = found.into_inner().unwrap_or_else(PoisonError::into_inner);
        paths.sort();
        tracing::debug!(files = paths.len(), "directory scope walked");
        paths
    }
}

impl Scope for DirectoryScope {
    fn files(
        &self,
        cancelled: &(dyn Fn() -> bool + Sync),
        _filter: &FilterOptions,
    ) -> Result<Vec<Box<dyn FileProvider>>> {
        Ok(self
            .paths(cancelled)
            .iter()
            .map(|p| Box::new(LocalFileProvider::new(p)) as Box<dyn FileProvider>)
            .collect())
    }

    fn total_work(&self, _filter: &FilterOptions) -> usize {
        self.paths(&|| false).len()
    }

    fn description(
        &self,
        _filter: &FilterOptions,
        pattern: &str,
        replacement: Option<&str>,
    ) -> String {
        let target = self
            .roots
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        describe(pattern, replacement, &target)
    }
}

pub struct FileListScope {
    paths: Vec<PathBuf>,
}

impl FileListScope {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }
}

impl Scope for FileListScope {
    fn files(
        &self,
        _cancelled: &(dyn Fn() -> bool + Sync),
        _filter: &FilterOptions,
    ) -> Result<Vec<Box<dyn FileProvider>>> {
        Ok(self
            .paths
            .iter()
            .map(|p| Box::new(LocalFileProvider::new(p)) as Box<dyn FileProvider>)
            .collect())
    }

    fn total_work(&self, _filter: &FilterOptions) -> usize {
        self.paths.len()
    }

    fn description(
        &self,
        _filter: &FilterOptions,
        pattern: &str,
        replacement: Option<&str>,
    ) -> String {
        describe(pattern, replacement, "selected files")
    }
}

pub struct BufferScope {
    buffers: Vec<MemoryFileProvider>,
}

impl BufferScope {
    pub fn new(buffers: Vec<MemoryFileProvider>) -> Self {
        Self { buffers }
    }
}

impl Scope for BufferScope {
    fn files(
        &self,
        _cancelled: &(dyn Fn() -> bool + Sync),
        _filter: &FilterOptions,
    ) -> Result<Vec<Box<dyn FileProvider>>> {
        Ok(self
            .buffers
            .iter()
            .map(|b| Box::new(b.clone()) as Box<dyn FileProvider>)
            .collect())
    }

    fn total_work(&self, _filter: &FilterOptions) -> usize {
        self.buffers.len()
    }

    fn description(
        &self,
        _filter: &FilterOptions,
        pattern: &str,
        replacement: Option<&str>,
    ) -> String {
        describe(pattern, replacement, "open documents")
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/find/scope.rs"]
mod tests;
