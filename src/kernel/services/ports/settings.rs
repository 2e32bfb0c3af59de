use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PROGRESS_STEPS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindSettings {
    #[serde(default = "default_progress_steps")]
    pub progress_steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_true")]
    pub git_ignore: bool,
    #[serde(default = "default_true")]
    pub skip_binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_progress_steps() -> usize {
    DEFAULT_PROGRESS_STEPS
}

fn default_true() -> bool {
    true
}

impl Default for FindSettings {
    fn default() -> Self {
        Self {
            progress_steps: DEFAULT_PROGRESS_STEPS,
            max_workers: None,
            hidden: false,
            git_ignore: true,
            skip_binary: true,
            log_dir: None,
        }
    }
}

impl FindSettings {
    /// 实际使用的 worker 数：配置值优先，否则取宿主并行度；至少为 1
    pub fn worker_count(&self) -> usize {
        self.max_workers
            .filter(|n| *n > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
    }

    /// 进度步长：`max(1, total_work / progress_steps)`
    pub fn step_size(&self, total_work: usize) -> usize {
        (total_work / self.progress_steps.max(1)).max(1)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
