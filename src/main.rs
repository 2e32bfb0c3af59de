use clap::Parser;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use zfind::kernel::services::adapters::load_settings;
use zfind::{
    CancelFlagMonitor, DirectoryScope, FilterOptions, FindError, FindReplace, FindRequest,
    FindSettings, SearchResult,
};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "zfind", version, about = "Find and replace text across files")]
struct Cli {
    /// Text or regular expression to look for
    pattern: String,

    /// Files or directories to search
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Replace every match with this text (`$1`/`${name}` expand in regex mode)
    #[arg(short, long)]
    replace: Option<String>,

    /// Treat the pattern as a regular expression
    #[arg(short = 'e', long)]
    regex: bool,

    #[arg(short = 's', long)]
    case_sensitive: bool,

    /// Only match whole words
    #[arg(short, long)]
    word: bool,

    /// Include hidden files and directories
    #[arg(long)]
    hidden: bool,

    /// Do not honor .gitignore and related ignore files
    #[arg(long)]
    no_ignore: bool,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Print one JSON object per match
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn settings(&self, base: FindSettings) -> FindSettings {
        FindSettings {
            max_workers: self.threads.or(base.max_workers),
            hidden: self.hidden || base.hidden,
            git_ignore: base.git_ignore && !self.no_ignore,
            ..base
        }
    }

    fn request(&self) -> FindRequest {
        let filter = FilterOptions {
            regex_search: self.regex,
            case_sensitive: self.case_sensitive,
            whole_words_only: self.word,
        };
        match &self.replace {
            Some(r) => FindRequest::replace(self.pattern.clone(), r.clone(), filter),
            None => FindRequest::find(self.pattern.clone(), filter),
        }
    }
}

#[derive(Serialize)]
struct MatchLine<'a> {
    path: &'a Path,
    line: usize,
    column: usize,
    offset: usize,
    length: usize,
    text: &'a str,
}

/// 1-based 行号与字符列，以及所在行的文本
///
/// 内容是运行结束后重新读取的，文件可能已被改动：offset 向前收敛到 char 边界。
fn locate(content: &str, offset: usize) -> (usize, usize, &str) {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = content[offset..]
        .find('\n')
        .map_or(content.len(), |i| offset + i);
    let line = content[..line_start].matches('\n').count() + 1;
    let column = content[line_start..offset].chars().count() + 1;
    let text = content[line_start..line_end].trim_end_matches('\r');
    (line, column, text)
}

fn print_matches(results: &[SearchResult], json: bool) -> io::Result<()> {
    let mut by_path: BTreeMap<&Path, Vec<&SearchResult>> = BTreeMap::new();
    for r in results {
        by_path.entry(r.path.as_path()).or_default().push(r);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (path, matches) in by_path {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot reread file");
                continue;
            }
        };
        for m in matches {
            let (line, column, text) = locate(&content, m.offset);
            if json {
                let record = MatchLine {
                    path,
                    line,
                    column,
                    offset: m.offset,
                    length: m.length,
                    text,
                };
                let encoded = serde_json::to_string(&record).map_err(io::Error::other)?;
                writeln!(out, "{encoded}")?;
            } else {
                writeln!(out, "{}:{}:{}: {}", path.display(), line, column, text)?;
            }
        }
    }
    out.flush()
}

fn print_summary(results: &[SearchResult], json: bool) -> io::Result<()> {
    // 不同文件的结果按完成顺序到达
    let files: BTreeSet<&Path> = results.iter().map(|r| r.path.as_path()).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let summary = serde_json::json!({
            "replaced": results.len(),
            "files": files,
        });
        writeln!(out, "{summary}")?;
    } else {
        for path in &files {
            writeln!(out, "{}", path.display())?;
        }
        writeln!(
            out,
            "replaced {} occurrence(s) in {} file(s)",
            results.len(),
            files.len()
        )?;
    }
    out.flush()
}

#[cfg(unix)]
fn install_cancel_signals(flag: &Arc<AtomicBool>) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};

    signal_hook::flag::register(SIGINT, flag.clone())?;
    signal_hook::flag::register(SIGTERM, flag.clone())?;
    Ok(())
}

#[cfg(not(unix))]
fn install_cancel_signals(_flag: &Arc<AtomicBool>) -> io::Result<()> {
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = cli.settings(load_settings().unwrap_or_default());
    let _logging = logging::init(settings.log_dir.as_deref());

    let cancelled = Arc::new(AtomicBool::new(false));
    if let Err(e) = install_cancel_signals(&cancelled) {
        tracing::warn!(error = %e, "cannot install signal handlers");
    }

    let request = cli.request();
    if let Err(e) = FindReplace::validate_pattern(&request.filter, &request.pattern) {
        eprintln!("zfind: {e}");
        return ExitCode::from(2);
    }

    let scope = DirectoryScope::from_settings(cli.paths.clone(), &settings);
    let engine = FindReplace::new(settings);
    let monitor = CancelFlagMonitor::with_flag(cancelled.clone());
    let sink = |path: &Path, error: &FindError| {
        tracing::warn!(path = %path.display(), error = %error, "file skipped");
        eprintln!("zfind: {}: {}", path.display(), error);
    };

    let results = match engine.find_all(&scope, &request, &monitor, &sink) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("zfind: {e}");
            return ExitCode::from(2);
        }
    };

    let printed = if request.is_replace() {
        print_summary(&results, cli.json)
    } else {
        print_matches(&results, cli.json)
    };
    if let Err(e) = printed {
        // 下游管道关闭时静默退出
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("zfind: {e}");
            return ExitCode::from(2);
        }
    }

    tracing::info!(
        files = engine.searched_files_count(),
        matches = engine.found_matches_count(),
        "done"
    );

    if cancelled.load(Ordering::Relaxed) {
        ExitCode::from(130)
    } else if results.is_empty() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
