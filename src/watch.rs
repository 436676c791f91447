//! Poll-based file watching and the autoreload coordinator.
//!
//! Watching is plain stat-and-sleep polling: one blocking, single-threaded
//! loop, one `fs::metadata` call per watched path per round, a fixed
//! one-second backoff between unsuccessful rounds. No OS notification
//! mechanism is involved.
//!
//! # Coordinator
//!
//! ```text
//! WATCHING ──(change)──► REBUILDING ──► WATCHING ── ...
//! ```
//!
//! The loop has no terminal state; the process is stopped from outside.
//! A failed rebuild is logged and skipped, and watching resumes; only
//! the initial batch build treats those failures as fatal.

use crate::compiler::Compiler;
use crate::config::ProjectConfig;
use crate::log;
use anyhow::{Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, SystemTime},
};

/// Fixed backoff between unsuccessful poll rounds.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// File Watcher
// ============================================================================

/// Modification-time cursor over one or more paths.
///
/// The first poll after (re)initialization only establishes baselines and
/// never reports a change. Each later poll reports the first path whose
/// mtime grew past its baseline, updating that baseline, so one
/// modification yields exactly one report.
pub struct FileWatcher {
    entries: Vec<WatchEntry>,
}

struct WatchEntry {
    path: PathBuf,
    baseline: Option<SystemTime>,
}

impl FileWatcher {
    /// Watch a single path.
    pub fn single(path: PathBuf) -> Self {
        Self::multi(vec![path])
    }

    /// Watch a set of paths; index 0 is the primary input.
    pub fn multi(paths: Vec<PathBuf>) -> Self {
        let entries = paths
            .into_iter()
            .map(|path| WatchEntry {
                path,
                baseline: None,
            })
            .collect();
        Self { entries }
    }

    /// Scan every watched path once.
    ///
    /// Returns the first newly-modified path, or `None` when nothing
    /// changed; the caller sleeps on `None`. A path that cannot be
    /// stat'ed is treated as unchanged; the next rebuild recomputes the
    /// watch-set anyway.
    pub fn poll(&mut self) -> Option<PathBuf> {
        let mut modified = None;
        for entry in &mut self.entries {
            let Some(mtime) = mtime(&entry.path) else {
                continue;
            };
            match entry.baseline {
                // Avoid reporting a change right after start
                None => entry.baseline = Some(mtime),
                Some(baseline) if mtime > baseline && modified.is_none() => {
                    entry.baseline = Some(mtime);
                    modified = Some(entry.path.clone());
                }
                _ => {}
            }
        }
        modified
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

// ============================================================================
// Autoreload Coordinator
// ============================================================================

/// What the coordinator watches between rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only the primary input triggers rebuilds.
    #[allow(dead_code)]
    InputOnly,
    /// The whole watch-set is replaced with each rebuild's return value,
    /// so assets can appear and disappear between edits.
    TrackAssets,
}

/// Drive the watcher and re-run the build pipeline on every change.
///
/// `watch_set` is the previous build's return value; its first element is
/// the primary input. Loops until the process is stopped.
pub fn autoreload(
    compiler: &Compiler,
    watch_set: Vec<PathBuf>,
    output: &Path,
    config: &ProjectConfig,
    presenter: Option<&str>,
    mode: Mode,
) -> Result<()> {
    let input = watch_set
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("autoreload needs a non-empty watch-set"))?;

    let mut watcher = match mode {
        Mode::InputOnly => FileWatcher::single(input.clone()),
        Mode::TrackAssets => {
            log!("watch"; "watching {} paths", watch_set.len());
            FileWatcher::multi(watch_set)
        }
    };

    loop {
        let Some(modified) = watcher.poll() else {
            thread::sleep(POLL_INTERVAL);
            continue;
        };

        log!("watch"; "modified {}, updating", display_name(&modified));
        match compiler.build(&input, output, config, presenter) {
            Ok(fresh) if mode == Mode::TrackAssets => {
                // Fresh watcher: baselines re-establish on its first poll
                log!("watch"; "watching {} paths", fresh.len());
                watcher = FileWatcher::multi(fresh);
            }
            Ok(_) => {}
            // One failed rebuild does not stop the loop
            Err(err) => log!("error"; "rebuild failed: {err:#}"),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

// ============================================================================
// Tests
// ============================================================================
