//! Log file watching for live reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

/// Watches a single log file and coalesces change notifications.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by replacing the file are still observed.
pub struct LogWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
    path: PathBuf,
}

impl LogWatcher {
    pub fn new(path: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let file_name: Option<OsString> = path.file_name().map(|name| name.to_os_string());
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            if let Ok(event) = result
                && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                && event
                    .paths
                    .iter()
                    .any(|changed| changed.file_name() == file_name.as_deref())
            {
                let _ = tx.send(());
            }
        })
        .context("failed to initialize file watcher")?;

        let target = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        watcher
            .watch(target, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", target.display()))?;
        debug!(path = %path.display(), "watching log file");

        Ok(Self {
            _watcher: watcher,
            rx,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file changed since the last call. Drains the queue so a
    /// burst of filesystem events reads as one change.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};

    #[test]
    fn reports_changes_to_the_watched_file_only() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.log");
        let other = dir.path().join("other.txt");
        fs::write(&log, "a b\n").unwrap();

        // Platforms without a watcher backend skip this test.
        let Ok(watcher) = LogWatcher::new(&log) else {
            return;
        };
        assert!(!watcher.changed());

        fs::write(&other, "noise").unwrap();
        fs::write(&log, "a b\na c\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while Instant::now() < deadline {
            if watcher.changed() {
                seen = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(seen, "expected a change notification for the log file");
    }
}
