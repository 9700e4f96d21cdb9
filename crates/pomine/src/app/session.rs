//! Session persistence utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::app::selection::{SelectionMode, SelectionState};

const SESSION_DIR: &str = ".pomine";
const SESSION_FILE: &str = "session.json";

/// Snapshot of interactive selection state persisted between sessions.
///
/// Snapshots are bound to the fragment collection they were taken against;
/// a stale snapshot is ignored rather than applied to reshuffled indices.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub mode: String,
    pub threshold: Option<usize>,
    pub members: Vec<usize>,
    pub whitelist: Vec<usize>,
    pub blacklist: Vec<usize>,
    /// Log file the session was working on.
    pub log_path: Option<String>,
    /// Fingerprint of the fragment collection the indices refer to.
    pub collection_fingerprint: u64,
}

impl SessionSnapshot {
    /// Record the current selection against a collection fingerprint.
    pub fn capture(
        selection: &SelectionState,
        collection_fingerprint: u64,
        log_path: Option<&Path>,
    ) -> Self {
        let parts = selection.accessors();
        Self {
            mode: selection.mode().as_str().to_string(),
            threshold: selection.threshold(),
            members: parts.members.iter().copied().collect(),
            whitelist: parts.whitelist.iter().copied().collect(),
            blacklist: parts.blacklist.iter().copied().collect(),
            log_path: log_path.map(|path| path.display().to_string()),
            collection_fingerprint,
        }
    }

    /// Whether this snapshot was taken against the given collection.
    pub fn matches(&self, collection_fingerprint: u64) -> bool {
        self.collection_fingerprint == collection_fingerprint
    }

    /// Rebuild the selection this snapshot recorded. Unknown mode strings
    /// fall back to the default mode.
    pub fn restore(&self) -> SelectionState {
        let mode = self.mode.parse::<SelectionMode>().unwrap_or_default();
        let mut selection = SelectionState::new(mode);
        selection.set_threshold(self.threshold);
        for &index in &self.members {
            selection.add(index);
        }
        for &index in &self.whitelist {
            selection.whitelist_add(index);
        }
        for &index in &self.blacklist {
            selection.blacklist_add(index);
        }
        selection
    }
}

/// Persists selection state to a session file under `.pomine/`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
    path: PathBuf,
}

impl SessionStore {
    /// Create a new store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let path = root.join(SESSION_DIR).join(SESSION_FILE);
        Self { root, path }
    }

    /// Location of the persisted session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the most recently persisted snapshot, if any.
    pub fn load(&self) -> Result<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file at {}", self.path.display()))?;
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("invalid session data in {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    /// Persist the snapshot, creating parent directories as needed.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let dir = self.path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create session directory {}", dir.display()))?;

        let data = serde_json::to_string_pretty(snapshot)
            .context("failed to serialize session snapshot")?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write session file to {}", self.path.display()))?;
        Ok(())
    }
}
