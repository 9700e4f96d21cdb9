//! Multi-mode selection over ranked fragments.

use std::collections::BTreeSet;
use std::str::FromStr;

/// How user actions translate into the effective index set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Arbitrary membership per index.
    Explicit,
    /// Everything up to a cumulative boundary index.
    Threshold,
    /// Threshold plus force-include/force-exclude overrides.
    #[default]
    ThresholdOverrides,
}

impl SelectionMode {
    /// Stable identifier for configuration and session files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Explicit => "explicit",
            SelectionMode::Threshold => "threshold",
            SelectionMode::ThresholdOverrides => "threshold-overrides",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = SelectionModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "explicit" | "set" => Ok(SelectionMode::Explicit),
            "threshold" => Ok(SelectionMode::Threshold),
            "threshold-overrides" | "overrides" => Ok(SelectionMode::ThresholdOverrides),
            other => Err(SelectionModeParseError::UnknownMode(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`SelectionMode`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SelectionModeParseError {
    #[error("unknown selection mode '{0}'")]
    UnknownMode(String),
}

/// A forced per-fragment override, trumping the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideState {
    ForceInclude,
    ForceExclude,
}

/// Tracks which fragment indices are candidates for modeling.
///
/// Mutators always record their data; only [`SelectionState::effective_set`]
/// interprets it according to the active mode. Indices must be clamped to the
/// current collection before they reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    mode: SelectionMode,
    members: BTreeSet<usize>,
    threshold: Option<usize>,
    whitelist: BTreeSet<usize>,
    blacklist: BTreeSet<usize>,
}

impl SelectionState {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch interpretation mode without touching recorded data.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    /// Clear all membership, threshold, and override data.
    pub fn reset(&mut self) {
        self.members.clear();
        self.threshold = None;
        self.whitelist.clear();
        self.blacklist.clear();
    }

    /// Replace the cumulative boundary. `None` means nothing is included by
    /// the threshold.
    pub fn set_threshold(&mut self, threshold: Option<usize>) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    pub fn add(&mut self, index: usize) {
        self.members.insert(index);
    }

    pub fn remove(&mut self, index: usize) {
        self.members.remove(&index);
    }

    pub fn toggle(&mut self, index: usize) {
        if !self.members.remove(&index) {
            self.members.insert(index);
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Force-include an index. The two override lists are mutually
    /// exclusive, so this also clears any force-exclude for the index.
    pub fn whitelist_add(&mut self, index: usize) {
        self.blacklist.remove(&index);
        self.whitelist.insert(index);
    }

    pub fn whitelist_remove(&mut self, index: usize) {
        self.whitelist.remove(&index);
    }

    /// Force-exclude an index, clearing any force-include for it.
    pub fn blacklist_add(&mut self, index: usize) {
        self.whitelist.remove(&index);
        self.blacklist.insert(index);
    }

    pub fn blacklist_remove(&mut self, index: usize) {
        self.blacklist.remove(&index);
    }

    /// Drop the index from whichever override list holds it.
    pub fn clear_override(&mut self, index: usize) {
        self.whitelist.remove(&index);
        self.blacklist.remove(&index);
    }

    pub fn override_of(&self, index: usize) -> Option<OverrideState> {
        if self.whitelist.contains(&index) {
            Some(OverrideState::ForceInclude)
        } else if self.blacklist.contains(&index) {
            Some(OverrideState::ForceExclude)
        } else {
            None
        }
    }

    /// The resolved index set under the active mode. Pure derivation; the
    /// result is compared as a set, never as a sequence.
    pub fn effective_set(&self) -> BTreeSet<usize> {
        match self.mode {
            SelectionMode::Explicit => self.members.clone(),
            SelectionMode::Threshold => match self.threshold {
                Some(threshold) => (0..=threshold).collect(),
                None => BTreeSet::new(),
            },
            SelectionMode::ThresholdOverrides => {
                let mut set: BTreeSet<usize> = match self.threshold {
                    Some(threshold) => (0..=threshold)
                        .filter(|index| !self.blacklist.contains(index))
                        .collect(),
                    None => BTreeSet::new(),
                };
                set.extend(self.whitelist.iter().copied());
                set
            }
        }
    }

    pub fn accessors(&self) -> SelectionSnapshotParts<'_> {
        SelectionSnapshotParts {
            members: &self.members,
            whitelist: &self.whitelist,
            blacklist: &self.blacklist,
        }
    }
}

/// Borrowed views of the recorded sets, used when persisting sessions.
#[derive(Debug, Clone, Copy)]
pub struct SelectionSnapshotParts<'a> {
    pub members: &'a BTreeSet<usize>,
    pub whitelist: &'a BTreeSet<usize>,
    pub blacklist: &'a BTreeSet<usize>,
}

/// Index selection for the headless surface: `all`, `none`, or a comma list
/// of indices and inclusive ranges such as `0,2-4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSpec {
    All,
    None,
    Indices(BTreeSet<usize>),
}

impl IndexSpec {
    /// Materialize against a collection of `len` fragments, dropping anything
    /// out of range.
    pub fn resolve(&self, len: usize) -> BTreeSet<usize> {
        match self {
            IndexSpec::All => (0..len).collect(),
            IndexSpec::None => BTreeSet::new(),
            IndexSpec::Indices(indices) => {
                indices.iter().copied().filter(|&i| i < len).collect()
            }
        }
    }
}

impl FromStr for IndexSpec {
    type Err = IndexSpecParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => return Err(IndexSpecParseError::Empty),
            "all" => return Ok(IndexSpec::All),
            "none" => return Ok(IndexSpec::None),
            _ => {}
        }
        let mut indices = BTreeSet::new();
        for token in trimmed.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.split_once('-') {
                Some((start, end)) => {
                    let start: usize = start
                        .trim()
                        .parse()
                        .map_err(|_| IndexSpecParseError::InvalidToken(token.to_string()))?;
                    let end: usize = end
                        .trim()
                        .parse()
                        .map_err(|_| IndexSpecParseError::InvalidToken(token.to_string()))?;
                    let (low, high) = (start.min(end), start.max(end));
                    indices.extend(low..=high);
                }
                None => {
                    let index: usize = token
                        .parse()
                        .map_err(|_| IndexSpecParseError::InvalidToken(token.to_string()))?;
                    indices.insert(index);
                }
            }
        }
        if indices.is_empty() {
            return Err(IndexSpecParseError::Empty);
        }
        Ok(IndexSpec::Indices(indices))
    }
}

/// Error returned when parsing an [`IndexSpec`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum IndexSpecParseError {
    #[error("empty index selection")]
    Empty,
    #[error("invalid index token '{0}'")]
    InvalidToken(String),
}
