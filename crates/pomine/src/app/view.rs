//! Read-model projection of fragments, selection state, and suggestions.

use crate::app::selection::{OverrideState, SelectionState};
use crate::app::suggest::SuggestionReport;
use crate::domain::fragment::FragmentCollection;

/// Events shown per fragment preview before truncation.
const PREVIEW_EVENTS: usize = 6;

/// Display status of a fragment row, in descending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStatus {
    ForcedIncluded,
    ForcedExcluded,
    Included,
    Suggested,
    Excluded,
}

impl FragmentStatus {
    /// Single-character marker for the list column.
    pub fn marker(&self) -> &'static str {
        match self {
            FragmentStatus::ForcedIncluded => "+",
            FragmentStatus::ForcedExcluded => "-",
            FragmentStatus::Included => "x",
            FragmentStatus::Suggested => "?",
            FragmentStatus::Excluded => " ",
        }
    }

    pub fn is_included(&self) -> bool {
        matches!(
            self,
            FragmentStatus::Included | FragmentStatus::ForcedIncluded
        )
    }
}

/// One rendered fragment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRow {
    pub index: usize,
    pub preview: String,
    pub frequency: u64,
    /// Running frequency sum down the ranked list.
    pub cumulative: u64,
    pub status: FragmentStatus,
}

/// Everything the fragment list and summary panels need, derived fresh after
/// each state change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentView {
    pub rows: Vec<FragmentRow>,
    pub total_weight: u64,
    pub max_weight: u64,
}

impl FragmentView {
    pub fn project(
        fragments: &FragmentCollection,
        selection: &SelectionState,
        report: &SuggestionReport,
    ) -> Self {
        let effective = selection.effective_set();
        let mut cumulative = 0;
        let rows = fragments
            .fragments()
            .iter()
            .map(|fragment| {
                cumulative += fragment.frequency;
                let status = match selection.override_of(fragment.index) {
                    Some(OverrideState::ForceInclude) => FragmentStatus::ForcedIncluded,
                    Some(OverrideState::ForceExclude) => FragmentStatus::ForcedExcluded,
                    None if effective.contains(&fragment.index) => FragmentStatus::Included,
                    None if report.is_suggested(fragment.index) => FragmentStatus::Suggested,
                    None => FragmentStatus::Excluded,
                };
                FragmentRow {
                    index: fragment.index,
                    preview: fragment.order.preview(PREVIEW_EVENTS),
                    frequency: fragment.frequency,
                    cumulative,
                    status,
                }
            })
            .collect();
        Self {
            rows,
            total_weight: fragments.total_weight(),
            max_weight: fragments.max_weight(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Combined frequency of everything currently included.
    pub fn included_weight(&self) -> u64 {
        self.rows
            .iter()
            .filter(|row| row.status.is_included())
            .map(|row| row.frequency)
            .sum()
    }
}
