//! Suggestion scanning: replaying unselected fragments against the model.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::app::selection::SelectionState;
use crate::domain::fragment::FragmentCollection;
use crate::domain::net::PetriNet;
use crate::synth::replay::TokenReplayValidator;
use crate::synth::FiringValidator;

/// Per-fragment outcome of a suggestion scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Part of the effective set; nothing to suggest.
    Selected,
    /// Carries an override, so the scan leaves it alone.
    Forced,
    /// Replays fully against the published model.
    Suggested,
    NotSuggested,
}

/// Immutable scan result, swapped in wholesale after each evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionReport {
    verdicts: Vec<Verdict>,
}

impl SuggestionReport {
    pub fn from_verdicts(verdicts: Vec<Verdict>) -> Self {
        Self { verdicts }
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Out-of-range indices read as not suggested.
    pub fn verdict(&self, index: usize) -> Verdict {
        self.verdicts
            .get(index)
            .copied()
            .unwrap_or(Verdict::NotSuggested)
    }

    pub fn is_suggested(&self, index: usize) -> bool {
        self.verdict(index) == Verdict::Suggested
    }

    pub fn suggested_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|verdict| **verdict == Verdict::Suggested)
            .count()
    }

    /// Patch a single verdict in place, e.g. after an override was cleared.
    pub fn set(&mut self, index: usize, verdict: Verdict) {
        if let Some(slot) = self.verdicts.get_mut(index) {
            *slot = verdict;
        }
    }
}

/// Replays every unselected, unforced fragment against the published model.
///
/// A replay error counts as "not suggested" rather than aborting the scan;
/// one odd fragment must not take the whole report down.
pub struct SuggestionEvaluator {
    validator: Arc<dyn FiringValidator>,
}

impl Default for SuggestionEvaluator {
    fn default() -> Self {
        Self {
            validator: Arc::new(TokenReplayValidator),
        }
    }
}

impl SuggestionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: Arc<dyn FiringValidator>) -> Self {
        Self { validator }
    }

    /// Scan the whole collection and build a fresh report.
    pub fn evaluate(
        &self,
        fragments: &FragmentCollection,
        selection: &SelectionState,
        model: &PetriNet,
    ) -> SuggestionReport {
        let effective = selection.effective_set();
        let verdicts: Vec<Verdict> = (0..fragments.len())
            .into_par_iter()
            .map(|index| self.verdict_for(fragments, selection, &effective, model, index))
            .collect();
        let report = SuggestionReport { verdicts };
        debug!(
            fragments = fragments.len(),
            suggested = report.suggested_count(),
            "suggestion scan finished"
        );
        report
    }

    /// Re-evaluate one fragment, used between an override clear and the next
    /// full scan.
    pub fn evaluate_one(
        &self,
        fragments: &FragmentCollection,
        selection: &SelectionState,
        model: &PetriNet,
        index: usize,
    ) -> Verdict {
        let effective = selection.effective_set();
        self.verdict_for(fragments, selection, &effective, model, index)
    }

    fn verdict_for(
        &self,
        fragments: &FragmentCollection,
        selection: &SelectionState,
        effective: &BTreeSet<usize>,
        model: &PetriNet,
        index: usize,
    ) -> Verdict {
        if effective.contains(&index) {
            return Verdict::Selected;
        }
        if selection.override_of(index).is_some() {
            return Verdict::Forced;
        }
        if model.is_empty() {
            return Verdict::NotSuggested;
        }
        let Some(fragment) = fragments.get(index) else {
            return Verdict::NotSuggested;
        };
        match self.validator.validate(model, &fragment.order) {
            Ok(verdicts) if verdicts.iter().all(|verdict| verdict.valid) => Verdict::Suggested,
            Ok(_) => Verdict::NotSuggested,
            Err(error) => {
                debug!(index, %error, "replay failed, fragment not suggested");
                Verdict::NotSuggested
            }
        }
    }
}
