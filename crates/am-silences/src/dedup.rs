//! Duplicate filtering against the silences the server already holds.
//!
//! A candidate group is dropped when a non-expired silence with an equal matcher
//! set exists. Filtering is a pure two-pass function: decide keep/skip for every
//! candidate, then build new lists.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, SilenceError};
use crate::types::{MatcherGroup, Silence};

/// A candidate that was dropped because an equal silence is still active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDuplicate {
    /// The dropped candidate.
    pub group: MatcherGroup,
    /// Id of the active silence it duplicates.
    pub silence_id: Option<String>,
}

/// Result of filtering candidates against the active silences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    fresh: Vec<MatcherGroup>,
    skipped: Vec<SkippedDuplicate>,
}

impl FilterOutcome {
    /// Candidates without an active equivalent, in input order.
    #[must_use]
    pub fn fresh(&self) -> &[MatcherGroup] {
        &self.fresh
    }

    /// Candidates dropped as duplicates, in input order.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedDuplicate] {
        &self.skipped
    }

    /// Consume the outcome, returning the groups to submit.
    ///
    /// # Errors
    ///
    /// Returns `SilenceError::NoNewSilences` if every candidate was a duplicate.
    pub fn into_fresh(self) -> Result<Vec<MatcherGroup>> {
        if self.fresh.is_empty() {
            return Err(SilenceError::NoNewSilences);
        }
        Ok(self.fresh)
    }
}

/// Split `candidates` into fresh groups and duplicates of silences active at `now`.
///
/// # Errors
///
/// Returns `SilenceError::NoMatchersSpecified` if `candidates` is empty.
pub fn filter_duplicates(
    candidates: Vec<MatcherGroup>,
    existing: &[Silence],
    now: DateTime<Utc>,
) -> Result<FilterOutcome> {
    if candidates.is_empty() {
        return Err(SilenceError::NoMatchersSpecified);
    }

    let decisions: Vec<Option<Option<String>>> = candidates
        .iter()
        .map(|group| {
            existing
                .iter()
                .find(|silence| silence.is_active_at(now) && silence.matchers == *group)
                .map(|silence| silence.id.clone())
        })
        .collect();

    let mut outcome = FilterOutcome::default();
    for (group, duplicate_of) in candidates.into_iter().zip(decisions) {
        match duplicate_of {
            Some(silence_id) => {
                debug!(matchers = %group, silence_id = ?silence_id, "Skipping duplicate silence");
                outcome.skipped.push(SkippedDuplicate { group, silence_id });
            }
            None => outcome.fresh.push(group),
        }
    }

    Ok(outcome)
}
