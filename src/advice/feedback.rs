use std::collections::BTreeMap;

use crate::foundation::math::clamp01;

/// Historical acceptance counts of one pattern for one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedbackStats {
    /// Times the user kept the pattern.
    pub accepted: u32,
    /// Times the user undid or replaced it.
    pub rejected: u32,
}

impl FeedbackStats {
    /// Laplace-smoothed acceptance rate; `0.5` with no history.
    pub fn weight(&self) -> f64 {
        let accepted = f64::from(self.accepted);
        (accepted + 1.0) / (accepted + f64::from(self.rejected) + 2.0)
    }
}

/// Repository of acceptance statistics keyed by target and pattern.
pub trait FeedbackStore {
    /// Stats for `(target_id, pattern_id)`, if any were recorded.
    fn get(&self, target_id: &str, pattern_id: &str) -> Option<FeedbackStats>;
    /// Replace the stats for `(target_id, pattern_id)`.
    fn put(&mut self, target_id: &str, pattern_id: &str, stats: FeedbackStats);
}

/// Process-local store.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InMemoryFeedbackStore {
    entries: BTreeMap<String, BTreeMap<String, FeedbackStats>>,
}

impl InMemoryFeedbackStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded `(target, pattern)` pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn get(&self, target_id: &str, pattern_id: &str) -> Option<FeedbackStats> {
        self.entries.get(target_id)?.get(pattern_id).copied()
    }

    fn put(&mut self, target_id: &str, pattern_id: &str, stats: FeedbackStats) {
        self.entries
            .entry(target_id.to_string())
            .or_default()
            .insert(pattern_id.to_string(), stats);
    }
}

/// Acceptance weight for `(target_id, pattern_id)`; `0.5` without a store or history.
pub fn feedback_weight(
    store: Option<&dyn FeedbackStore>,
    target_id: &str,
    pattern_id: &str,
) -> f64 {
    store
        .and_then(|s| s.get(target_id, pattern_id))
        .map_or(0.5, |stats| stats.weight())
}

/// Shift `confidence` by at most `bias / 2` towards the historical acceptance rate.
pub fn biased_confidence(confidence: f64, weight: f64, bias: f64) -> f64 {
    clamp01(confidence + (weight - 0.5) * bias)
}

/// Count one user decision about a pattern.
pub fn record_decision(
    store: &mut dyn FeedbackStore,
    target_id: &str,
    pattern_id: &str,
    accepted: bool,
) -> FeedbackStats {
    let mut stats = store.get(target_id, pattern_id).unwrap_or_default();
    if accepted {
        stats.accepted = stats.accepted.saturating_add(1);
    } else {
        stats.rejected = stats.rejected.saturating_add(1);
    }
    store.put(target_id, pattern_id, stats);
    tracing::debug!(target_id, pattern_id, accepted, weight = stats.weight(), "decision recorded");
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/advice/feedback.rs"]
mod tests;
