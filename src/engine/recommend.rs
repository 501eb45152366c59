//! Upgrade-or-trim guidance when a selection outgrows its tier.

use serde::{Deserialize, Serialize};

use super::limit::{evaluate, LimitStatus};
use super::selection::SelectionStore;
use crate::models::{PlanConfiguration, RecommendationState, Tier};

/// What the UI should offer for the current selection.
///
/// Both `upgrade_targets` and `trim_set` are empty in the `Normal` state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub state: RecommendationState,
    pub excess_count: usize,
    /// Tiers that would lift the ceiling, lowest first.
    pub upgrade_targets: Vec<Tier>,
    /// Ids a trim would drop, most recently added first.
    pub trim_set: Vec<String>,
}

impl Recommendation {
    pub fn normal() -> Self {
        Self {
            state: RecommendationState::Normal,
            excess_count: 0,
            upgrade_targets: Vec::new(),
            trim_set: Vec::new(),
        }
    }
}

pub fn recommendation_state(configuration: &PlanConfiguration) -> RecommendationState {
    match evaluate(configuration) {
        LimitStatus::WithinLimit => RecommendationState::Normal,
        LimitStatus::Exceeded { .. } => RecommendationState::LimitExceeded,
    }
}

pub fn recommend(configuration: &PlanConfiguration, selection: &SelectionStore) -> Recommendation {
    let LimitStatus::Exceeded { excess_count } = evaluate(configuration) else {
        return Recommendation::normal();
    };

    Recommendation {
        state: RecommendationState::LimitExceeded,
        excess_count,
        upgrade_targets: upgrade_targets(configuration.tier),
        trim_set: trim_set(selection, excess_count),
    }
}

/// Tiers above `current` with no feature ceiling.
pub fn upgrade_targets(current: Tier) -> Vec<Tier> {
    Tier::ALL
        .into_iter()
        .filter(|tier| *tier > current && tier.max_feature_count().is_none())
        .collect()
}

/// The `excess_count` most recently added ids. Cost and the recommended flag
/// play no part; selection order alone decides.
pub fn trim_set(selection: &SelectionStore, excess_count: usize) -> Vec<String> {
    selection
        .ids()
        .iter()
        .rev()
        .take(excess_count)
        .cloned()
        .collect()
}
