//! Insertion-ordered selection of feature ids and the active tier.

use indexmap::IndexSet;

use crate::error::PlanError;
use crate::models::{Catalog, Tier};

/// Read access to a selection.
pub trait SelectionReader {
    fn active_tier(&self) -> Tier;

    /// Selected ids in the order they were first added.
    fn selected_ids(&self) -> Vec<&str>;

    fn is_selected(&self, feature_id: &str) -> bool;

    fn selected_count(&self) -> usize;
}

/// Commands that change a selection.
pub trait SelectionWriter {
    fn add_feature(&mut self, feature_id: &str) -> Result<(), PlanError>;

    fn remove_feature(&mut self, feature_id: &str) -> Result<(), PlanError>;

    fn set_tier(&mut self, tier: Tier) -> Result<(), PlanError>;

    fn clear(&mut self) -> Result<(), PlanError>;
}

/// The only mutable state of a plan: which features are chosen, in what
/// order, under which tier.
///
/// Selection order is tracked because trimming drops the most recently added
/// features first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore {
    ids: IndexSet<String>,
    tier: Tier,
}

impl SelectionStore {
    pub fn new(tier: Tier) -> Self {
        Self {
            ids: IndexSet::new(),
            tier,
        }
    }

    /// Insert a feature, keeping its original position if already selected.
    ///
    /// Returns whether the selection changed.
    pub fn add(&mut self, catalog: &Catalog, feature_id: &str) -> Result<bool, PlanError> {
        let feature = catalog
            .feature(feature_id)
            .ok_or_else(|| PlanError::UnknownFeature(feature_id.to_string()))?;

        if !self.tier.unlocks(feature.tier) {
            return Err(PlanError::TierMismatch {
                feature_id: feature.id.clone(),
                required: feature.tier,
                active: self.tier,
            });
        }

        Ok(self.ids.insert(feature.id.clone()))
    }

    /// Remove a feature, preserving the order of the rest. Returns whether it
    /// was selected.
    pub fn remove(&mut self, feature_id: &str) -> bool {
        self.ids.shift_remove(feature_id)
    }

    /// Switch tiers. A downgrade that would strand selected features above
    /// the new tier is rejected outright; nothing is pruned.
    pub fn set_tier(&mut self, catalog: &Catalog, tier: Tier) -> Result<(), PlanError> {
        let mut blocking = Vec::new();
        for id in &self.ids {
            let feature = catalog
                .feature(id)
                .ok_or_else(|| PlanError::Inconsistent(id.clone()))?;
            if !tier.unlocks(feature.tier) {
                blocking.push(id.clone());
            }
        }

        if !blocking.is_empty() {
            return Err(PlanError::InvalidTierDowngrade {
                target: tier,
                blocking,
            });
        }

        self.tier = tier;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop the most recently added features until at most `limit` remain.
    ///
    /// Returns the dropped ids, most recent first.
    pub fn truncate_to(&mut self, limit: usize) -> Vec<String> {
        let mut dropped = Vec::new();
        while self.ids.len() > limit {
            match self.ids.pop() {
                Some(id) => dropped.push(id),
                None => break,
            }
        }
        dropped
    }

    pub fn ids(&self) -> &IndexSet<String> {
        &self.ids
    }
}

impl SelectionReader for SelectionStore {
    fn active_tier(&self) -> Tier {
        self.tier
    }

    fn selected_ids(&self) -> Vec<&str> {
        self.ids.iter().map(String::as_str).collect()
    }

    fn is_selected(&self, feature_id: &str) -> bool {
        self.ids.contains(feature_id)
    }

    fn selected_count(&self) -> usize {
        self.ids.len()
    }
}
