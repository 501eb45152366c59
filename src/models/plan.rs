use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::Feature;
use super::tier::Tier;

/// Derived view of a selection: resolved features and their totals.
///
/// Always produced by [`crate::engine::aggregate`] and never mutated, so the
/// totals cannot drift from the selection they were computed from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanConfiguration {
    /// Selected features in selection order.
    pub selected_features: Vec<Feature>,
    pub total_cost: Decimal,
    /// Total delivery estimate in days.
    pub total_time: Decimal,
    /// Keyed by category id, in catalog category order. Only categories with
    /// at least one selected feature appear.
    pub per_category_breakdown: IndexMap<String, CategoryBreakdown>,
    pub tier: Tier,
    pub over_limit: bool,
}

impl PlanConfiguration {
    /// Configuration of an empty selection.
    pub fn empty(tier: Tier) -> Self {
        Self {
            selected_features: Vec::new(),
            total_cost: Decimal::ZERO,
            total_time: Decimal::ZERO,
            per_category_breakdown: IndexMap::new(),
            tier,
            over_limit: false,
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected_features.len()
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected_features.iter().map(|f| f.id.as_str())
    }
}

/// Per-category subtotal within a [`PlanConfiguration`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub selected_count: usize,
    pub time_subtotal: Decimal,
    pub cost_subtotal: Decimal,
}

/// A finalized plan handed to the persistence collaborator.
///
/// The configuration is a deep copy taken at submission time; later changes
/// to the originating session never reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSubmission {
    pub id: Uuid,
    pub configuration: PlanConfiguration,
    pub submitted_at: DateTime<Utc>,
}

impl PlanSubmission {
    pub fn new(configuration: PlanConfiguration) -> Self {
        Self {
            id: Uuid::new_v4(),
            configuration,
            submitted_at: Utc::now(),
        }
    }
}

/// Minimal submission info used for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub tier: Tier,
    pub feature_count: usize,
    pub total_cost: Decimal,
    pub total_time: Decimal,
    pub submitted_at: DateTime<Utc>,
}

impl From<&PlanSubmission> for SubmissionSummary {
    fn from(submission: &PlanSubmission) -> Self {
        let config = &submission.configuration;
        Self {
            id: submission.id,
            tier: config.tier,
            feature_count: config.selected_count(),
            total_cost: config.total_cost,
            total_time: config.total_time,
            submitted_at: submission.submitted_at,
        }
    }
}
