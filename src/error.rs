//! Error types for the plan engine.

use thiserror::Error;

use crate::models::{SessionState, Tier};

/// Failures of plan session operations.
///
/// Every variant except [`PlanError::Inconsistent`] is a recoverable caller
/// error: the operation that returned it had no effect on the session.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("feature not found in catalog: {0}")]
    UnknownFeature(String),

    #[error("feature {feature_id} requires the {required} tier (active tier is {active})")]
    TierMismatch {
        feature_id: String,
        required: Tier,
        active: Tier,
    },

    #[error("cannot switch to the {target} tier while selected features require a higher tier: {}", blocking.join(", "))]
    InvalidTierDowngrade { target: Tier, blocking: Vec<String> },

    #[error("cannot upgrade from the {from} tier to the {to} tier")]
    InvalidUpgrade { from: Tier, to: Tier },

    #[error("plan exceeds the {tier} tier limit by {excess_count} feature(s)")]
    PlanOverLimit { tier: Tier, excess_count: usize },

    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("session has been submitted and no longer accepts changes")]
    SessionClosed,

    #[error("a submission is already in progress")]
    SubmissionInProgress,

    #[error("failed to persist plan submission: {0}")]
    Persistence(String),

    /// A selected id no longer resolves against the catalog. The selection
    /// store guards against this, so reaching it means an invariant was
    /// bypassed; totals computed past this point would be wrong.
    #[error("selection references feature missing from catalog: {0}")]
    Inconsistent(String),
}

impl PlanError {
    /// Whether the error indicates a broken engine invariant rather than a
    /// rejected command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Inconsistent(_))
    }
}

/// Failures building a [`crate::models::Catalog`].
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("duplicate feature id: {0}")]
    DuplicateFeature(String),

    #[error("feature {feature_id} references unknown category {category_id}")]
    UnknownCategory {
        feature_id: String,
        category_id: String,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
