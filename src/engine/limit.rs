use serde::{Deserialize, Serialize};

use crate::models::PlanConfiguration;

/// Outcome of checking a configuration against its tier ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LimitStatus {
    WithinLimit,
    Exceeded { excess_count: usize },
}

impl LimitStatus {
    pub fn excess_count(&self) -> usize {
        match self {
            Self::WithinLimit => 0,
            Self::Exceeded { excess_count } => *excess_count,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, Self::Exceeded { .. })
    }
}

pub fn evaluate(configuration: &PlanConfiguration) -> LimitStatus {
    match configuration.tier.max_feature_count() {
        Some(limit) if configuration.over_limit => LimitStatus::Exceeded {
            excess_count: configuration.selected_count().saturating_sub(limit),
        },
        _ => LimitStatus::WithinLimit,
    }
}
