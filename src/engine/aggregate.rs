//! Projection of a selection onto the catalog: totals and per-category subtotals.

use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::selection::{SelectionReader, SelectionStore};
use crate::error::PlanError;
use crate::models::{CategoryBreakdown, Catalog, PlanConfiguration};

/// Compute the [`PlanConfiguration`] for `selection` from scratch.
///
/// A selected id missing from the catalog aborts with
/// [`PlanError::Inconsistent`] instead of being skipped, since dropping it
/// would silently understate the totals.
pub fn aggregate(
    catalog: &Catalog,
    selection: &SelectionStore,
) -> Result<PlanConfiguration, PlanError> {
    let selected_features = selection
        .ids()
        .iter()
        .map(|id| {
            catalog
                .feature(id)
                .cloned()
                .ok_or_else(|| PlanError::Inconsistent(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_cost = selected_features.iter().map(|f| f.cost).sum::<Decimal>();
    let total_time = selected_features
        .iter()
        .map(|f| f.time_estimate)
        .sum::<Decimal>();

    let mut per_category_breakdown = IndexMap::new();
    for category in catalog.categories() {
        let mut breakdown = CategoryBreakdown::default();
        for feature in selected_features
            .iter()
            .filter(|f| f.category_id == category.id)
        {
            breakdown.selected_count += 1;
            breakdown.time_subtotal += feature.time_estimate;
            breakdown.cost_subtotal += feature.cost;
        }
        if breakdown.selected_count > 0 {
            per_category_breakdown.insert(category.id.clone(), breakdown);
        }
    }

    let tier = selection.active_tier();
    let over_limit = tier
        .max_feature_count()
        .is_some_and(|limit| selected_features.len() > limit);

    Ok(PlanConfiguration {
        selected_features,
        total_cost,
        total_time,
        per_category_breakdown,
        tier,
        over_limit,
    })
}
