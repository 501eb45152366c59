//! Catalog narrowing by free-text query and category. Independent of any selection.

use crate::models::{Catalog, Feature, Tier};

/// Category restriction of a search. The UI sends `"all"` for no restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryScope {
    All,
    Only(String),
}

impl CategoryScope {
    pub fn parse(category_id: Option<&str>) -> Self {
        match category_id {
            None | Some("all") => Self::All,
            Some(id) => Self::Only(id.to_string()),
        }
    }

    fn admits(&self, feature: &Feature) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => feature.category_id == *id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureFilter {
    query: String,
    scope: CategoryScope,
}

impl FeatureFilter {
    pub fn new(query: &str, category_id: Option<&str>) -> Self {
        Self {
            query: query.to_lowercase(),
            scope: CategoryScope::parse(category_id),
        }
    }

    /// Name-only, case-insensitive substring match. Descriptions are not searched.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.scope.admits(feature)
            && (self.query.is_empty() || feature.name.to_lowercase().contains(&self.query))
    }

    /// Matching features ordered by catalog category order, then name.
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Feature> {
        let mut found: Vec<&Feature> = catalog
            .features()
            .iter()
            .filter(|f| self.matches(f))
            .collect();

        found.sort_by(|a, b| {
            let pos_a = catalog.category_position(&a.category_id);
            let pos_b = catalog.category_position(&b.category_id);
            pos_a
                .cmp(&pos_b)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });
        found
    }
}

pub fn filter<'a>(catalog: &'a Catalog, query: &str, category_id: Option<&str>) -> Vec<&'a Feature> {
    FeatureFilter::new(query, category_id).apply(catalog)
}

/// Recommended features unlockable at `tier`, in catalog order.
pub fn recommended(catalog: &Catalog, tier: Tier) -> Vec<&Feature> {
    catalog
        .features()
        .iter()
        .filter(|f| f.recommended && tier.unlocks(f.tier))
        .collect()
}
