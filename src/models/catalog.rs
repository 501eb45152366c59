use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tier::Tier;
use crate::error::CatalogError;

/// A grouping of related features, e.g. "Authentication" or "Payments".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureCategory {
    pub id: String,
    pub name: String,
    /// Icon reference understood by the UI layer.
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A selectable product feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minimum tier that unlocks this feature.
    pub tier: Tier,
    /// Build cost in currency units.
    pub cost: Decimal,
    /// Delivery estimate in (fractional) days.
    pub time_estimate: Decimal,
    #[serde(default)]
    pub recommended: bool,
}

/// Raw catalog shape as supplied by the catalog provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub categories: Vec<FeatureCategory>,
    pub features: Vec<Feature>,
}

/// Immutable, validated registry of categories and features.
///
/// Category order is the authoring order of `categories` and is what every
/// ordered output of the engine follows. Feature and category ids are unique
/// and every feature belongs to a known category.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "CatalogData")]
pub struct Catalog {
    categories: Vec<FeatureCategory>,
    features: Vec<Feature>,
    feature_index: HashMap<String, usize>,
    category_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(
        categories: Vec<FeatureCategory>,
        features: Vec<Feature>,
    ) -> Result<Self, CatalogError> {
        let mut category_index = HashMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if category_index.insert(category.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
        }

        let mut feature_index = HashMap::with_capacity(features.len());
        for (position, feature) in features.iter().enumerate() {
            if !category_index.contains_key(&feature.category_id) {
                return Err(CatalogError::UnknownCategory {
                    feature_id: feature.id.clone(),
                    category_id: feature.category_id.clone(),
                });
            }
            if feature_index.insert(feature.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateFeature(feature.id.clone()));
            }
        }

        Ok(Self {
            categories,
            features,
            feature_index,
            category_index,
        })
    }

    /// Parse and validate a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(CatalogError::from)
    }

    /// The catalog compiled into the binary, used when no catalog file is configured.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../../data/catalog.json"))
    }

    pub fn categories(&self) -> &[FeatureCategory] {
        &self.categories
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.feature_index.get(id).map(|&i| &self.features[i])
    }

    pub fn category(&self, id: &str) -> Option<&FeatureCategory> {
        self.category_index.get(id).map(|&i| &self.categories[i])
    }

    /// Authoring position of a category, used as the primary sort key.
    pub fn category_position(&self, id: &str) -> Option<usize> {
        self.category_index.get(id).copied()
    }

    pub fn features_in_category<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features
            .iter()
            .filter(move |f| f.category_id == category_id)
    }
}

impl TryFrom<CatalogData> for Catalog {
    type Error = CatalogError;

    fn try_from(data: CatalogData) -> Result<Self, Self::Error> {
        Catalog::new(data.categories, data.features)
    }
}
