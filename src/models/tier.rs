use serde::{Deserialize, Serialize};

/// Feature-count ceiling of the entry-level tier.
pub const MVP_FEATURE_LIMIT: usize = 10;

/// A named eligibility level gating which features may be selected.
///
/// Tiers are totally ordered: `Mvp < Advanced < Premium`. A feature's tier is
/// the *minimum* tier that unlocks it, so a feature is selectable whenever
/// `feature.tier <= active_tier`.
///
/// - `Mvp`: entry level, capped at [`MVP_FEATURE_LIMIT`] features
/// - `Advanced`: unlimited
/// - `Premium`: unlimited
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Mvp,
    Advanced,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Mvp, Tier::Advanced, Tier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mvp => "mvp",
            Self::Advanced => "advanced",
            Self::Premium => "premium",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mvp" => Some(Self::Mvp),
            "advanced" => Some(Self::Advanced),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Human-readable name shown in upgrade prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mvp => "MVP",
            Self::Advanced => "Advanced",
            Self::Premium => "Premium",
        }
    }

    /// Maximum number of selected features, `None` meaning unlimited.
    pub fn max_feature_count(&self) -> Option<usize> {
        match self {
            Self::Mvp => Some(MVP_FEATURE_LIMIT),
            Self::Advanced | Self::Premium => None,
        }
    }

    /// Whether a feature requiring `required` can be selected under this tier.
    pub fn unlocks(&self, required: Tier) -> bool {
        required <= *self
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
