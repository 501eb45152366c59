//! Plain-text rendering of plan configurations.

use crate::engine::Recommendation;
use crate::models::{Catalog, PlanConfiguration, RecommendationState, Tier};

const MVP: char = '○';
const ADVANCED: char = '◆';
const PREMIUM: char = '★';

/// Get the symbol for the tier a feature requires.
fn tier_symbol(tier: Tier) -> char {
    match tier {
        Tier::Mvp => MVP,
        Tier::Advanced => ADVANCED,
        Tier::Premium => PREMIUM,
    }
}

/// Render a configuration grouped by category, followed by totals.
///
/// Example output:
/// ```text
/// Authentication (2 features, 7 days)
/// ├── ○ Email Login: 500 / 2 days
/// └── ◆ Enterprise SSO: 2000 / 5 days
/// Payments (1 feature, 4 days)
/// └── ○ Checkout: 1200 / 4 days
///
/// Tier: advanced
/// Total: 3700 over 11 days
/// ```
pub fn render_plan(catalog: &Catalog, config: &PlanConfiguration) -> String {
    let mut output = String::new();

    for (category_id, breakdown) in &config.per_category_breakdown {
        let name = catalog
            .category(category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(category_id.as_str());
        output.push_str(&format!(
            "{} ({}, {} days)\n",
            name,
            plural(breakdown.selected_count, "feature"),
            breakdown.time_subtotal.normalize()
        ));

        let features: Vec<_> = config
            .selected_features
            .iter()
            .filter(|f| f.category_id == *category_id)
            .collect();
        for (i, feature) in features.iter().enumerate() {
            let branch = if i == features.len() - 1 { "└── " } else { "├── " };
            output.push_str(branch);
            output.push(tier_symbol(feature.tier));
            output.push(' ');
            output.push_str(&format!(
                "{}: {} / {} days\n",
                feature.name,
                feature.cost.normalize(),
                feature.time_estimate.normalize()
            ));
        }
    }

    if !config.per_category_breakdown.is_empty() {
        output.push('\n');
    }
    output.push_str(&format!("Tier: {}\n", config.tier));
    output.push_str(&format!(
        "Total: {} over {} days\n",
        config.total_cost.normalize(),
        config.total_time.normalize()
    ));
    output
}

/// Render the upgrade/trim prompt, or nothing when within limits.
pub fn render_recommendation(catalog: &Catalog, rec: &Recommendation) -> String {
    if rec.state == RecommendationState::Normal {
        return String::new();
    }

    let mut output = format!(
        "Over the feature limit by {}.\n",
        plural(rec.excess_count, "feature")
    );
    if !rec.upgrade_targets.is_empty() {
        let labels: Vec<_> = rec.upgrade_targets.iter().map(|t| t.label()).collect();
        output.push_str(&format!("Upgrade to: {}\n", labels.join(", ")));
    }
    if !rec.trim_set.is_empty() {
        let names: Vec<_> = rec
            .trim_set
            .iter()
            .map(|id| catalog.feature(id).map(|f| f.name.as_str()).unwrap_or(id.as_str()))
            .collect();
        output.push_str(&format!("Or remove: {}\n", names.join(", ")));
    }
    output
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{aggregate, recommend, SelectionStore};
    use crate::models::{Feature, FeatureCategory};
    use rust_decimal::Decimal;

    fn catalog() -> Catalog {
        let feature = |id: &str, category: &str, name: &str, tier: Tier, cost: i64, tenths: i64| Feature {
            id: id.to_string(),
            category_id: category.to_string(),
            name: name.to_string(),
            description: None,
            tier,
            cost: Decimal::from(cost),
            time_estimate: Decimal::new(tenths, 1),
            recommended: false,
        };
        Catalog::new(
            vec![
                FeatureCategory {
                    id: "auth".into(),
                    name: "Authentication".into(),
                    icon: None,
                    description: None,
                },
                FeatureCategory {
                    id: "payments".into(),
                    name: "Payments".into(),
                    icon: None,
                    description: None,
                },
            ],
            vec![
                feature("login", "auth", "Email Login", Tier::Mvp, 500, 20),
                feature("sso", "auth", "Enterprise SSO", Tier::Advanced, 2000, 50),
                feature("checkout", "payments", "Checkout", Tier::Mvp, 1200, 40),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_plan() {
        let catalog = catalog();
        let config = aggregate(&catalog, &SelectionStore::new(Tier::Mvp)).unwrap();
        assert_eq!(render_plan(&catalog, &config), "Tier: mvp\nTotal: 0 over 0 days\n");
    }

    #[test]
    fn test_grouped_plan() {
        let catalog = catalog();
        let mut selection = SelectionStore::new(Tier::Advanced);
        for id in ["checkout", "login", "sso"] {
            selection.add(&catalog, id).unwrap();
        }
        let config = aggregate(&catalog, &selection).unwrap();

        let expected = "Authentication (2 features, 7 days)\n\
                        ├── ○ Email Login: 500 / 2 days\n\
                        └── ◆ Enterprise SSO: 2000 / 5 days\n\
                        Payments (1 feature, 4 days)\n\
                        └── ○ Checkout: 1200 / 4 days\n\
                        \n\
                        Tier: advanced\n\
                        Total: 3700 over 11 days\n";
        assert_eq!(render_plan(&catalog, &config), expected);
    }

    #[test]
    fn test_recommendation_prompt() {
        let rec = Recommendation {
            state: RecommendationState::LimitExceeded,
            excess_count: 2,
            upgrade_targets: vec![Tier::Advanced, Tier::Premium],
            trim_set: vec!["checkout".into(), "login".into()],
        };
        assert_eq!(
            render_recommendation(&catalog(), &rec),
            "Over the feature limit by 2 features.\nUpgrade to: Advanced, Premium\nOr remove: Checkout, Email Login\n"
        );
    }

    #[test]
    fn test_no_prompt_when_normal() {
        let catalog = catalog();
        let selection = SelectionStore::new(Tier::Mvp);
        let config = aggregate(&catalog, &selection).unwrap();
        assert!(render_recommendation(&catalog, &recommend(&config, &selection)).is_empty());
    }
}
