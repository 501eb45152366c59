//! Catalog fixtures shared by engine unit tests.

use rust_decimal::Decimal;

use crate::models::{Catalog, Feature, FeatureCategory, Tier};

fn category(id: &str, name: &str) -> FeatureCategory {
    FeatureCategory {
        id: id.to_string(),
        name: name.to_string(),
        icon: None,
        description: None,
    }
}

pub(crate) fn feature(
    id: &str,
    category_id: &str,
    name: &str,
    tier: Tier,
    cost: i64,
    time_tenths: i64,
) -> Feature {
    Feature {
        id: id.to_string(),
        category_id: category_id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} description")),
        tier,
        cost: Decimal::from(cost),
        time_estimate: Decimal::new(time_tenths, 1),
        recommended: false,
    }
}

/// `categories` categories of `per_category` mvp features each, ids `c{i}-f{j}`,
/// each costing 100 and taking half a day.
pub(crate) fn uniform_catalog(categories: usize, per_category: usize) -> Catalog {
    let cats = (0..categories)
        .map(|i| category(&format!("c{i}"), &format!("Category {i}")))
        .collect();
    let features = (0..categories)
        .flat_map(|i| {
            (0..per_category).map(move |j| {
                feature(
                    &format!("c{i}-f{j}"),
                    &format!("c{i}"),
                    &format!("Feature {i}.{j}"),
                    Tier::Mvp,
                    100,
                    5,
                )
            })
        })
        .collect();
    Catalog::new(cats, features).expect("fixture catalog is valid")
}

/// Small mixed-tier catalog resembling an agency product offering.
pub(crate) fn catalog_with_tiers() -> Catalog {
    let mut login = feature("login", "auth", "Email Login", Tier::Mvp, 500, 20);
    login.recommended = true;
    let mut checkout = feature("checkout", "payments", "Checkout", Tier::Mvp, 1200, 40);
    checkout.recommended = true;
    let mut theme = feature("theme", "branding", "Custom Theme", Tier::Mvp, 300, 10);
    theme.recommended = true;
    let mut sso = feature("sso", "auth", "Enterprise SSO", Tier::Advanced, 2000, 50);
    sso.recommended = true;

    Catalog::new(
        vec![
            category("auth", "Authentication"),
            category("payments", "Payments"),
            category("branding", "Branding"),
        ],
        vec![
            login,
            feature("oauth", "auth", "OAuth Providers", Tier::Mvp, 800, 30),
            sso,
            feature("two-factor", "auth", "Two-Factor Auth", Tier::Advanced, 900, 25),
            checkout,
            feature("subscriptions", "payments", "Subscriptions", Tier::Advanced, 1800, 60),
            feature("white-label", "branding", "White Label", Tier::Premium, 5000, 100),
            theme,
        ],
    )
    .expect("fixture catalog is valid")
}
