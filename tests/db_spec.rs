use chrono::{Duration, Utc};
use feature_planner::db::Database;
use feature_planner::engine::{aggregate, SelectionStore};
use feature_planner::models::*;
use feature_planner::SubmissionStore;
use rust_decimal::Decimal;
use speculate2::speculate;
use uuid::Uuid;

fn catalog() -> Catalog {
    let category = |id: &str, name: &str| FeatureCategory {
        id: id.to_string(),
        name: name.to_string(),
        icon: None,
        description: None,
    };
    let feature = |id: &str, category_id: &str, tier: Tier, cost: i64, tenths: i64| Feature {
        id: id.to_string(),
        category_id: category_id.to_string(),
        name: id.to_string(),
        description: None,
        tier,
        cost: Decimal::from(cost),
        time_estimate: Decimal::new(tenths, 1),
        recommended: false,
    };

    Catalog::new(
        vec![category("auth", "Authentication"), category("billing", "Billing")],
        vec![
            feature("login", "auth", Tier::Mvp, 500, 20),
            feature("sso", "auth", Tier::Advanced, 2000, 55),
            feature("invoices", "billing", Tier::Mvp, 750, 35),
        ],
    )
    .expect("valid catalog")
}

fn submission(tier: Tier, ids: &[&str]) -> PlanSubmission {
    let catalog = catalog();
    let mut selection = SelectionStore::new(tier);
    for id in ids {
        selection.add(&catalog, id).expect("selectable feature");
    }
    PlanSubmission::new(aggregate(&catalog, &selection).expect("consistent selection"))
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "migrate" {
        it "brings a new database to the latest schema" {
            let fresh = Database::open_memory().expect("Failed to create in-memory database");
            assert_eq!(fresh.schema_version().expect("Query failed"), None);

            fresh.migrate().expect("Failed to run migrations");

            assert_eq!(db.schema_version().expect("Query failed"), Some(2));
            assert_eq!(fresh.schema_version().expect("Query failed"), Some(2));
        }
    }

    describe "insert_submission" {
        it "stores a submission that reads back unchanged" {
            let saved = submission(Tier::Advanced, &["sso", "login", "invoices"]);
            db.insert_submission(&saved).expect("Failed to insert");

            let found = db.get_submission(saved.id).expect("Query failed").expect("Submission missing");

            assert_eq!(found, saved);
            assert_eq!(found.configuration.total_cost, Decimal::from(3250));
            assert_eq!(found.configuration.total_time, Decimal::new(110, 1));
            assert_eq!(found.configuration.selected_ids().collect::<Vec<_>>(), vec!["sso", "login", "invoices"]);
        }

        it "rejects the same submission twice" {
            let saved = submission(Tier::Mvp, &["login"]);
            db.insert_submission(&saved).expect("Failed to insert");

            assert!(db.insert_submission(&saved).is_err());
            assert_eq!(db.list_submissions(10).expect("Query failed").len(), 1);
        }

        it "stores an empty plan" {
            let saved = submission(Tier::Mvp, &[]);
            db.insert_submission(&saved).expect("Failed to insert");

            let found = db.get_submission(saved.id).expect("Query failed").expect("Submission missing");
            assert_eq!(found.configuration.selected_count(), 0);
            assert!(found.configuration.per_category_breakdown.is_empty());
        }
    }

    describe "get_submission" {
        it "returns None for an unknown id" {
            let result = db.get_submission(Uuid::new_v4()).expect("Query failed");
            assert!(result.is_none());
        }
    }

    describe "list_submissions" {
        it "returns summaries newest first" {
            let mut older = submission(Tier::Mvp, &["login"]);
            older.submitted_at = Utc::now() - Duration::hours(2);
            let newer = submission(Tier::Advanced, &["login", "sso"]);

            db.insert_submission(&older).expect("Failed to insert");
            db.insert_submission(&newer).expect("Failed to insert");

            let summaries = db.list_submissions(10).expect("Query failed");

            assert_eq!(summaries.len(), 2);
            assert_eq!(summaries[0].id, newer.id);
            assert_eq!(summaries[0].tier, Tier::Advanced);
            assert_eq!(summaries[0].feature_count, 2);
            assert_eq!(summaries[0].total_cost, Decimal::from(2500));
            assert_eq!(summaries[1].id, older.id);
            assert_eq!(summaries[1].submitted_at, older.submitted_at);
        }

        it "honors the limit" {
            for _ in 0..3 {
                db.insert_submission(&submission(Tier::Mvp, &["login"])).expect("Failed to insert");
            }

            assert_eq!(db.list_submissions(2).expect("Query failed").len(), 2);
        }
    }

    describe "feature_popularity" {
        it "ranks features by how many submissions include them" {
            db.insert_submission(&submission(Tier::Mvp, &["login", "invoices"])).expect("Failed to insert");
            db.insert_submission(&submission(Tier::Advanced, &["sso", "login"])).expect("Failed to insert");
            db.insert_submission(&submission(Tier::Mvp, &["invoices", "login"])).expect("Failed to insert");

            let ranking = db.feature_popularity(10).expect("Query failed");
            let counts: Vec<(&str, i64)> = ranking
                .iter()
                .map(|p| (p.feature_id.as_str(), p.submissions))
                .collect();

            assert_eq!(counts, vec![("login", 3), ("invoices", 2), ("sso", 1)]);
            assert_eq!(ranking[0].category_id, "auth");
        }
    }

    describe "delete_submission" {
        it "removes the submission and its feature rows" {
            let saved = submission(Tier::Mvp, &["login", "invoices"]);
            db.insert_submission(&saved).expect("Failed to insert");

            assert!(db.delete_submission(saved.id).expect("Delete failed"));

            assert!(db.get_submission(saved.id).expect("Query failed").is_none());
            assert!(db.feature_popularity(10).expect("Query failed").is_empty());
        }

        it "returns false for an unknown id" {
            assert!(!db.delete_submission(Uuid::new_v4()).expect("Delete failed"));
        }
    }

    describe "submission store" {
        it "persists through the store interface" {
            let saved = submission(Tier::Mvp, &["invoices"]);

            tokio_test::block_on(db.save(&saved)).expect("Failed to save");

            let summaries = db.list_submissions(10).expect("Query failed");
            assert_eq!(summaries.len(), 1);
            assert_eq!(summaries[0].id, saved.id);
        }
    }
}
