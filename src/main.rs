use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feature_planner::config::PlannerConfig;
use feature_planner::engine::{filter, SelectionWriter};
use feature_planner::models::Tier;
use feature_planner::render::{render_plan, render_recommendation};
use feature_planner::{MemoryStore, PlanSession, SubmissionStore};

#[derive(Parser)]
#[command(name = "fplan")]
#[command(about = "Configure feature plans: tiered selection, limits and estimates")]
struct Cli {
    /// Catalog JSON file (overrides config and FEATURE_PLANNER_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Submission database (overrides config and FEATURE_PLANNER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog features, optionally filtered
    Catalog {
        /// Case-insensitive match against feature names
        #[arg(short, long, default_value = "")]
        query: String,

        /// Category id, or "all"
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Build a plan from a selection and optionally submit it
    Plan {
        /// Starting tier: mvp, advanced or premium
        #[arg(short, long, default_value = "mvp", value_parser = parse_tier)]
        tier: Tier,

        /// Feature ids in selection order
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<String>,

        /// Also select every recommended feature the tier unlocks
        #[arg(long)]
        recommended: bool,

        /// Drop the most recently selected features if over the limit
        #[arg(long, conflicts_with = "upgrade")]
        trim: bool,

        /// Upgrade to this tier if over the limit
        #[arg(long, value_parser = parse_tier)]
        upgrade: Option<Tier>,

        /// Finalize and submit the plan
        #[arg(long)]
        submit: bool,

        /// Submit to an in-memory store instead of the database
        #[arg(long, requires = "submit")]
        dry_run: bool,

        /// Print the plan view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show submitted plans
    History {
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Rank features by how often they were submitted
        #[arg(long)]
        popular: bool,
    },
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    Tier::from_str(s).ok_or_else(|| format!("unknown tier '{}' (expected mvp, advanced or premium)", s))
}

/// Initialize tracing on stderr so stdout carries command output only
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "feature_planner=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = PlannerConfig::load().with_overrides(cli.catalog, cli.db);

    match cli.command {
        Commands::Catalog { query, category } => {
            let catalog = config.load_catalog()?;
            for feature in filter(&catalog, &query, category.as_deref()) {
                let category = catalog
                    .category(&feature.category_id)
                    .map(|c| c.name.as_str())
                    .unwrap_or("?");
                println!(
                    "{:<24} {:<16} {:<9} {:>8} {:>6}d{}",
                    feature.id,
                    category,
                    feature.tier,
                    feature.cost.normalize(),
                    feature.time_estimate.normalize(),
                    if feature.recommended { "  *" } else { "" }
                );
            }
        }
        Commands::Plan {
            tier,
            select,
            recommended,
            trim,
            upgrade,
            submit,
            dry_run,
            json,
        } => {
            let catalog = Arc::new(config.load_catalog()?);
            let mut session = PlanSession::with_tier(catalog.clone(), tier);

            for id in &select {
                session.add_feature(id)?;
            }
            if recommended {
                session.select_recommended()?;
            }
            if session.limit_status().is_exceeded() {
                if trim {
                    let dropped = session.trim_to_limit()?;
                    tracing::info!("Trimmed {} feature(s): {}", dropped.len(), dropped.join(", "));
                } else if let Some(target) = upgrade {
                    session.upgrade_tier(target)?;
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&session.view())?);
            } else {
                print!("{}", render_plan(&catalog, session.configuration()));
                print!("{}", render_recommendation(&catalog, &session.recommendation()));
            }

            if submit {
                session.finalize()?;
                let store: Box<dyn SubmissionStore> = if dry_run {
                    Box::new(MemoryStore::new())
                } else {
                    Box::new(config.open_database()?)
                };
                let submission = session.submit(store.as_ref()).await?;
                println!("Submitted plan {}", submission.id);
            }
        }
        Commands::History { limit, popular } => {
            let db = config.open_database()?;
            if popular {
                for entry in db.feature_popularity(limit)? {
                    println!("{:>5}  {} ({})", entry.submissions, entry.feature_id, entry.category_id);
                }
            } else {
                for summary in db.list_submissions(limit).context("Failed to list submissions")? {
                    println!(
                        "{}  {}  {:<9} {:>3} features  {:>10}  {:>6}d",
                        summary.submitted_at.format("%Y-%m-%d %H:%M"),
                        summary.id,
                        summary.tier,
                        summary.feature_count,
                        summary.total_cost.normalize(),
                        summary.total_time.normalize()
                    );
                }
            }
        }
    }

    Ok(())
}
