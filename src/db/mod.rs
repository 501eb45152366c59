mod schema;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::*;
use crate::store::SubmissionStore;

/// SQLite-backed store of submitted plans.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// How often a feature appears across stored submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturePopularity {
    pub feature_id: String,
    pub category_id: String,
    pub submissions: i64,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "feature-planner")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("plans.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();
        schema::migrate(&conn)
    }

    /// Applied schema version, `None` before the first [`migrate`](Self::migrate).
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let conn = self.conn.lock();
        schema::current_version(&conn)
    }

    // ============================================================
    // Submission operations
    // ============================================================

    pub fn insert_submission(&self, submission: &PlanSubmission) -> Result<()> {
        let config = &submission.configuration;
        let json = serde_json::to_string(config).context("Failed to serialize configuration")?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO plan_submissions (id, tier, feature_count, total_cost, total_time, configuration, submitted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                submission.id.to_string(),
                config.tier.as_str(),
                config.selected_count() as i64,
                config.total_cost.to_string(),
                config.total_time.to_string(),
                &json,
                submission.submitted_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ),
        )?;

        for (position, feature) in config.selected_features.iter().enumerate() {
            tx.execute(
                "INSERT INTO submission_features (submission_id, position, feature_id, category_id)
                 VALUES (?, ?, ?, ?)",
                (
                    submission.id.to_string(),
                    position as i64,
                    &feature.id,
                    &feature.category_id,
                ),
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn get_submission(&self, id: Uuid) -> Result<Option<PlanSubmission>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT configuration, submitted_at FROM plan_submissions WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let configuration: PlanConfiguration =
            serde_json::from_str(&row.get::<_, String>(0)?)
                .context("Stored configuration is not valid JSON")?;

        Ok(Some(PlanSubmission {
            id,
            configuration,
            submitted_at: parse_datetime(&row.get::<_, String>(1)?)?,
        }))
    }

    /// Most recent submissions first.
    pub fn list_submissions(&self, limit: usize) -> Result<Vec<SubmissionSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, tier, feature_count, total_cost, total_time, submitted_at
             FROM plan_submissions ORDER BY submitted_at DESC LIMIT ?",
        )?;

        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, tier, count, cost, time, submitted_at)| {
                Ok(SubmissionSummary {
                    id: Uuid::parse_str(&id).context("Invalid submission id")?,
                    tier: Tier::from_str(&tier)
                        .ok_or_else(|| anyhow::anyhow!("Unknown tier in database: {}", tier))?,
                    feature_count: usize::try_from(count)?,
                    total_cost: parse_decimal(&cost)?,
                    total_time: parse_decimal(&time)?,
                    submitted_at: parse_datetime(&submitted_at)?,
                })
            })
            .collect()
    }

    /// Features ranked by how many submissions include them.
    pub fn feature_popularity(&self, limit: usize) -> Result<Vec<FeaturePopularity>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT feature_id, category_id, COUNT(*) AS submissions
             FROM submission_features
             GROUP BY feature_id, category_id
             ORDER BY submissions DESC, feature_id
             LIMIT ?",
        )?;

        let popularity = stmt
            .query_map([limit as i64], |row| {
                Ok(FeaturePopularity {
                    feature_id: row.get(0)?,
                    category_id: row.get(1)?,
                    submissions: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(popularity)
    }

    pub fn delete_submission(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM plan_submissions WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

#[async_trait]
impl SubmissionStore for Database {
    async fn save(&self, submission: &PlanSubmission) -> Result<()> {
        self.insert_submission(submission)
    }
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).with_context(|| format!("Invalid decimal in database: {}", s))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in database: {}", s))
}
