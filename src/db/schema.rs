//! Versioned schema for the submission store.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};

/// A forward-only schema step. Each step commits together with its
/// `schema_migrations` row, so a failed step leaves no trace.
struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Step {
        version: 2,
        name: "submission_features",
        sql: include_str!("migrations/002_submission_features.sql"),
    },
];

/// Bring the schema up to date, applying pending steps in version order.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = applied_versions(conn)?;
    let pending: Vec<&Step> = STEPS
        .iter()
        .filter(|step| !applied.contains(&step.version))
        .collect();

    if pending.is_empty() {
        tracing::debug!("submission schema is current");
        return Ok(());
    }
    for step in pending {
        apply(conn, step)?;
    }
    Ok(())
}

/// Highest applied step, `None` on a database that was never migrated.
pub fn current_version(conn: &Connection) -> Result<Option<u32>> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !exists {
        return Ok(None);
    }

    let version = conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
        row.get::<_, Option<u32>>(0)
    })?;
    Ok(version)
}

fn applied_versions(conn: &Connection) -> Result<BTreeSet<u32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<BTreeSet<u32>, _>>()?;
    Ok(versions)
}

fn apply(conn: &Connection, step: &Step) -> Result<()> {
    tracing::info!(version = step.version, name = step.name, "applying schema migration");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(step.sql)
        .with_context(|| format!("Failed to apply migration {} ({})", step.version, step.name))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (
            step.version,
            step.name,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    )?;
    tx.commit()?;
    Ok(())
}
