//! Feature plan configuration engine.
//!
//! Users browse a catalog of product features grouped by category and tier,
//! build a selection, and receive derived cost and delivery estimates. The
//! entry-level tier caps the number of features; exceeding it drives an
//! upgrade-or-trim recommendation, and a plan can only be submitted once it
//! fits its tier.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod render;
pub mod store;

pub use engine::{PlanHandle, PlanSession, PlanView, SelectionReader, SelectionWriter};
pub use error::{CatalogError, PlanError};
pub use store::{MemoryStore, SubmissionStore};
