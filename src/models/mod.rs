//! Domain models for the feature planner.
//!
//! # Core Concepts
//!
//! ## Catalog (immutable)
//!
//! - [`Catalog`]: validated registry of [`FeatureCategory`] and [`Feature`] entries,
//!   supplied once per session.
//! - [`Tier`]: eligibility level. A feature's tier is the minimum tier that unlocks it.
//!
//! ## Derived
//!
//! - [`PlanConfiguration`]: totals and per-category breakdown of the current selection.
//!   Recomputed after every mutation, never edited in place.
//! - [`PlanSubmission`]: snapshot of a configuration at submission time.
//!
//! ## Session
//!
//! - [`SessionState`]: browsing, reviewing, submitting, submitted.
//! - [`RecommendationState`]: whether the selection exceeds the tier ceiling.

mod catalog;
mod plan;
mod session;
mod tier;

pub use catalog::*;
pub use plan::*;
pub use session::*;
pub use tier::*;
