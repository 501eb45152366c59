//! The plan configuration engine.
//!
//! Reads flow from the [`Catalog`](crate::models::Catalog) through
//! [`aggregate`] and [`filter`]; writes go through a [`PlanSession`], which
//! owns the [`SelectionStore`] and re-derives the configuration, limit status
//! and recommendation after every accepted change.

mod aggregate;
mod limit;
mod recommend;
mod search;
mod selection;
mod session;

#[cfg(test)]
mod test_support;

pub use aggregate::aggregate;
pub use limit::{evaluate, LimitStatus};
pub use recommend::{recommend, recommendation_state, trim_set, upgrade_targets, Recommendation};
pub use search::{filter, recommended, CategoryScope, FeatureFilter};
pub use selection::{SelectionReader, SelectionStore, SelectionWriter};
pub use session::{PlanHandle, PlanSession, PlanView};
