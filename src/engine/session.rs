//! Plan session orchestration: browsing, review and submission.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use super::aggregate::aggregate;
use super::limit::{evaluate, LimitStatus};
use super::recommend::{recommend, recommendation_state, Recommendation};
use super::search;
use super::selection::{SelectionReader, SelectionStore, SelectionWriter};
use crate::error::PlanError;
use crate::models::{
    Catalog, Feature, PlanConfiguration, PlanSubmission, RecommendationState, SessionState, Tier,
};
use crate::store::SubmissionStore;

/// Everything the UI layer needs after a change.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub state: SessionState,
    pub configuration: PlanConfiguration,
    pub recommendation: Recommendation,
}

/// A single user's plan-building session over a fixed catalog.
///
/// The session owns its selection exclusively. Every accepted mutation
/// recomputes the configuration from scratch and republishes a [`PlanView`]
/// to subscribers. Selection changes are only accepted while browsing.
pub struct PlanSession {
    id: Uuid,
    catalog: Arc<Catalog>,
    selection: SelectionStore,
    configuration: PlanConfiguration,
    state: SessionState,
    views: watch::Sender<PlanView>,
}

impl PlanSession {
    /// Start an empty session on the entry-level tier.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_tier(catalog, Tier::Mvp)
    }

    pub fn with_tier(catalog: Arc<Catalog>, tier: Tier) -> Self {
        let selection = SelectionStore::new(tier);
        let configuration = PlanConfiguration::empty(tier);
        let (views, _) = watch::channel(PlanView {
            state: SessionState::Browsing,
            configuration: configuration.clone(),
            recommendation: Recommendation::normal(),
        });

        let id = Uuid::new_v4();
        tracing::debug!(session = %id, tier = %tier, "plan session started");

        Self {
            id,
            catalog,
            selection,
            configuration,
            state: SessionState::Browsing,
            views,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn configuration(&self) -> &PlanConfiguration {
        &self.configuration
    }

    pub fn limit_status(&self) -> LimitStatus {
        evaluate(&self.configuration)
    }

    pub fn recommendation_state(&self) -> RecommendationState {
        recommendation_state(&self.configuration)
    }

    pub fn recommendation(&self) -> Recommendation {
        recommend(&self.configuration, &self.selection)
    }

    pub fn view(&self) -> PlanView {
        PlanView {
            state: self.state,
            configuration: self.configuration.clone(),
            recommendation: self.recommendation(),
        }
    }

    /// Receive a fresh [`PlanView`] after every accepted change.
    pub fn subscribe(&self) -> watch::Receiver<PlanView> {
        self.views.subscribe()
    }

    /// Search the session's catalog. Never touches the selection.
    pub fn search(&self, query: &str, category_id: Option<&str>) -> Vec<&Feature> {
        search::filter(&self.catalog, query, category_id)
    }

    // ============================================================
    // Limit handling
    // ============================================================

    /// Move to an unlimited tier, leaving the limit-exceeded state if in it.
    ///
    /// Upgrading to the current tier is a no-op.
    pub fn upgrade_tier(&mut self, target: Tier) -> Result<(), PlanError> {
        self.ensure_browsing("upgrade tier")?;

        let current = self.selection.active_tier();
        if target < current || target.max_feature_count().is_some() {
            return Err(PlanError::InvalidUpgrade {
                from: current,
                to: target,
            });
        }
        self.mutate("upgrade tier", |selection, catalog| {
            selection.set_tier(catalog, target)
        })
    }

    /// Drop the most recently added features until the tier ceiling holds.
    ///
    /// Returns the dropped ids, most recent first; empty when already within
    /// the limit.
    pub fn trim_to_limit(&mut self) -> Result<Vec<String>, PlanError> {
        self.mutate("trim selection", |selection, _| {
            Ok(match selection.active_tier().max_feature_count() {
                Some(limit) => selection.truncate_to(limit),
                None => Vec::new(),
            })
        })
    }

    /// Add every recommended feature the active tier unlocks. Returns the ids
    /// that were newly selected.
    pub fn select_recommended(&mut self) -> Result<Vec<String>, PlanError> {
        self.mutate("select recommended features", |selection, catalog| {
            let candidates: Vec<String> = search::recommended(catalog, selection.active_tier())
                .into_iter()
                .map(|f| f.id.clone())
                .collect();
            let mut added = Vec::new();
            for id in candidates {
                if selection.add(catalog, &id)? {
                    added.push(id);
                }
            }
            Ok(added)
        })
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    /// Freeze the selection for review. Refused while over the tier limit.
    pub fn finalize(&mut self) -> Result<(), PlanError> {
        self.ensure_browsing("finalize")?;

        if let LimitStatus::Exceeded { excess_count } = self.limit_status() {
            tracing::warn!(session = %self.id, excess_count, "finalize rejected: plan over limit");
            return Err(PlanError::PlanOverLimit {
                tier: self.configuration.tier,
                excess_count,
            });
        }

        self.transition(SessionState::Reviewing);
        Ok(())
    }

    /// Return from review to browsing.
    pub fn reopen(&mut self) -> Result<(), PlanError> {
        match self.state {
            SessionState::Reviewing => {
                self.transition(SessionState::Browsing);
                Ok(())
            }
            other => Err(Self::rejection("reopen", other)),
        }
    }

    /// Enter the submitting state and snapshot the configuration.
    ///
    /// Must be followed by [`complete_submission`](Self::complete_submission)
    /// or [`abort_submission`](Self::abort_submission).
    pub fn begin_submission(&mut self) -> Result<PlanSubmission, PlanError> {
        match self.state {
            SessionState::Reviewing => {
                self.transition(SessionState::Submitting);
                Ok(PlanSubmission::new(self.configuration.clone()))
            }
            other => Err(Self::rejection("submit", other)),
        }
    }

    pub fn complete_submission(&mut self) -> Result<(), PlanError> {
        self.ensure_submitting("complete submission")?;
        self.transition(SessionState::Submitted);
        Ok(())
    }

    /// Revert to reviewing after a failed or abandoned submission.
    pub fn abort_submission(&mut self) -> Result<(), PlanError> {
        self.ensure_submitting("abort submission")?;
        self.transition(SessionState::Reviewing);
        Ok(())
    }

    /// Hand the reviewed plan to `store`.
    ///
    /// On failure the session returns to reviewing with its selection intact;
    /// nothing is retried here. Dropping the future before the store answers
    /// also returns the session to reviewing.
    pub async fn submit(
        &mut self,
        store: &dyn SubmissionStore,
    ) -> Result<PlanSubmission, PlanError> {
        let submission = self.begin_submission()?;
        let mut in_flight = InFlightSubmission {
            session: self,
            settled: false,
        };

        let result = store.save(&submission).await;
        in_flight.settled = true;

        in_flight.session.settle(submission, result)
    }

    /// Finish a submission begun with [`begin_submission`](Self::begin_submission)
    /// according to the store's answer.
    fn settle(
        &mut self,
        submission: PlanSubmission,
        result: anyhow::Result<()>,
    ) -> Result<PlanSubmission, PlanError> {
        match result {
            Ok(()) => {
                self.complete_submission()?;
                tracing::info!(session = %self.id, submission = %submission.id, "plan submitted");
                Ok(submission)
            }
            Err(e) => {
                self.abort_submission()?;
                tracing::warn!(session = %self.id, "plan submission failed: {:#}", e);
                Err(PlanError::Persistence(format!("{:#}", e)))
            }
        }
    }

    // ============================================================
    // Internals
    // ============================================================

    /// Apply `change` to a copy of the selection, recompute, then commit.
    /// A failing change or aggregation leaves the session untouched.
    fn mutate<T>(
        &mut self,
        operation: &'static str,
        change: impl FnOnce(&mut SelectionStore, &Catalog) -> Result<T, PlanError>,
    ) -> Result<T, PlanError> {
        self.ensure_browsing(operation)?;

        let mut candidate = self.selection.clone();
        let outcome = change(&mut candidate, &self.catalog)?;
        let configuration = aggregate(&self.catalog, &candidate)?;

        let before = recommendation_state(&self.configuration);
        let after = recommendation_state(&configuration);

        self.selection = candidate;
        self.configuration = configuration;

        tracing::debug!(
            session = %self.id,
            operation,
            selected = self.configuration.selected_count(),
            tier = %self.configuration.tier,
            "selection changed"
        );
        if before != after {
            tracing::info!(session = %self.id, ?before, ?after, "recommendation state changed");
        }

        self.publish();
        Ok(outcome)
    }

    fn ensure_browsing(&self, operation: &'static str) -> Result<(), PlanError> {
        match self.state {
            SessionState::Browsing => Ok(()),
            other => Err(Self::rejection(operation, other)),
        }
    }

    fn ensure_submitting(&self, operation: &'static str) -> Result<(), PlanError> {
        match self.state {
            SessionState::Submitting => Ok(()),
            other => Err(Self::rejection(operation, other)),
        }
    }

    fn rejection(operation: &'static str, state: SessionState) -> PlanError {
        match state {
            SessionState::Submitted => PlanError::SessionClosed,
            SessionState::Submitting => PlanError::SubmissionInProgress,
            state => PlanError::InvalidState { operation, state },
        }
    }

    fn transition(&mut self, to: SessionState) {
        tracing::info!(session = %self.id, from = %self.state, to = %to, "session state changed");
        self.state = to;
        self.publish();
    }

    fn publish(&self) {
        self.views.send_replace(self.view());
    }
}

impl SelectionReader for PlanSession {
    fn active_tier(&self) -> Tier {
        self.selection.active_tier()
    }

    fn selected_ids(&self) -> Vec<&str> {
        self.selection.selected_ids()
    }

    fn is_selected(&self, feature_id: &str) -> bool {
        self.selection.is_selected(feature_id)
    }

    fn selected_count(&self) -> usize {
        self.selection.selected_count()
    }
}

impl SelectionWriter for PlanSession {
    fn add_feature(&mut self, feature_id: &str) -> Result<(), PlanError> {
        self.mutate("add feature", |selection, catalog| {
            selection.add(catalog, feature_id).map(|_| ())
        })
    }

    fn remove_feature(&mut self, feature_id: &str) -> Result<(), PlanError> {
        self.mutate("remove feature", |selection, _| {
            selection.remove(feature_id);
            Ok(())
        })
    }

    fn set_tier(&mut self, tier: Tier) -> Result<(), PlanError> {
        self.mutate("change tier", |selection, catalog| {
            selection.set_tier(catalog, tier)
        })
    }

    fn clear(&mut self) -> Result<(), PlanError> {
        self.mutate("clear selection", |selection, _| {
            selection.clear();
            Ok(())
        })
    }
}

/// Shared handle to a session for callers on several tasks.
///
/// The lock is never held across the persistence await, so a second
/// [`submit`](Self::submit) observes the in-flight state and fails fast with
/// [`PlanError::SubmissionInProgress`].
#[derive(Clone)]
pub struct PlanHandle {
    inner: Arc<Mutex<PlanSession>>,
}

impl PlanHandle {
    pub fn new(session: PlanSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run a synchronous command against the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut PlanSession) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn view(&self) -> PlanView {
        self.inner.lock().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlanView> {
        self.inner.lock().subscribe()
    }

    pub async fn submit(&self, store: &dyn SubmissionStore) -> Result<PlanSubmission, PlanError> {
        let submission = self.inner.lock().begin_submission()?;
        let mut pending = PendingSubmission {
            session: &self.inner,
            settled: false,
        };

        let result = store.save(&submission).await;
        pending.settled = true;

        let mut session = self.inner.lock();
        session.settle(submission, result)
    }
}

/// Reverts an owned session to reviewing if its submit future is dropped
/// mid-flight.
struct InFlightSubmission<'a> {
    session: &'a mut PlanSession,
    settled: bool,
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(session = %self.session.id, "plan submission abandoned");
            let _ = self.session.abort_submission();
        }
    }
}

/// Shared-handle counterpart of [`InFlightSubmission`]. The lock is only
/// taken on drop.
struct PendingSubmission<'a> {
    session: &'a Mutex<PlanSession>,
    settled: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let _ = self.session.lock().abort_submission();
        }
    }
}
