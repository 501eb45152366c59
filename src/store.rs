//! Persistence collaborator for finalized plans.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::PlanSubmission;

/// Accepts finalized plans. Any error is reported to the session as a uniform
/// persistence failure; retries and backoff belong to the implementation or
/// its caller, never to the session.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, submission: &PlanSubmission) -> anyhow::Result<()>;
}

/// In-process store, used for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    submissions: Mutex<Vec<PlanSubmission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<PlanSubmission> {
        self.submissions.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.lock().is_empty()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn save(&self, submission: &PlanSubmission) -> anyhow::Result<()> {
        self.submissions.lock().push(submission.clone());
        Ok(())
    }
}
