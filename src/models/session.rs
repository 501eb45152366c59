use serde::{Deserialize, Serialize};

/// Lifecycle state of a plan session.
///
/// - `Browsing`: selection mutations and search are permitted
/// - `Reviewing`: selection frozen, plan ready to submit or reopen
/// - `Submitting`: a submission is in flight (transient sub-state of reviewing)
/// - `Submitted`: terminal, the session no longer accepts commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Browsing,
    Reviewing,
    Submitting,
    Submitted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::Reviewing => "reviewing",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the selection currently sits within the active tier's ceiling.
///
/// Derived from the configuration after every mutation; there is no explicit
/// transition into `LimitExceeded`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationState {
    Normal,
    LimitExceeded,
}
