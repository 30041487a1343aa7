//! Results of send attempts and their aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StatusBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
    /// Never attempted because the batch was cancelled first.
    Cancelled,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one send attempt for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub email: String,
    pub status: OutcomeStatus,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

impl SendOutcome {
    pub fn new(email: impl Into<String>, status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status,
            message: message.into(),
            recorded_at: Utc::now(),
        }
    }

    pub fn success(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(email, OutcomeStatus::Success, message)
    }

    pub fn error(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(email, OutcomeStatus::Error, message)
    }

    pub fn cancelled(email: impl Into<String>) -> Self {
        Self::new(email, OutcomeStatus::Cancelled, "Batch cancelled before sending")
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Aggregate counts over the outcomes of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub successful: usize,
    pub failed: usize,
    #[serde(default)]
    pub cancelled: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[SendOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            match outcome.status {
                OutcomeStatus::Success => summary.successful += 1,
                OutcomeStatus::Error => summary.failed += 1,
                OutcomeStatus::Cancelled => summary.cancelled += 1,
            }
            summary.total += 1;
            summary
        })
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Email sending completed. Success: {}, Failed: {}",
            self.successful, self.failed
        )?;
        if self.cancelled > 0 {
            write!(f, ", Cancelled: {}", self.cancelled)?;
        }
        Ok(())
    }
}

/// Everything a finished batch hands back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<SendOutcome>,
    pub summary: BatchSummary,
    pub statuses: StatusBoard,
}

impl BatchReport {
    pub fn new(outcomes: Vec<SendOutcome>, statuses: StatusBoard) -> Self {
        let summary = BatchSummary::from_outcomes(&outcomes);
        Self {
            outcomes,
            summary,
            statuses,
        }
    }
}
