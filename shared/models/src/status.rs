//! Per-recipient status machine
//!
//! Each recipient of a batch moves through `pending → sending → success|error`.
//! Recipients that were never attempted because the batch was cancelled go
//! straight from `pending` to `cancelled`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{OutcomeStatus, SendOutcome};

/// Recipient states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientState {
    /// Queued, not yet attempted
    Pending,
    /// Send in progress
    Sending,
    /// Accepted by the mail server
    Success,
    /// Send failed
    Error,
    /// Skipped because the batch was cancelled
    Cancelled,
}

impl RecipientState {
    pub fn can_transition_to(&self, target: RecipientState) -> bool {
        use RecipientState::*;

        match (self, target) {
            (Pending, Sending) => true,
            (Pending, Cancelled) => true,

            (Sending, Success) => true,
            (Sending, Error) => true,

            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RecipientState::Success | RecipientState::Error | RecipientState::Cancelled
        )
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "sending" => Some(Self::Sending),
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl From<OutcomeStatus> for RecipientState {
    fn from(status: OutcomeStatus) -> Self {
        match status {
            OutcomeStatus::Success => Self::Success,
            OutcomeStatus::Error => Self::Error,
            OutcomeStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for RecipientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sending => write!(f, "sending"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("No recipient at position {index}")]
    UnknownRecipient { index: usize },

    #[error("Invalid status transition for {email}: {from} -> {to}")]
    InvalidTransition {
        email: String,
        from: RecipientState,
        to: RecipientState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStatus {
    pub email: String,
    pub state: RecipientState,
}

/// Ordered status of every recipient in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBoard {
    entries: Vec<RecipientStatus>,
}

impl StatusBoard {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: emails
                .into_iter()
                .map(|email| RecipientStatus {
                    email: email.into(),
                    state: RecipientState::Pending,
                })
                .collect(),
        }
    }

    pub fn transition(&mut self, index: usize, target: RecipientState) -> Result<(), StatusError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(StatusError::UnknownRecipient { index })?;

        if !entry.state.can_transition_to(target) {
            return Err(StatusError::InvalidTransition {
                email: entry.email.clone(),
                from: entry.state,
                to: target,
            });
        }

        entry.state = target;
        Ok(())
    }

    pub fn mark_sending(&mut self, index: usize) -> Result<(), StatusError> {
        self.transition(index, RecipientState::Sending)
    }

    /// Move a recipient to the terminal state matching its outcome.
    pub fn record(&mut self, index: usize, outcome: &SendOutcome) -> Result<(), StatusError> {
        self.transition(index, outcome.status.into())
    }

    pub fn state(&self, index: usize) -> Option<RecipientState> {
        self.entries.get(index).map(|entry| entry.state)
    }

    pub fn entries(&self) -> &[RecipientStatus] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, state: RecipientState) -> usize {
        self.entries.iter().filter(|entry| entry.state == state).count()
    }

    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(|entry| entry.state.is_terminal())
    }
}
