//! Destructive admin operations: queue reset, history reset and reboot.
//!
//! Every action is two-phase. The first call hands out a short-lived,
//! single-use token bound to the action; only a second call presenting that
//! token performs it.

mod confirm;
mod control;

pub use confirm::{AdminAction, ConfirmationChallenge, ConfirmationLedger};
pub use control::{AdminControl, RebootReport};

use thiserror::Error;

/// Errors returned by admin actions. State is unchanged whenever one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("invalid confirmation: {0}")]
    InvalidConfirmation(String),

    #[error("a reboot is already in progress")]
    RebootInProgress,
}

impl AdminError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidConfirmation(_) => "invalid_confirmation",
            Self::RebootInProgress => "reboot_in_progress",
        }
    }
}
