//! Confirmation tokens for admin actions.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AdminError;

/// An action that requires confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ResetQueue,
    ResetHistory,
    Reboot,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResetQueue => "reset_queue",
            Self::ResetHistory => "reset_history",
            Self::Reboot => "reboot",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by the first phase; the caller echoes `token` to proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationChallenge {
    pub action: AdminAction,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Upper bound on token lifetime (one day).
const MAX_TTL_SECS: u64 = 86_400;

#[derive(Debug, Clone)]
struct Pending {
    action: AdminAction,
    expires_at: DateTime<Utc>,
}

/// Outstanding confirmation tokens.
#[derive(Debug)]
pub struct ConfirmationLedger {
    ttl: Duration,
    pending: Mutex<HashMap<String, Pending>>,
}

impl ConfirmationLedger {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Hands out a fresh token for `action`.
    pub fn issue(&self, action: AdminAction) -> ConfirmationChallenge {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let token = Uuid::new_v4().to_string();

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|_, p| p.expires_at > now);
        pending.insert(token.clone(), Pending { action, expires_at });

        ConfirmationChallenge {
            action,
            token,
            expires_at,
        }
    }

    /// Redeems `token` for `action`.
    ///
    /// A token presented for a different action stays valid for its own.
    pub fn consume(&self, action: AdminAction, token: &str) -> Result<(), AdminError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = pending
            .get(token)
            .cloned()
            .ok_or_else(|| AdminError::InvalidConfirmation("unknown or used token".to_string()))?;

        if entry.action != action {
            return Err(AdminError::InvalidConfirmation(format!(
                "token was issued for {}",
                entry.action
            )));
        }

        pending.remove(token);
        if Utc::now() >= entry.expires_at {
            return Err(AdminError::InvalidConfirmation("token expired".to_string()));
        }
        Ok(())
    }
}
