//! Verification round-trip bookkeeping.
//!
//! `Idle -> Pending -> {Verified, Failed}`; `Failed -> Idle` once the user
//! edits the code again.

use tracing::{debug, info, warn};

use crate::{
    buffer::CODE_LENGTH,
    error::{EntryError, EntryFailure, FailureKind},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VerificationState {
    #[default]
    Idle,
    Pending,
    Failed(String),
    /// The external operation accepted the code. What happens next belongs to
    /// the caller.
    Verified,
}

impl VerificationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A code accepted for verification; exactly one is outstanding at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    code: String,
}

impl VerifyRequest {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn into_code(self) -> String {
        self.code
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified { code: String },
    Rejected(EntryFailure),
    /// A completion arrived while nothing was pending.
    Stale,
}

#[derive(Debug, Default)]
pub struct VerificationSequencer {
    state: VerificationState,
    pending_code: Option<String>,
}

impl VerificationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    pub fn begin(&mut self, code: &str) -> Result<VerifyRequest, EntryError> {
        match self.state {
            VerificationState::Pending => return Err(EntryError::VerificationPending),
            VerificationState::Verified => return Err(EntryError::AlreadyVerified),
            VerificationState::Idle | VerificationState::Failed(_) => {}
        }

        if code.len() != CODE_LENGTH || !code.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(EntryError::MalformedCode);
        }

        debug!("submitting code for verification");
        self.state = VerificationState::Pending;
        self.pending_code = Some(code.to_string());
        Ok(VerifyRequest {
            code: code.to_string(),
        })
    }

    pub fn finish(&mut self, result: anyhow::Result<()>) -> VerificationOutcome {
        let Some(code) = self.pending_code.take() else {
            warn!("verification result arrived with no request pending");
            return VerificationOutcome::Stale;
        };

        match result {
            Ok(()) => {
                info!("code verified");
                self.state = VerificationState::Verified;
                VerificationOutcome::Verified { code }
            }
            Err(err) => {
                let failure = EntryFailure::from_reason(FailureKind::VerificationRejected, &err);
                warn!(reason = %err, "code rejected");
                self.state = VerificationState::Failed(failure.message().to_string());
                VerificationOutcome::Rejected(failure)
            }
        }
    }

    /// Dismisses a displayed failure. Other states are left alone.
    pub fn acknowledge(&mut self) {
        if matches!(self.state, VerificationState::Failed(_)) {
            self.state = VerificationState::Idle;
        }
    }
}

#[cfg(test)]
#[path = "tests/verification_tests.rs"]
mod tests;
