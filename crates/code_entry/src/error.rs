use thiserror::Error;

use crate::buffer::CODE_LENGTH;

pub const DEFAULT_REJECTION_MESSAGE: &str = "Invalid code. Please try again.";
pub const DEFAULT_RESEND_FAILURE_MESSAGE: &str = "Failed to resend code";

/// Reasons an input or request was not acted on.
///
/// None of these are shown to the user; the presentation layer treats them as
/// no-ops. They are returned so callers can log or assert on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("cell index {index} is outside the {len}-digit code", len = CODE_LENGTH)]
    CellOutOfRange { index: usize },
    #[error("'{value}' is not a decimal digit")]
    NotADigit { value: char },
    #[error("code must be exactly {len} decimal digits", len = CODE_LENGTH)]
    MalformedCode,
    #[error("code is incomplete")]
    Incomplete,
    #[error("a verification request is already pending")]
    VerificationPending,
    #[error("code has already been verified")]
    AlreadyVerified,
    #[error("resend is available in {remaining}s")]
    CooldownActive { remaining: u32 },
    #[error("a resend request is already in flight")]
    ResendInFlight,
}

impl EntryError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::CellOutOfRange { .. } | Self::NotADigit { .. } | Self::MalformedCode
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    VerificationRejected,
    ResendFailed,
}

impl FailureKind {
    pub fn default_message(self) -> &'static str {
        match self {
            Self::VerificationRejected => DEFAULT_REJECTION_MESSAGE,
            Self::ResendFailed => DEFAULT_RESEND_FAILURE_MESSAGE,
        }
    }
}

/// A user-visible failure reported by one of the external operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    kind: FailureKind,
    message: String,
}

impl EntryFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.default_message().to_string()
        } else {
            message
        };

        Self { kind, message }
    }

    pub fn from_reason(kind: FailureKind, reason: &anyhow::Error) -> Self {
        Self::new(kind, reason.to_string())
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
