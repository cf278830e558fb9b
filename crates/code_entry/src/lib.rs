//! Segmented one-time-code entry: digit cells, input interpretation, the
//! verification round-trip and the resend cooldown.
//!
//! [`CodeEntryController`] is a plain state machine with no I/O. The
//! [`EntryRuntime`] drives it against a [`CodeAuthority`] on a tokio runtime.

pub mod authority;
pub mod buffer;
pub mod controller;
pub mod cooldown;
pub mod error;
pub mod input;
pub mod runtime;
pub mod settings;
pub mod verification;

pub use authority::CodeAuthority;
pub use buffer::{CodeBuffer, CODE_LENGTH};
pub use controller::{CodeEntryController, ControllerSnapshot, ResendOutcome, ResendRequest};
pub use cooldown::{CooldownTicker, ResendCooldown};
pub use error::{EntryError, EntryFailure, FailureKind};
pub use input::InputEvent;
pub use runtime::{EntryCommand, EntryEvent, EntryRuntime, SessionExit};
pub use settings::EntrySettings;
pub use verification::{VerificationOutcome, VerificationState, VerifyRequest};
