//! State for one verification attempt.
//!
//! The controller performs no I/O. Input handlers hand back a
//! [`VerifyRequest`] when a code should be verified and the resend action hands
//! back a [`ResendRequest`]; the owner runs the external operation and reports
//! the result through [`CodeEntryController::complete_verification`] or
//! [`CodeEntryController::complete_resend`].

use tracing::{debug, info, warn};

use crate::{
    buffer::{CodeBuffer, CODE_LENGTH},
    cooldown::ResendCooldown,
    error::{EntryError, EntryFailure, FailureKind},
    input::{self, InputEvent},
    settings::EntrySettings,
    verification::{VerificationOutcome, VerificationSequencer, VerificationState, VerifyRequest},
};

/// Permission to call the external resend operation once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResendRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    Failed(EntryFailure),
    Stale,
}

/// Everything the presentation layer needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub cells: [Option<char>; CODE_LENGTH],
    pub focus: Option<usize>,
    pub verification: VerificationState,
    pub error: Option<EntryFailure>,
    pub cooldown_remaining: u32,
    pub submit_enabled: bool,
    pub can_resend: bool,
    pub destination: String,
}

impl ControllerSnapshot {
    pub fn code_text(&self) -> String {
        self.cells.iter().flatten().collect()
    }
}

#[derive(Debug)]
pub struct CodeEntryController {
    destination: String,
    buffer: CodeBuffer,
    focus: Option<usize>,
    sequencer: VerificationSequencer,
    cooldown: ResendCooldown,
    resend_in_flight: bool,
    resend_error: Option<EntryFailure>,
}

impl CodeEntryController {
    /// `destination` is a display-only hint such as the address the code was
    /// sent to.
    pub fn new(destination: impl Into<String>, settings: &EntrySettings) -> Self {
        Self {
            destination: destination.into(),
            buffer: CodeBuffer::new(),
            focus: Some(0),
            sequencer: VerificationSequencer::new(),
            cooldown: ResendCooldown::started(settings.resend_cooldown_secs),
            resend_in_flight: false,
            resend_error: None,
        }
    }

    pub fn buffer(&self) -> &CodeBuffer {
        &self.buffer
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn verification_state(&self) -> &VerificationState {
        self.sequencer.state()
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown.remaining()
    }

    pub fn cooldown_active(&self) -> bool {
        self.cooldown.is_active()
    }

    pub fn resend_in_flight(&self) -> bool {
        self.resend_in_flight
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn submit_enabled(&self) -> bool {
        self.buffer.is_complete() && !self.sequencer.state().is_pending()
    }

    pub fn can_resend(&self) -> bool {
        !self.cooldown.is_active() && !self.resend_in_flight
    }

    /// The failure currently on display, if any. A resend failure takes
    /// precedence over a rejected code.
    pub fn error(&self) -> Option<EntryFailure> {
        if let Some(failure) = &self.resend_error {
            return Some(failure.clone());
        }

        self.sequencer
            .state()
            .failure_message()
            .map(|message| EntryFailure::new(FailureKind::VerificationRejected, message))
    }

    /// Applies one input event.
    ///
    /// Returns a request when the event completed the code (auto-submit) or was
    /// an accepted manual submit. Rejected manual submits come back as errors;
    /// a rejected auto-submit is dropped silently since the edit itself still
    /// applied.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<Option<VerifyRequest>, EntryError> {
        let interpretation = match input::interpret(&mut self.buffer, &event) {
            Ok(interpretation) => interpretation,
            Err(err) => {
                debug!(%err, "dropped code entry input");
                return Err(err);
            }
        };

        if interpretation.edited {
            self.dismiss_errors();
        }
        if let Some(focus) = interpretation.focus {
            self.focus = Some(focus);
        }

        let Some(code) = interpretation.submission else {
            return Ok(None);
        };

        match self.sequencer.begin(&code) {
            Ok(request) => Ok(Some(request)),
            Err(err) if interpretation.manual => Err(err),
            Err(err) => {
                debug!(%err, "auto-submit skipped");
                Ok(None)
            }
        }
    }

    pub fn enter_char(&mut self, index: usize, ch: char) -> Result<Option<VerifyRequest>, EntryError> {
        self.handle_input(InputEvent::Char { index, ch })
    }

    pub fn backspace(&mut self, index: usize) -> Result<(), EntryError> {
        self.handle_input(InputEvent::Backspace { index }).map(|_| ())
    }

    pub fn paste(&mut self, text: impl Into<String>) -> Option<VerifyRequest> {
        self.handle_input(InputEvent::Paste { text: text.into() })
            .ok()
            .flatten()
    }

    pub fn submit(&mut self) -> Result<VerifyRequest, EntryError> {
        self.handle_input(InputEvent::Submit)?
            .ok_or(EntryError::Incomplete)
    }

    pub fn complete_verification(&mut self, result: anyhow::Result<()>) -> VerificationOutcome {
        let outcome = self.sequencer.finish(result);
        if let VerificationOutcome::Rejected(_) = &outcome {
            self.buffer.clear_all();
            self.focus = Some(0);
        }
        outcome
    }

    pub fn request_resend(&mut self) -> Result<ResendRequest, EntryError> {
        if self.cooldown.is_active() {
            return Err(EntryError::CooldownActive {
                remaining: self.cooldown.remaining(),
            });
        }
        if self.resend_in_flight {
            return Err(EntryError::ResendInFlight);
        }

        debug!("requesting a new code");
        self.resend_in_flight = true;
        Ok(ResendRequest)
    }

    pub fn complete_resend(&mut self, result: anyhow::Result<()>) -> ResendOutcome {
        if !self.resend_in_flight {
            warn!("resend result arrived with no request in flight");
            return ResendOutcome::Stale;
        }
        self.resend_in_flight = false;

        match result {
            Ok(()) => {
                info!(destination = %self.destination, "new code sent");
                self.cooldown.restart();
                self.dismiss_errors();
                ResendOutcome::Sent
            }
            Err(err) => {
                warn!(reason = %err, "resend failed");
                let failure = EntryFailure::from_reason(FailureKind::ResendFailed, &err);
                self.resend_error = Some(failure.clone());
                ResendOutcome::Failed(failure)
            }
        }
    }

    /// One elapsed second of cooldown. Returns whether the cooldown is still
    /// running.
    pub fn tick(&mut self) -> bool {
        self.cooldown.tick()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            cells: *self.buffer.cells(),
            focus: self.focus,
            verification: self.sequencer.state().clone(),
            error: self.error(),
            cooldown_remaining: self.cooldown.remaining(),
            submit_enabled: self.submit_enabled(),
            can_resend: self.can_resend(),
            destination: self.destination.clone(),
        }
    }

    fn dismiss_errors(&mut self) {
        self.sequencer.acknowledge();
        self.resend_error = None;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
