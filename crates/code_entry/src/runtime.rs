//! Event loop driving a [`CodeEntryController`] against a [`CodeAuthority`].
//!
//! Commands arrive from the front end one at a time. Verify and resend calls
//! run as spawned tasks whose results come back through an internal channel,
//! so controller state is only ever touched from the loop itself.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    authority::CodeAuthority,
    controller::{CodeEntryController, ControllerSnapshot, ResendRequest},
    cooldown::CooldownTicker,
    input::InputEvent,
    settings::EntrySettings,
    verification::{VerificationOutcome, VerifyRequest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryCommand {
    Input(InputEvent),
    Resend,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEvent {
    Snapshot(ControllerSnapshot),
    Verified { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    Verified { code: String },
    Closed,
}

enum Completion {
    Verify(Result<()>),
    Resend(Result<()>),
}

pub struct EntryRuntime {
    controller: CodeEntryController,
    authority: Arc<dyn CodeAuthority>,
    tick_period: Duration,
    ticker: Option<CooldownTicker>,
    verify_task: Option<JoinHandle<()>>,
    resend_task: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl EntryRuntime {
    pub fn new(
        destination: impl Into<String>,
        settings: &EntrySettings,
        authority: Arc<dyn CodeAuthority>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            controller: CodeEntryController::new(destination, settings),
            authority,
            tick_period: settings.tick_period,
            ticker: None,
            verify_task: None,
            resend_task: None,
            completions_tx,
            completions_rx,
        }
    }

    pub fn controller(&self) -> &CodeEntryController {
        &self.controller
    }

    /// Runs until the code is verified, the front end sends
    /// [`EntryCommand::Close`], or either channel closes. A snapshot is
    /// published on start and after every processed event.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<EntryCommand>,
        events: mpsc::Sender<EntryEvent>,
    ) -> SessionExit {
        self.sync_ticker();
        if !publish(&events, self.controller.snapshot()).await {
            return SessionExit::Closed;
        }

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(EntryCommand::Input(event)) => self.apply_input(event),
                    Some(EntryCommand::Resend) => self.apply_resend(),
                    Some(EntryCommand::Close) | None => {
                        debug!("code entry closed by front end");
                        return SessionExit::Closed;
                    }
                },
                Some(completion) = self.completions_rx.recv() => {
                    if let Some(code) = self.apply_completion(completion) {
                        self.sync_ticker();
                        publish(&events, self.controller.snapshot()).await;
                        let _ = events.send(EntryEvent::Verified { code: code.clone() }).await;
                        return SessionExit::Verified { code };
                    }
                },
                Some(()) = next_tick(&mut self.ticker) => {
                    self.controller.tick();
                },
            }

            self.sync_ticker();
            if !publish(&events, self.controller.snapshot()).await {
                debug!("snapshot receiver dropped; closing code entry");
                return SessionExit::Closed;
            }
        }
    }

    fn apply_input(&mut self, event: InputEvent) {
        match self.controller.handle_input(event) {
            Ok(Some(request)) => self.spawn_verify(request),
            Ok(None) => {}
            Err(err) => debug!(%err, "input not applied"),
        }
    }

    fn apply_resend(&mut self) {
        match self.controller.request_resend() {
            Ok(request) => self.spawn_resend(request),
            Err(err) => debug!(%err, "resend not requested"),
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> Option<String> {
        match completion {
            Completion::Verify(result) => {
                self.verify_task = None;
                match self.controller.complete_verification(result) {
                    VerificationOutcome::Verified { code } => Some(code),
                    VerificationOutcome::Rejected(_) | VerificationOutcome::Stale => None,
                }
            }
            Completion::Resend(result) => {
                self.resend_task = None;
                self.controller.complete_resend(result);
                None
            }
        }
    }

    fn spawn_verify(&mut self, request: VerifyRequest) {
        let authority = Arc::clone(&self.authority);
        let completions = self.completions_tx.clone();
        self.verify_task = Some(tokio::spawn(async move {
            let result = authority.verify(request.code()).await;
            let _ = completions.send(Completion::Verify(result));
        }));
    }

    fn spawn_resend(&mut self, _request: ResendRequest) {
        let authority = Arc::clone(&self.authority);
        let completions = self.completions_tx.clone();
        self.resend_task = Some(tokio::spawn(async move {
            let result = authority.resend().await;
            let _ = completions.send(Completion::Resend(result));
        }));
    }

    // The ticker only exists while the cooldown is counting down.
    fn sync_ticker(&mut self) {
        match (self.controller.cooldown_active(), self.ticker.is_some()) {
            (true, false) => self.ticker = Some(CooldownTicker::start(self.tick_period)),
            (false, true) => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.cancel();
                }
                info!("resend cooldown finished");
            }
            _ => {}
        }
    }

    fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        if let Some(task) = self.verify_task.take() {
            task.abort();
        }
        if let Some(task) = self.resend_task.take() {
            task.abort();
        }
    }
}

impl Drop for EntryRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn publish(events: &mpsc::Sender<EntryEvent>, snapshot: ControllerSnapshot) -> bool {
    events.send(EntryEvent::Snapshot(snapshot)).await.is_ok()
}

async fn next_tick(ticker: &mut Option<CooldownTicker>) -> Option<()> {
    match ticker {
        Some(ticker) => ticker.next_tick().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
