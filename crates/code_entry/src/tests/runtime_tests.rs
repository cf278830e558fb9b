use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
    time::{timeout, Duration},
};

use super::*;
use crate::verification::VerificationState;

struct ScriptedAuthority {
    verify_calls: Mutex<Vec<String>>,
    resend_calls: AtomicUsize,
    verify_failure: Option<String>,
    resend_failure: Option<String>,
    verify_gate: Option<Arc<Notify>>,
}

impl ScriptedAuthority {
    fn accepting() -> Self {
        Self {
            verify_calls: Mutex::new(Vec::new()),
            resend_calls: AtomicUsize::new(0),
            verify_failure: None,
            resend_failure: None,
            verify_gate: None,
        }
    }

    fn rejecting(message: &str) -> Self {
        Self {
            verify_failure: Some(message.to_string()),
            ..Self::accepting()
        }
    }

    fn with_resend_failure(mut self, message: &str) -> Self {
        self.resend_failure = Some(message.to_string());
        self
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.verify_gate = Some(gate);
        self
    }

    async fn verify_calls(&self) -> Vec<String> {
        self.verify_calls.lock().await.clone()
    }
}

#[async_trait]
impl CodeAuthority for ScriptedAuthority {
    async fn verify(&self, code: &str) -> Result<()> {
        self.verify_calls.lock().await.push(code.to_string());
        if let Some(gate) = &self.verify_gate {
            gate.notified().await;
        }
        match &self.verify_failure {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    async fn resend(&self) -> Result<()> {
        self.resend_calls.fetch_add(1, Ordering::SeqCst);
        match &self.resend_failure {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

struct Harness {
    commands: mpsc::Sender<EntryCommand>,
    events: mpsc::Receiver<EntryEvent>,
    session: JoinHandle<SessionExit>,
}

impl Harness {
    fn start(authority: Arc<ScriptedAuthority>) -> Self {
        let (commands, command_rx) = mpsc::channel(32);
        let (event_tx, events) = mpsc::channel(256);
        let runtime = EntryRuntime::new(
            "a***@example.com",
            &EntrySettings::default(),
            authority,
        );
        let session = tokio::spawn(runtime.run(command_rx, event_tx));
        Self {
            commands,
            events,
            session,
        }
    }

    async fn send(&self, command: EntryCommand) {
        self.commands.send(command).await.expect("runtime alive");
    }

    async fn input(&self, event: InputEvent) {
        self.send(EntryCommand::Input(event)).await;
    }

    async fn snapshot_where(
        &mut self,
        predicate: impl Fn(&ControllerSnapshot) -> bool,
    ) -> ControllerSnapshot {
        loop {
            match self.events.recv().await.expect("event stream open") {
                EntryEvent::Snapshot(snapshot) if predicate(&snapshot) => return snapshot,
                _ => {}
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn paste_verifies_once_and_ends_the_session() {
    let authority = Arc::new(ScriptedAuthority::accepting());
    let mut harness = Harness::start(Arc::clone(&authority));
    harness.snapshot_where(|_| true).await;

    harness
        .input(InputEvent::Paste {
            text: "12a3b456789".to_string(),
        })
        .await;

    let exit = harness.session.await.expect("join");
    assert_eq!(
        exit,
        SessionExit::Verified {
            code: "123456".to_string()
        }
    );
    assert_eq!(authority.verify_calls().await, vec!["123456".to_string()]);

    let mut saw_verified_event = false;
    while let Some(event) = harness.events.recv().await {
        if event == (EntryEvent::Verified { code: "123456".to_string() }) {
            saw_verified_event = true;
        }
    }
    assert!(saw_verified_event);
}

#[tokio::test(start_paused = true)]
async fn typing_the_last_cell_calls_verify_exactly_once() {
    let authority = Arc::new(ScriptedAuthority::accepting());
    let harness = Harness::start(Arc::clone(&authority));

    for (index, ch) in "123456".chars().enumerate() {
        harness.input(InputEvent::Char { index, ch }).await;
    }

    let exit = harness.session.await.expect("join");
    assert!(matches!(exit, SessionExit::Verified { .. }));
    assert_eq!(authority.verify_calls().await, vec!["123456".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn pending_verification_blocks_duplicate_submissions() {
    let gate = Arc::new(Notify::new());
    let authority = Arc::new(ScriptedAuthority::accepting().gated(Arc::clone(&gate)));
    let mut harness = Harness::start(Arc::clone(&authority));

    harness
        .input(InputEvent::Paste {
            text: "123456".to_string(),
        })
        .await;
    harness
        .snapshot_where(|snapshot| snapshot.verification.is_pending())
        .await;

    harness
        .input(InputEvent::Char { index: 5, ch: '6' })
        .await;
    harness.input(InputEvent::Submit).await;
    harness
        .input(InputEvent::Paste {
            text: "123456".to_string(),
        })
        .await;
    let snapshot = harness
        .snapshot_where(|snapshot| snapshot.code_text() == "123456")
        .await;
    assert!(!snapshot.submit_enabled);

    gate.notify_one();
    let exit = harness.session.await.expect("join");
    assert!(matches!(exit, SessionExit::Verified { .. }));
    assert_eq!(authority.verify_calls().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejection_clears_the_code_and_keeps_the_session_alive() {
    let authority = Arc::new(ScriptedAuthority::rejecting("Invalid code"));
    let mut harness = Harness::start(Arc::clone(&authority));

    harness
        .input(InputEvent::Paste {
            text: "123456".to_string(),
        })
        .await;
    let snapshot = harness
        .snapshot_where(|snapshot| {
            matches!(snapshot.verification, VerificationState::Failed(_))
        })
        .await;

    assert_eq!(
        snapshot.verification,
        VerificationState::Failed("Invalid code".to_string())
    );
    assert_eq!(snapshot.cells, [None; crate::buffer::CODE_LENGTH]);
    assert_eq!(snapshot.focus, Some(0));

    harness.input(InputEvent::Char { index: 0, ch: '7' }).await;
    let snapshot = harness
        .snapshot_where(|snapshot| snapshot.code_text() == "7")
        .await;
    assert_eq!(snapshot.verification, VerificationState::Idle);
    assert_eq!(snapshot.error, None);

    harness.send(EntryCommand::Close).await;
    assert_eq!(harness.session.await.expect("join"), SessionExit::Closed);
}

#[tokio::test(start_paused = true)]
async fn resend_during_cooldown_never_reaches_the_authority() {
    let authority = Arc::new(ScriptedAuthority::accepting());
    let mut harness = Harness::start(Arc::clone(&authority));
    let first = harness.snapshot_where(|_| true).await;
    assert_eq!(first.cooldown_remaining, 60);

    harness.send(EntryCommand::Resend).await;
    harness.send(EntryCommand::Close).await;
    assert_eq!(harness.session.await.expect("join"), SessionExit::Closed);

    assert_eq!(authority.resend_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn cooldown_counts_down_then_resend_restarts_it() {
    let authority = Arc::new(ScriptedAuthority::accepting());
    let mut harness = Harness::start(Arc::clone(&authority));

    let started = tokio::time::Instant::now();
    harness
        .snapshot_where(|snapshot| snapshot.cooldown_remaining == 0)
        .await;
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert_eq!(authority.resend_calls.load(Ordering::SeqCst), 0);

    harness.send(EntryCommand::Resend).await;
    let snapshot = harness
        .snapshot_where(|snapshot| snapshot.cooldown_remaining == 60)
        .await;
    assert!(!snapshot.can_resend);
    assert_eq!(authority.resend_calls.load(Ordering::SeqCst), 1);

    harness
        .snapshot_where(|snapshot| snapshot.cooldown_remaining == 59)
        .await;
    harness.send(EntryCommand::Close).await;
    harness.session.await.expect("join");
}

#[tokio::test(start_paused = true)]
async fn ticking_stops_once_the_cooldown_reaches_zero() {
    let authority = Arc::new(ScriptedAuthority::accepting());
    let mut harness = Harness::start(authority);

    harness
        .snapshot_where(|snapshot| snapshot.cooldown_remaining == 0)
        .await;

    let idle = timeout(Duration::from_secs(10), harness.events.recv()).await;
    assert!(idle.is_err(), "no snapshots expected once the cooldown is over");

    harness.send(EntryCommand::Close).await;
    harness.session.await.expect("join");
}

#[tokio::test(start_paused = true)]
async fn failed_resend_is_shown_and_retryable() {
    let authority = Arc::new(ScriptedAuthority::accepting().with_resend_failure("mailer offline"));
    let mut harness = Harness::start(Arc::clone(&authority));

    harness
        .snapshot_where(|snapshot| snapshot.cooldown_remaining == 0)
        .await;
    harness.send(EntryCommand::Resend).await;
    let snapshot = harness
        .snapshot_where(|snapshot| snapshot.error.is_some())
        .await;

    let error = snapshot.error.expect("resend error");
    assert_eq!(error.message(), "mailer offline");
    assert_eq!(snapshot.cooldown_remaining, 0);
    assert!(snapshot.can_resend);

    harness.send(EntryCommand::Resend).await;
    harness
        .snapshot_where(|snapshot| !snapshot.can_resend)
        .await;
    harness
        .snapshot_where(|snapshot| snapshot.can_resend && snapshot.error.is_some())
        .await;
    assert_eq!(authority.resend_calls.load(Ordering::SeqCst), 2);

    harness.send(EntryCommand::Close).await;
    harness.session.await.expect("join");
}

#[tokio::test(start_paused = true)]
async fn closing_mid_countdown_ends_the_session() {
    let authority = Arc::new(ScriptedAuthority::accepting());
    let mut harness = Harness::start(authority);

    harness
        .snapshot_where(|snapshot| snapshot.cooldown_remaining == 45)
        .await;
    drop(harness.commands);

    assert_eq!(harness.session.await.expect("join"), SessionExit::Closed);
    while let Some(event) = harness.events.recv().await {
        assert!(matches!(event, EntryEvent::Snapshot(_)), "unexpected {event:?}");
    }
}
