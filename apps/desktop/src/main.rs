use std::{io::BufRead, path::PathBuf, sync::Arc, thread};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::HttpCodeAuthority;
use code_entry::{ControllerSnapshot, EntryCommand, EntryEvent, EntryRuntime, SessionExit};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod render;

#[derive(Parser, Debug)]
#[command(about = "Enter a one-time code sent by the sign-in service")]
struct Args {
    #[arg(long, default_value = "desktop.toml")]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    destination: Option<String>,
    #[arg(long)]
    session_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(v) = args.server_url {
        settings.server_url = v;
    }
    if let Some(v) = args.destination {
        settings.destination = v;
    }
    if let Some(v) = args.session_token {
        settings.session_token = Some(v);
    }

    let mut authority = HttpCodeAuthority::with_timeout(
        &settings.server_url,
        settings.destination.clone(),
        settings.request_timeout(),
    )
    .context("failed to configure verification client")?;
    if let Some(token) = &settings.session_token {
        authority = authority.with_session_token(token.clone());
    }

    let runtime = EntryRuntime::new(
        settings.destination.clone(),
        &settings.entry_settings(),
        Arc::new(authority),
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<EntryCommand>(64);
    let (event_tx, mut event_rx) = mpsc::channel::<EntryEvent>(256);
    let (focus_tx, focus_rx) = watch::channel(Some(0));
    spawn_prompt_thread(cmd_tx, focus_rx);

    println!("{}", prompt::HELP);
    let session = tokio::spawn(runtime.run(cmd_rx, event_tx));

    let mut last_drawn: Option<ControllerSnapshot> = None;
    while let Some(event) = event_rx.recv().await {
        match event {
            EntryEvent::Snapshot(snapshot) => {
                focus_tx.send_replace(snapshot.focus);
                if render::should_redraw(last_drawn.as_ref(), &snapshot) {
                    println!("\n{}", render::render_snapshot(&snapshot));
                    last_drawn = Some(snapshot);
                }
            }
            EntryEvent::Verified { code } => {
                tracing::info!(code_len = code.len(), "verification complete");
            }
        }
    }

    match session.await.context("code entry task failed")? {
        SessionExit::Verified { .. } => println!("Code accepted."),
        SessionExit::Closed => println!("Closed without verifying."),
    }

    Ok(())
}

// Blocking stdin reads stay off the async runtime.
fn spawn_prompt_thread(cmd_tx: mpsc::Sender<EntryCommand>, focus_rx: watch::Receiver<Option<usize>>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };

            let focus = *focus_rx.borrow();
            match prompt::parse_command(&line, focus) {
                Ok(command) => {
                    let closing = command == EntryCommand::Close;
                    if cmd_tx.blocking_send(command).is_err() || closing {
                        return;
                    }
                }
                Err(err) => eprintln!("{err}"),
            }
        }

        let _ = cmd_tx.blocking_send(EntryCommand::Close);
    });
}
