//! Controller layer: session commands, renderer events, and command orchestration.

pub mod commands;
pub mod events;
pub mod orchestration;

use std::sync::Arc;

use anyhow::Result;
use client_core::{AnalysisClient, ClientEvent, Transport};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinSet,
};

use crate::display;
use commands::{SessionCommand, HELP};
use events::UiEvent;
use orchestration::{dispatch_session_command, reap_finished, Flow};

const UI_QUEUE: usize = 64;

/// Line-driven interactive session over stdin. Returns once the user quits
/// (or stdin closes) and every request started from the prompt has finished.
pub async fn run_session<T: Transport + 'static>(client: Arc<AnalysisClient<T>>) -> Result<()> {
    let (ui_tx, mut ui_rx) = mpsc::channel(UI_QUEUE);
    let mut bus = client.subscribe_events();
    let mut tasks = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    loop {
        reap_finished(&mut tasks);
        tokio::select! {
            line = lines.next_line() => {
                let cmd = match line? {
                    Some(line) => match SessionCommand::parse(&line) {
                        Ok(Some(cmd)) => cmd,
                        Ok(None) => continue,
                        Err(message) => {
                            println!("{message}");
                            continue;
                        }
                    },
                    None => SessionCommand::Quit,
                };
                if dispatch_session_command(&client, cmd, &ui_tx, &mut tasks).await == Flow::Quit {
                    break;
                }
            }
            event = bus.recv() => match event {
                Ok(event) => show_client_event(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer fell behind the client event bus");
                }
                Err(RecvError::Closed) => break,
            },
            Some(event) = ui_rx.recv() => show(event),
        }
    }

    while let Ok(event) = bus.try_recv() {
        show_client_event(event);
    }
    while let Ok(event) = ui_rx.try_recv() {
        show(event);
    }
    Ok(())
}

fn show_client_event(event: ClientEvent) {
    if let Some(event) = UiEvent::from_client_event(event) {
        show(event);
    }
}

fn show(event: UiEvent) {
    match event {
        UiEvent::Info(text) => println!("{text}"),
        UiEvent::Phase(phase) => println!("analysis: {phase:?}..."),
        UiEvent::Published(view) => print!("{}", display::render_view(&view)),
        UiEvent::Answer(exchange) => println!("{}", display::render_exchange(&exchange)),
        UiEvent::Saved(path) => println!("report saved to {}", path.display()),
        UiEvent::Snapshot(snapshot) => print!("{}", display::render_snapshot(&snapshot)),
        UiEvent::Error(err) => eprintln!("{}", display::render_error(&err)),
    }
}
