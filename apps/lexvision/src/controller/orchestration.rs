//! Routes session commands to the client channels.
//!
//! Network-bound commands run as spawned tasks so the prompt stays live; a
//! second analysis can be typed while the first is in flight and the channel
//! answers `Busy` instead of queueing it. Results arrive on the client event
//! bus, so spawned tasks only report what the bus does not carry.

use std::sync::Arc;

use client_core::{AnalysisClient, AskOutcome, Document, ExportOutcome, SubmitOutcome, Transport};
use tokio::{
    sync::mpsc::{error::TrySendError, Sender},
    task::JoinSet,
};

use super::{
    commands::{SessionCommand, HELP},
    events::{UiError, UiErrorContext, UiEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn notify(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::warn!("ui event queue is full; dropping event"),
        Err(TrySendError::Closed(_)) => tracing::debug!("ui event receiver closed"),
    }
}

fn info(ui_tx: &Sender<UiEvent>, message: impl Into<String>) {
    notify(ui_tx, UiEvent::Info(message.into()));
}

/// Collects tasks that already finished so a long session does not keep
/// their results around. Never waits.
pub fn reap_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = tasks.try_join_next() {
        if let Err(err) = joined {
            tracing::warn!("session task ended abnormally: {err}");
        }
        reaped += 1;
    }
    reaped
}

pub async fn dispatch_session_command<T: Transport + 'static>(
    client: &Arc<AnalysisClient<T>>,
    cmd: SessionCommand,
    ui_tx: &Sender<UiEvent>,
    tasks: &mut JoinSet<()>,
) -> Flow {
    tracing::debug!(command = cmd.name(), "dispatching session command");

    match cmd {
        SessionCommand::SelectMode(mode) => {
            client.upload.select_mode(mode).await;
            info(ui_tx, format!("mode: {mode}"));
        }
        SessionCommand::SelectPrimary(path) => match Document::load(&path).await {
            Ok(document) => {
                let label = format!("file 1: {} ({} bytes)", document.file_name, document.len());
                client.upload.select_primary(document).await;
                info(ui_tx, label);
            }
            Err(err) => notify(
                ui_tx,
                UiEvent::Error(UiError::from_message(
                    UiErrorContext::Session,
                    format!("{err:#}"),
                )),
            ),
        },
        SessionCommand::SelectSecondary(path) => match Document::load(&path).await {
            Ok(document) => {
                let label = format!("file 2: {} ({} bytes)", document.file_name, document.len());
                client.upload.select_secondary(document).await;
                info(ui_tx, label);
            }
            Err(err) => notify(
                ui_tx,
                UiEvent::Error(UiError::from_message(
                    UiErrorContext::Session,
                    format!("{err:#}"),
                )),
            ),
        },
        SessionCommand::ClearSecondary => {
            client.upload.clear_secondary().await;
            info(ui_tx, "file 2 cleared");
        }
        SessionCommand::SetLanguage(language) => {
            client.upload.set_language(&language).await;
            let language = client.upload.snapshot().await.language;
            info(ui_tx, format!("language: {language}"));
        }
        SessionCommand::SetDetail(detail) => {
            client.upload.set_detail_level(detail).await;
            info(ui_tx, format!("detail: {detail}"));
        }
        SessionCommand::Analyze => {
            let client = Arc::clone(client);
            let ui_tx = ui_tx.clone();
            tasks.spawn(async move {
                if let Ok(SubmitOutcome::Busy) = client.upload.submit().await {
                    info(&ui_tx, "an analysis is already running");
                }
            });
        }
        SessionCommand::Ask(query) => {
            let client = Arc::clone(client);
            let ui_tx = ui_tx.clone();
            tasks.spawn(async move {
                match client.what_if.ask(&query).await {
                    Ok(AskOutcome::Answered(_)) => {}
                    Ok(AskOutcome::Busy) => info(&ui_tx, "a what-if question is already pending"),
                    Err(err) => notify(
                        &ui_tx,
                        UiEvent::Error(UiError::from_validation_error(
                            UiErrorContext::WhatIf,
                            &err,
                        )),
                    ),
                }
            });
        }
        SessionCommand::Dismiss => {
            client.what_if.dismiss().await;
            info(ui_tx, "what-if answer dismissed");
        }
        SessionCommand::Export => {
            let client = Arc::clone(client);
            let ui_tx = ui_tx.clone();
            tasks.spawn(async move {
                if let Ok(ExportOutcome::Busy) = client.export.export_current_result().await {
                    info(&ui_tx, "an export is already downloading");
                }
            });
        }
        SessionCommand::Show => {
            notify(ui_tx, UiEvent::Snapshot(client.upload.snapshot().await));
        }
        SessionCommand::ClearResult => {
            if client.upload.clear_result().await {
                info(ui_tx, "result cleared");
            } else {
                info(ui_tx, "cannot clear the result while an analysis is running");
            }
        }
        SessionCommand::Help => info(ui_tx, HELP),
        SessionCommand::Quit => {
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    tracing::warn!("session task ended abnormally: {err}");
                }
            }
            return Flow::Quit;
        }
    }

    Flow::Continue
}
