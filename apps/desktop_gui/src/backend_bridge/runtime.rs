//! Backend worker: owns the tokio runtime and the HTTP client, turns
//! queued commands into service calls and answers with `UiEvent`s.

use std::thread;

use client_core::DiagnosisClient;
use crossbeam_channel::{Receiver, Sender};
use egui::Context;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(
    server_url: String,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    repaint: Context,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::CatalogFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                repaint.request_repaint();
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = DiagnosisClient::new(server_url);
            tracing::info!(base_url = client.base_url(), "backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                let event = handle_command(&client, cmd).await;
                if ui_tx.send(event).is_err() {
                    // UI side is gone; nothing left to serve.
                    break;
                }
                repaint.request_repaint();
            }
        });
    });
}

async fn handle_command(client: &DiagnosisClient, cmd: BackendCommand) -> UiEvent {
    tracing::debug!(command = cmd.name(), "processing ui->backend command");
    match cmd {
        BackendCommand::LoadCatalog => match client.fetch_symptoms().await {
            Ok(symptoms) => UiEvent::CatalogLoaded(symptoms),
            Err(err) => {
                tracing::warn!("catalog fetch failed: {err}");
                UiEvent::CatalogFailed(err.to_string())
            }
        },
        BackendCommand::RunDiagnosis { symptoms } => match client.diagnose(&symptoms).await {
            Ok(consultation) => UiEvent::DiagnosisReady(Box::new(consultation)),
            Err(err) => {
                tracing::warn!("diagnosis request failed: {err}");
                UiEvent::DiagnosisFailed(err.to_string())
            }
        },
        BackendCommand::FetchRules => match client.fetch_rules().await {
            Ok(rules) => UiEvent::RulesLoaded(rules),
            Err(err) => {
                tracing::warn!("rule listing failed: {err}");
                UiEvent::RulesFailed(err.to_string())
            }
        },
    }
}
