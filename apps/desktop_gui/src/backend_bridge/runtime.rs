//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use anyhow::Context as _;
use client_core::{ClientSettings, HttpPredictionClient, PredictionService};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: ClientSettings,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let (runtime, client) = match start_worker(&settings) {
            Ok(parts) => parts,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err:#}"),
                )));
                tracing::error!("backend worker startup failure: {err:#}");
                return;
            }
        };

        let client = Arc::new(client);
        runtime.block_on(async move {
            tracing::info!(endpoint = %client.endpoint(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Backend worker ready ({})",
                client.endpoint()
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Predict {
                        submission,
                        snapshot,
                    } => {
                        let outcome = client.predict(&snapshot).await;
                        // Blocking send: the UI stays in its submitting phase until this arrives.
                        if ui_tx
                            .send(UiEvent::PredictionResolved {
                                submission,
                                outcome,
                            })
                            .is_err()
                        {
                            tracing::warn!(%submission, "ui event queue closed before resolution");
                            break;
                        }
                    }
                    BackendCommand::Probe => {
                        // Informational only; must not hold up predictions queued behind it.
                        tokio::spawn(probe_service(Arc::clone(&client), ui_tx.clone()));
                    }
                }
            }
            tracing::info!("backend command queue closed; worker exiting");
        });
    })
}

async fn probe_service(client: Arc<HttpPredictionClient>, ui_tx: Sender<UiEvent>) {
    let event = match client.probe().await {
        Ok(banner) => UiEvent::Info(format!(
            "Prediction service reachable: {}",
            banner.message
        )),
        Err(err) => {
            tracing::warn!("prediction service probe failed: {err}");
            UiEvent::Error(UiError::from_message(
                UiErrorContext::Probe,
                format!("prediction service probe failed: {err}"),
            ))
        }
    };
    let _ = ui_tx.try_send(event);
}

fn start_worker(
    settings: &ClientSettings,
) -> anyhow::Result<(tokio::runtime::Runtime, HttpPredictionClient)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build backend runtime")?;
    let client = HttpPredictionClient::new(settings).context("failed to build prediction client")?;
    Ok((runtime, client))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum::{
        http::header,
        routing::{get, post},
        Router,
    };
    use crossbeam_channel::bounded;
    use shared::{
        domain::{ParameterSet, SubmissionId},
        protocol::PredictionOutcome,
    };

    use super::*;

    fn unreachable_settings() -> ClientSettings {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        let mut settings =
            ClientSettings::with_endpoint(&format!("http://127.0.0.1:{port}/predict"))
                .expect("settings");
        settings.request_timeout = Some(Duration::from_secs(5));
        settings
    }

    #[test]
    fn worker_resolves_predict_command_even_when_service_is_down() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(16);
        let handle = launch(cmd_rx, ui_tx, unreachable_settings());

        cmd_tx
            .send(BackendCommand::Predict {
                submission: SubmissionId(7),
                snapshot: ParameterSet::defaults(),
            })
            .expect("queue predict");

        let resolved = loop {
            match ui_rx.recv_timeout(Duration::from_secs(20)).expect("ui event") {
                UiEvent::PredictionResolved {
                    submission,
                    outcome,
                } => break (submission, outcome),
                UiEvent::Info(_) => continue,
                UiEvent::Error(err) => panic!("unexpected error event: {}", err.message()),
            }
        };
        assert_eq!(resolved.0, SubmissionId(7));
        assert!(matches!(
            resolved.1,
            PredictionOutcome::TransportError { .. }
        ));

        drop(cmd_tx);
        handle.join().expect("worker exits once the command queue closes");
    }

    #[test]
    fn probe_failure_is_reported_as_probe_error() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(16);
        let handle = launch(cmd_rx, ui_tx, unreachable_settings());

        cmd_tx.send(BackendCommand::Probe).expect("queue probe");

        let err = loop {
            match ui_rx.recv_timeout(Duration::from_secs(20)).expect("ui event") {
                UiEvent::Error(err) => break err,
                UiEvent::Info(_) => continue,
                UiEvent::PredictionResolved { .. } => panic!("probe must not resolve a submission"),
            }
        };
        assert_eq!(err.context(), UiErrorContext::Probe);

        drop(cmd_tx);
        handle.join().expect("worker exit");
    }

    const JSON_HEADER: [(header::HeaderName, &str); 1] = [(header::CONTENT_TYPE, "application/json")];

    /// Serves `/predict` immediately and stalls `GET /` for `root_delay`.
    fn spawn_service_with_slow_root(root_delay: Duration) -> ClientSettings {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind");
                addr_tx
                    .send(listener.local_addr().expect("addr"))
                    .expect("report addr");
                let app = Router::new()
                    .route(
                        "/",
                        get(move || async move {
                            tokio::time::sleep(root_delay).await;
                            (JSON_HEADER, r#"{"message":"Water potability prediction API"}"#)
                        }),
                    )
                    .route(
                        "/predict",
                        post(|| async { (JSON_HEADER, r#"{"potability":1}"#) }),
                    );
                let _ = axum::serve(listener, app).await;
            });
        });
        let addr = addr_rx.recv().expect("server addr");
        ClientSettings::with_endpoint(&format!("http://{addr}/predict")).expect("settings")
    }

    #[test]
    fn slow_service_root_does_not_delay_predictions() {
        let settings = spawn_service_with_slow_root(Duration::from_secs(30));
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(16);
        let handle = launch(cmd_rx, ui_tx, settings);

        let started = Instant::now();
        cmd_tx.send(BackendCommand::Probe).expect("queue probe");
        cmd_tx
            .send(BackendCommand::Predict {
                submission: SubmissionId(3),
                snapshot: ParameterSet::defaults(),
            })
            .expect("queue predict");

        let resolved = loop {
            match ui_rx.recv_timeout(Duration::from_secs(10)).expect("ui event") {
                UiEvent::PredictionResolved {
                    submission,
                    outcome,
                } => break (submission, outcome),
                UiEvent::Info(_) => continue,
                UiEvent::Error(err) => panic!("unexpected error event: {}", err.message()),
            }
        };
        assert_eq!(resolved, (SubmissionId(3), PredictionOutcome::Potable));
        assert!(started.elapsed() < Duration::from_secs(10));

        drop(cmd_tx);
        handle.join().expect("worker exits while the probe is still pending");
    }
}
