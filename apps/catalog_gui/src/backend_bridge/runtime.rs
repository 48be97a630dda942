//! Runtime bridge between UI command queue and the catalog controller.

use std::{sync::Arc, thread};

use client_core::{CatalogController, CatalogResult, ClientSettings, HttpCatalogApi};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::media::decode_poster;

/// Owns the worker thread. Sends `Shutdown` and joins on [`BridgeHandle::shutdown`].
pub struct BridgeHandle {
    cmd_tx: Sender<BackendCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BridgeHandle {
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // A disconnected queue means the worker already exited.
        let _ = self.cmd_tx.send(BackendCommand::Shutdown);
        if worker.join().is_err() {
            tracing::error!("backend worker panicked during shutdown");
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn launch(
    settings: ClientSettings,
    cmd_tx: Sender<BackendCommand>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> BridgeHandle {
    let worker = thread::spawn(move || run_worker(settings, cmd_rx, ui_tx));
    BridgeHandle {
        cmd_tx,
        worker: Some(worker),
    }
}

fn report_startup_failure(ui_tx: &Sender<UiEvent>, error: UiError) {
    tracing::error!(category = ?error.category(), "{}", error.message());
    let _ = ui_tx.try_send(UiEvent::Error(error));
}

fn run_worker(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            report_startup_failure(
                &ui_tx,
                UiError::new(
                    UiErrorCategory::Runtime,
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                ),
            );
            return;
        }
    };

    runtime.block_on(async move {
        let api = match HttpCatalogApi::new(&settings) {
            Ok(api) => Arc::new(api),
            Err(err) => {
                report_startup_failure(
                    &ui_tx,
                    UiError::from_catalog(UiErrorContext::BackendStartup, &err),
                );
                return;
            }
        };
        let controller = CatalogController::new(api.clone());
        let worker = Worker {
            api,
            controller,
            ui_tx: ui_tx.clone(),
        };
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Using catalog server {}",
            settings.server_url
        )));

        let mut events = worker.controller.subscribe();
        let forward_tx = ui_tx.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match forward_tx.try_send(UiEvent::from(event)) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("ui event queue full; dropping catalog event")
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    },
                    // Every view event is a full snapshot, so skipped ones are superseded.
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "catalog event listener lagged")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        worker.spawn(BackendCommand::LoadCollection);
        while let Ok(cmd) = cmd_rx.recv() {
            if matches!(cmd, BackendCommand::Shutdown) {
                tracing::info!("backend worker shutting down");
                break;
            }
            if cmd.needs_network() {
                worker.spawn(cmd);
            } else {
                // Local transitions run before the next command is read, so
                // back-to-back stage/cancel/close commands apply in order.
                worker.run(cmd).await;
            }
        }
        forwarder.abort();
    });
}

#[derive(Clone)]
struct Worker {
    api: Arc<HttpCatalogApi>,
    controller: Arc<CatalogController>,
    ui_tx: Sender<UiEvent>,
}

impl Worker {
    fn spawn(&self, cmd: BackendCommand) {
        let worker = self.clone();
        tokio::spawn(async move { worker.run(cmd).await });
    }

    async fn run(&self, cmd: BackendCommand) {
        let cmd_name = cmd.name();
        // Request failures are already part of the rendered view.
        if let Err(err) = self.execute(cmd).await {
            tracing::debug!(command = cmd_name, "catalog command failed: {err}");
        }
    }

    async fn execute(&self, cmd: BackendCommand) -> CatalogResult<()> {
        let controller = &self.controller;
        match cmd {
            BackendCommand::LoadCollection => controller.load_collection().await,
            BackendCommand::DismissCollectionError => {
                controller.dismiss_collection_error().await;
                Ok(())
            }
            BackendCommand::LoadDetail { movie_id } => controller.load_detail(movie_id).await,
            BackendCommand::CloseDetail => {
                controller.close_detail().await;
                Ok(())
            }
            BackendCommand::OpenAddForm => {
                controller.open_add_form().await;
                Ok(())
            }
            BackendCommand::CloseAddForm => {
                controller.close_add_form().await;
                Ok(())
            }
            BackendCommand::SubmitCreate { form } => {
                controller.request_create(form).await.map(|_| ())
            }
            BackendCommand::StageDelete { movie_id } => {
                controller.stage_delete(movie_id).await;
                Ok(())
            }
            BackendCommand::ConfirmDelete => controller.confirm_delete().await.map(|_| ()),
            BackendCommand::CancelDelete => {
                controller.cancel_delete().await;
                Ok(())
            }
            BackendCommand::FetchPoster { url } => {
                self.fetch_poster(url).await;
                Ok(())
            }
            BackendCommand::Shutdown => Ok(()),
        }
    }

    async fn fetch_poster(&self, url: String) {
        let decoded = match self.api.fetch_poster(&url).await {
            Ok(bytes) => decode_poster(&bytes),
            Err(err) => Err(err.to_string()),
        };
        let event = match decoded {
            Ok(image) => UiEvent::PosterLoaded { url, image },
            Err(reason) => {
                tracing::warn!(%url, "poster unavailable: {reason}");
                UiEvent::PosterFailed { url, reason }
            }
        };
        let _ = self.ui_tx.try_send(event);
    }
}
