use std::time::Duration;

use client_core::{CatalogView, MovieForm};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::{commands::BackendCommand, runtime::BridgeHandle};
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::media::PosterCache;
use crate::ui::panels;

pub struct CatalogGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    // Dropped with the app, which stops and joins the backend worker.
    _bridge: BridgeHandle,
    view: CatalogView,
    /// Edited locally; a copy is sent on submit and it is reset once the
    /// movie is created.
    draft: MovieForm,
    status: String,
    startup_error: Option<UiError>,
    posters: PosterCache,
}

impl CatalogGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        bridge: BridgeHandle,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            _bridge: bridge,
            view: CatalogView::default(),
            draft: MovieForm::default(),
            status: "Starting backend worker...".to_string(),
            startup_error: None,
            posters: PosterCache::default(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::ViewChanged(view) => self.view = view,
                UiEvent::MovieCreated { title } => {
                    self.draft = MovieForm::default();
                    self.status = format!("Added \"{title}\"");
                }
                UiEvent::MovieDeleted(movie_id) => {
                    self.status = format!("Deleted movie {movie_id}");
                }
                UiEvent::PosterLoaded { url, image } => self.posters.loaded(url, image),
                UiEvent::PosterFailed { url, reason } => self.posters.failed(url, reason),
                UiEvent::Error(error) => {
                    tracing::warn!(context = ?error.context(), "{}", error.message());
                    self.status = error.message().to_string();
                    self.startup_error = Some(error);
                }
            }
        }
    }

    fn startup_error_screen(&self, ctx: &egui::Context) {
        let Some(error) = &self.startup_error else {
            return;
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("The catalog backend could not start");
            ui.colored_label(ui.visuals().error_fg_color, error.message());
            ui.label(error.guidance());
        });
    }
}

impl eframe::App for CatalogGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if self.startup_error.is_some() {
            self.startup_error_screen(ctx);
            return;
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("catalog_top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.view, &mut actions);
        });
        egui::TopBottomPanel::bottom("catalog_status_bar").show(ctx, |ui| {
            ui.weak(&self.status);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.view.collection_error {
                panels::collection_banner(ui, error, &mut actions);
                ui.add_space(6.0);
            }
            panels::card_grid(ui, &self.view, &mut self.posters, &mut actions);
        });

        if let Some(panel) = &self.view.detail {
            panels::detail_window(ctx, panel, &mut self.posters, &mut actions);
        }
        if let Some(form) = &self.view.add_form {
            panels::add_form_window(ctx, form, &mut self.draft, &mut actions);
        }
        if let Some(prompt) = &self.view.delete_prompt {
            panels::delete_window(ctx, prompt, &mut actions);
        }

        for action in actions {
            let poster_url = match &action {
                BackendCommand::FetchPoster { url } => Some(url.clone()),
                _ => None,
            };
            let queued = dispatch_backend_command(&self.cmd_tx, action, &mut self.status);
            if let (false, Some(url)) = (queued, poster_url) {
                self.posters.forget(&url);
            }
        }

        let busy = self.view.collection_loading
            || self.view.detail.as_ref().is_some_and(|panel| panel.loading)
            || self.posters.has_pending();
        let repaint_after = if busy { 16 } else { 100 };
        ctx.request_repaint_after(Duration::from_millis(repaint_after));
    }
}
