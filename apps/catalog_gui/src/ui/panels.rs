//! Panels and windows drawn from a [`CatalogView`]. Each panel pushes the
//! backend commands triggered by the user into `actions`.

use client_core::{
    view::{AddFormView, DeletePromptView, DetailPanelView, ErrorView, MovieCardView},
    CatalogView, MovieForm,
};
use eframe::egui;
use shared::domain::MovieField;

use crate::backend_bridge::commands::BackendCommand;
use crate::media::{fit_within, PosterCache, PosterSlot};

const CARD_WIDTH: f32 = 240.0;
const CARD_POSTER_HEIGHT: f32 = 200.0;
const DETAIL_POSTER_HEIGHT: f32 = 360.0;

pub fn top_bar(ui: &mut egui::Ui, view: &CatalogView, actions: &mut Vec<BackendCommand>) {
    ui.horizontal(|ui| {
        ui.heading("Movie Catalog");
        ui.separator();
        if ui.button("Add movie").clicked() {
            actions.push(BackendCommand::OpenAddForm);
        }
        if ui
            .add_enabled(!view.collection_loading, egui::Button::new("Refresh"))
            .clicked()
        {
            actions.push(BackendCommand::LoadCollection);
        }
        if view.collection_loading {
            ui.spinner();
        }
    });
}

pub fn collection_banner(ui: &mut egui::Ui, error: &ErrorView, actions: &mut Vec<BackendCommand>) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.colored_label(ui.visuals().error_fg_color, &error.message);
            if error.retryable && ui.button("Retry").clicked() {
                actions.push(BackendCommand::LoadCollection);
            }
            if ui.button("Dismiss").clicked() {
                actions.push(BackendCommand::DismissCollectionError);
            }
        });
    });
}

pub fn card_grid(
    ui: &mut egui::Ui,
    view: &CatalogView,
    posters: &mut PosterCache,
    actions: &mut Vec<BackendCommand>,
) {
    if view.cards.is_empty() {
        if !view.collection_loading {
            ui.label("No movies in the catalog yet.");
        }
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for card in &view.cards {
                    movie_card(ui, card, posters, actions);
                }
            });
        });
}

fn movie_card(
    ui: &mut egui::Ui,
    card: &MovieCardView,
    posters: &mut PosterCache,
    actions: &mut Vec<BackendCommand>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(CARD_WIDTH);
        ui.vertical(|ui| {
            if let Some(poster_url) = &card.poster_url {
                let max = egui::vec2(CARD_WIDTH, CARD_POSTER_HEIGHT);
                poster(ui, posters, poster_url, max, actions);
            }
            let title = ui.add(
                egui::Label::new(egui::RichText::new(&card.title).strong().size(16.0))
                    .sense(egui::Sense::click()),
            );
            if title.clicked() {
                actions.push(BackendCommand::LoadDetail { movie_id: card.id });
            }
            ui.weak(&card.release_year);
            ui.add(egui::Label::new(&card.description).wrap());
            ui.horizontal(|ui| {
                if ui.button("Details").clicked() {
                    actions.push(BackendCommand::LoadDetail { movie_id: card.id });
                }
                if ui.button("Delete").clicked() {
                    actions.push(BackendCommand::StageDelete { movie_id: card.id });
                }
            });
        });
    });
}

pub fn detail_window(
    ctx: &egui::Context,
    panel: &DetailPanelView,
    posters: &mut PosterCache,
    actions: &mut Vec<BackendCommand>,
) {
    let mut open = true;
    egui::Window::new("Movie details")
        .id(egui::Id::new("movie_detail_window"))
        .collapsible(false)
        .default_width(420.0)
        .open(&mut open)
        .show(ctx, |ui| {
            if panel.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading movie...");
                });
            }
            if let Some(error) = &panel.error {
                ui.colored_label(ui.visuals().error_fg_color, &error.message);
                if let Some(movie_id) = panel.requested.filter(|_| error.retryable) {
                    if ui.button("Retry").clicked() {
                        actions.push(BackendCommand::LoadDetail { movie_id });
                    }
                }
            }
            let Some(movie) = &panel.movie else {
                return;
            };

            if let Some(poster_url) = &movie.poster_url {
                let max = egui::vec2(ui.available_width(), DETAIL_POSTER_HEIGHT);
                poster(ui, posters, poster_url, max, actions);
            }
            ui.heading(&movie.title);
            if !movie.genres.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for genre in &movie.genres {
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.small(genre);
                        });
                    }
                });
            }
            egui::Grid::new("movie_detail_facts")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for (label, value) in [
                        ("Director", &movie.director),
                        ("Release year", &movie.release_year),
                        ("Duration", &movie.duration),
                        ("Rating", &movie.rating),
                    ] {
                        ui.strong(label);
                        ui.label(value);
                        ui.end_row();
                    }
                });
            ui.separator();
            ui.add(egui::Label::new(&movie.description).wrap());
        });

    if !open {
        actions.push(BackendCommand::CloseDetail);
    }
}

/// Draws the poster for `url`, queueing its fetch on first sight. Falls back
/// to a link while the image is unavailable.
fn poster(
    ui: &mut egui::Ui,
    posters: &mut PosterCache,
    url: &str,
    max: egui::Vec2,
    actions: &mut Vec<BackendCommand>,
) {
    posters.request(url, actions);
    let ctx = ui.ctx().clone();
    match posters.slot(&ctx, url) {
        PosterSlot::Ready { texture, size } => {
            ui.add(egui::Image::new(&texture).fit_to_exact_size(fit_within(size, max)));
        }
        PosterSlot::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.weak("Loading poster...");
            });
        }
        PosterSlot::Failed(reason) => {
            ui.hyperlink_to("Poster unavailable (open link)", url)
                .on_hover_text(reason);
        }
    }
}

pub fn add_form_window(
    ctx: &egui::Context,
    form: &AddFormView,
    draft: &mut MovieForm,
    actions: &mut Vec<BackendCommand>,
) {
    let mut open = true;
    egui::Window::new("Add movie")
        .id(egui::Id::new("add_movie_window"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.add_enabled_ui(!form.submitting, |ui| {
                form_field(ui, form, MovieField::Title, &mut draft.title, false);
                form_field(ui, form, MovieField::Description, &mut draft.description, true);
                form_field(ui, form, MovieField::Director, &mut draft.director, false);
                form_field(ui, form, MovieField::ReleaseYear, &mut draft.release_year, false);
                form_field(ui, form, MovieField::Genre, &mut draft.genre, false);
                ui.weak("Separate genres with commas.");
            });

            if let Some(error) = form.error.as_ref().filter(|error| error.field.is_none()) {
                ui.colored_label(ui.visuals().error_fg_color, &error.message);
            }

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!form.submitting, egui::Button::new(submit_label(form)))
                    .clicked()
                {
                    actions.push(BackendCommand::SubmitCreate {
                        form: draft.clone(),
                    });
                }
                if ui.button("Cancel").clicked() {
                    actions.push(BackendCommand::CloseAddForm);
                }
                if form.submitting {
                    ui.spinner();
                }
            });
        });

    if !open {
        actions.push(BackendCommand::CloseAddForm);
    }
}

fn form_field(
    ui: &mut egui::Ui,
    form: &AddFormView,
    field: MovieField,
    value: &mut String,
    multiline: bool,
) {
    ui.label(field_caption(field));
    if multiline {
        ui.add(egui::TextEdit::multiline(value).desired_rows(3));
    } else {
        ui.text_edit_singleline(value);
    }
    if let Some(message) = field_error(form, field) {
        ui.colored_label(ui.visuals().error_fg_color, message);
    }
}

pub fn delete_window(
    ctx: &egui::Context,
    prompt: &DeletePromptView,
    actions: &mut Vec<BackendCommand>,
) {
    let mut open = true;
    egui::Window::new("Delete movie")
        .id(egui::Id::new("delete_movie_window"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(delete_question(prompt));
            if let Some(error) = &prompt.error {
                ui.colored_label(ui.visuals().error_fg_color, &error.message);
            }
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!prompt.in_flight, egui::Button::new(confirm_label(prompt)))
                    .clicked()
                {
                    actions.push(BackendCommand::ConfirmDelete);
                }
                if ui.button("Cancel").clicked() {
                    actions.push(BackendCommand::CancelDelete);
                }
                if prompt.in_flight {
                    ui.spinner();
                }
            });
        });

    if !open {
        actions.push(BackendCommand::CancelDelete);
    }
}

fn field_caption(field: MovieField) -> &'static str {
    match field {
        MovieField::Title => "Title",
        MovieField::Description => "Description",
        MovieField::Director => "Director",
        MovieField::ReleaseYear => "Release year",
        MovieField::Genre => "Genre",
    }
}

fn field_error(form: &AddFormView, field: MovieField) -> Option<&str> {
    form.error
        .as_ref()
        .filter(|error| error.field == Some(field))
        .map(|error| error.message.as_str())
}

fn submit_label(form: &AddFormView) -> &'static str {
    if form.submitting {
        "Saving..."
    } else if form.error.is_some() {
        "Try again"
    } else {
        "Save"
    }
}

fn delete_question(prompt: &DeletePromptView) -> String {
    match &prompt.title {
        Some(title) => format!("Delete \"{title}\"? This cannot be undone."),
        None => format!("Delete movie {}? This cannot be undone.", prompt.movie_id),
    }
}

fn confirm_label(prompt: &DeletePromptView) -> &'static str {
    if prompt.in_flight {
        "Deleting..."
    } else if prompt.error.is_some() {
        "Retry delete"
    } else {
        "Delete"
    }
}
