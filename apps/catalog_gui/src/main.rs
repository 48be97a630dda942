mod backend_bridge;
mod controller;
mod media;
mod ui;

use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::CatalogGuiApp;

#[derive(Parser, Debug)]
#[command(name = "movie-catalog-gui", about = "Desktop browser for a remote movie catalog")]
struct Args {
    /// Catalog server base URL (overrides catalog.toml and environment).
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    tracing::info!(server_url = %settings.server_url, "starting catalog gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let bridge = runtime::launch(settings, cmd_tx.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Movie Catalog")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Movie Catalog",
        options,
        Box::new(move |_cc| Ok(Box::new(CatalogGuiApp::new(cmd_tx, ui_rx, bridge)))),
    )
}
