//! UI layer for the catalog GUI: app shell and panels.

pub mod app;
pub mod panels;

pub use app::CatalogGuiApp;
