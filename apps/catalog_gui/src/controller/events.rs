//! UI/backend events and error modeling for the catalog GUI.

use client_core::{CatalogError, CatalogEvent, CatalogView};
use shared::domain::MovieId;

use crate::media::PosterImage;

pub enum UiEvent {
    Info(String),
    ViewChanged(CatalogView),
    MovieCreated { title: String },
    MovieDeleted(MovieId),
    PosterLoaded { url: String, image: PosterImage },
    PosterFailed { url: String, reason: String },
    Error(UiError),
}

impl From<CatalogEvent> for UiEvent {
    fn from(event: CatalogEvent) -> Self {
        match event {
            CatalogEvent::ViewChanged(view) => UiEvent::ViewChanged(view),
            CatalogEvent::MovieCreated(movie) => UiEvent::MovieCreated { title: movie.title },
            CatalogEvent::MovieDeleted(movie_id) => UiEvent::MovieDeleted(movie_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Configuration,
    Runtime,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
}

/// Failures outside the catalog view itself. Request errors are carried by
/// [`CatalogView`] and never arrive here.
#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_catalog(context: UiErrorContext, err: &CatalogError) -> Self {
        let category = match err {
            CatalogError::Config(_) => UiErrorCategory::Configuration,
            _ => UiErrorCategory::Unknown,
        };
        Self::new(category, context, err.to_string())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn guidance(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Configuration => {
                "Check server_url in catalog.toml or CATALOG_SERVER_URL and relaunch."
            }
            UiErrorCategory::Runtime => "The backend worker could not start; relaunch the app.",
            UiErrorCategory::Unknown => "Relaunch the app and try again.",
        }
    }
}
