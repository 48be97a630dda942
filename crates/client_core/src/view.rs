//! Pure mapping from catalog state to what a front-end draws.
//!
//! Nothing here performs I/O. Front-ends re-render from a fresh
//! [`CatalogView`] after every state change instead of patching widgets.

use shared::{
    domain::{MovieField, MovieId},
    protocol::Movie,
};

use crate::{
    error::{CatalogError, ErrorKind},
    form::MovieForm,
    state::CatalogState,
};

pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_DIRECTOR: &str = "Unavailable";
pub const DEFAULT_DURATION: &str = "2h 20m";
pub const DEFAULT_RATING: &str = "8.9/10";
pub const NO_RELEASE_YEAR: &str = "Unknown";
pub const CARD_DESCRIPTION_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieCardView {
    /// Activating the card loads this id; the delete control stages it.
    pub id: MovieId,
    pub title: String,
    pub release_year: String,
    pub description: String,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetailView {
    pub id: MovieId,
    pub title: String,
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
    pub director: String,
    pub release_year: String,
    pub duration: String,
    pub rating: String,
    pub description: String,
}

/// Where an error is shown, which decides the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Collection,
    Detail,
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
    pub field: Option<MovieField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanelView {
    pub requested: Option<MovieId>,
    pub loading: bool,
    pub movie: Option<MovieDetailView>,
    pub error: Option<ErrorView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFormView {
    pub fields: MovieForm,
    pub submitting: bool,
    pub error: Option<ErrorView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePromptView {
    pub movie_id: MovieId,
    pub title: Option<String>,
    pub in_flight: bool,
    pub error: Option<ErrorView>,
}

/// Panels are `Some` exactly while they are open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogView {
    pub cards: Vec<MovieCardView>,
    pub collection_loading: bool,
    pub collection_error: Option<ErrorView>,
    pub detail: Option<DetailPanelView>,
    pub add_form: Option<AddFormView>,
    pub delete_prompt: Option<DeletePromptView>,
}

pub fn render(state: &CatalogState) -> CatalogView {
    let detail = state
        .detail
        .visibility
        .is_open()
        .then(|| DetailPanelView {
            requested: state.detail.requested,
            loading: state.detail.loading,
            movie: state.detail.movie.as_ref().map(movie_detail),
            error: state
                .detail
                .error
                .as_ref()
                .map(|err| describe_error(err, ErrorContext::Detail)),
        });

    let add_form = state.add_form.visibility.is_open().then(|| AddFormView {
        fields: state.add_form.fields.clone(),
        submitting: state.add_form.submitting,
        error: state
            .add_form
            .error
            .as_ref()
            .map(|err| describe_error(err, ErrorContext::Create)),
    });

    let delete_prompt = state.delete.pending.map(|movie_id| DeletePromptView {
        movie_id,
        title: state.movie(movie_id).map(|movie| movie.title.clone()),
        in_flight: state.delete.in_flight,
        error: state
            .delete
            .error
            .as_ref()
            .map(|err| describe_error(err, ErrorContext::Delete)),
    });

    CatalogView {
        cards: state.collection.movies.iter().map(movie_card).collect(),
        collection_loading: state.collection.loading,
        collection_error: state
            .collection
            .error
            .as_ref()
            .map(|err| describe_error(err, ErrorContext::Collection)),
        detail,
        add_form,
        delete_prompt,
    }
}

pub fn movie_card(movie: &Movie) -> MovieCardView {
    MovieCardView {
        id: movie.id,
        title: movie.title.clone(),
        release_year: release_year(movie),
        description: match present(&movie.description) {
            Some(text) => truncate_description(text, CARD_DESCRIPTION_CHARS),
            None => NO_DESCRIPTION.to_string(),
        },
        poster_url: present(&movie.poster_url).map(str::to_string),
    }
}

pub fn movie_detail(movie: &Movie) -> MovieDetailView {
    MovieDetailView {
        id: movie.id,
        title: movie.title.clone(),
        poster_url: present(&movie.poster_url).map(str::to_string),
        genres: genre_tags(&movie.genre),
        director: present(&movie.director).unwrap_or(NO_DIRECTOR).to_string(),
        release_year: release_year(movie),
        duration: present(&movie.duration)
            .unwrap_or(DEFAULT_DURATION)
            .to_string(),
        rating: present(&movie.rating).unwrap_or(DEFAULT_RATING).to_string(),
        description: present(&movie.description)
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
    }
}

/// Splits the comma-separated genre field into trimmed tags, in order.
/// Every segment is kept, including duplicates and empty ones; only a blank
/// field yields no tags.
pub fn genre_tags(genre: &str) -> Vec<String> {
    if genre.trim().is_empty() {
        return Vec::new();
    }
    genre.split(',').map(|tag| tag.trim().to_string()).collect()
}

pub fn truncate_description(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push('…');
    truncated
}

pub fn describe_error(err: &CatalogError, context: ErrorContext) -> ErrorView {
    let message = match (err, context) {
        (CatalogError::Timeout(after), _) => format!(
            "The catalog server did not answer within {}s. Please retry.",
            after.as_secs()
        ),
        (CatalogError::Network(_), _) => {
            "Could not reach the catalog server. Check the connection and retry.".to_string()
        }
        (CatalogError::NotFound(_), ErrorContext::Detail) => {
            "This movie could not be found. It may have been deleted.".to_string()
        }
        (CatalogError::NotFound(_), ErrorContext::Delete) => {
            "This movie could not be found. It may already be deleted.".to_string()
        }
        (CatalogError::NotFound(message), _) => format!("Not found: {message}"),
        (CatalogError::Client { message, .. }, ErrorContext::Create) => {
            format!("The movie was not saved: {message}")
        }
        (CatalogError::Client { message, .. }, _) => {
            format!("The server rejected the request: {message}")
        }
        (CatalogError::Server { .. } | CatalogError::Decode(_), _) => {
            "The catalog server failed to handle the request. Please retry.".to_string()
        }
        (CatalogError::Validation { field, message }, _) => {
            format!("Invalid {}: {message}", field.label())
        }
        (CatalogError::Busy(_), _) => "Still working on the previous request.".to_string(),
        (CatalogError::Config(message), _) => format!("Client misconfigured: {message}"),
    };

    ErrorView {
        kind: err.kind(),
        message,
        retryable: err.is_retryable(),
        field: err.field(),
    }
}

fn release_year(movie: &Movie) -> String {
    movie
        .release_year
        .map_or_else(|| NO_RELEASE_YEAR.to_string(), |year| year.to_string())
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
