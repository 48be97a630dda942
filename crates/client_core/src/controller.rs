use std::sync::Arc;

use shared::{domain::MovieId, protocol::Movie};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::CatalogResult,
    form::MovieForm,
    state::CatalogState,
    view::{render, CatalogView},
    CatalogApi,
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// Emitted after every state transition with the freshly rendered view.
    ViewChanged(CatalogView),
    MovieCreated(Movie),
    MovieDeleted(MovieId),
}

/// Keeps the rendered catalog in step with the server.
///
/// The state lock is only held for synchronous transitions, never across a
/// network call, so operations may be driven concurrently. Every successful
/// mutation is followed by a full collection reload.
pub struct CatalogController {
    api: Arc<dyn CatalogApi>,
    state: Mutex<CatalogState>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            api,
            state: Mutex::new(CatalogState::default()),
            events,
        })
    }

    /// Registers a listener for view changes. Dropping the receiver
    /// unregisters it.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> CatalogView {
        render(&*self.state.lock().await)
    }

    async fn update<R>(&self, apply: impl FnOnce(&mut CatalogState) -> R) -> R {
        let mut guard = self.state.lock().await;
        let result = apply(&mut *guard);
        // Sent under the lock so listeners observe views in transition order.
        let _ = self.events.send(CatalogEvent::ViewChanged(render(&guard)));
        result
    }

    fn emit(&self, event: CatalogEvent) {
        let _ = self.events.send(event);
    }

    /// Replaces the list with the server's collection. On failure the
    /// current list stays as it was and the error is kept for a retry.
    pub async fn load_collection(&self) -> CatalogResult<()> {
        let ticket = self.update(CatalogState::begin_collection_load).await;
        let result = self.api.list_movies().await;
        let outcome = result.as_ref().map(|_| ()).map_err(|err| err.clone());
        if let Err(err) = &outcome {
            warn!("failed to load movie collection: {err}");
        }
        self.update(|state| state.finish_collection_load(ticket, result))
            .await;
        outcome
    }

    pub async fn dismiss_collection_error(&self) {
        self.update(CatalogState::dismiss_collection_error).await;
    }

    /// Opens the detail panel for `movie_id`. If another detail load is
    /// issued before this one resolves, this response is dropped.
    pub async fn load_detail(&self, movie_id: MovieId) -> CatalogResult<()> {
        let ticket = self
            .update(|state| state.begin_detail_load(movie_id))
            .await;
        let result = self.api.get_movie(movie_id).await;
        let outcome = result.as_ref().map(|_| ()).map_err(|err| err.clone());
        if let Err(err) = &outcome {
            warn!(%movie_id, "failed to load movie detail: {err}");
        }
        self.update(|state| state.finish_detail_load(ticket, result))
            .await;
        outcome
    }

    pub async fn close_detail(&self) {
        self.update(CatalogState::close_detail).await;
    }

    pub async fn open_add_form(&self) {
        self.update(CatalogState::open_add_form).await;
    }

    pub async fn close_add_form(&self) {
        self.update(CatalogState::close_add_form).await;
    }

    /// Submits the form. On success the form is cleared and closed and the
    /// collection reloaded; on failure it stays open with its values.
    pub async fn request_create(&self, form: MovieForm) -> CatalogResult<Movie> {
        let request = self.update(|state| state.begin_create(form)).await?;
        let result = self.api.create_movie(&request).await;
        self.update(|state| state.finish_create(&result)).await;

        let movie = match result {
            Ok(movie) => movie,
            Err(err) => {
                warn!(title = %request.title, "failed to create movie: {err}");
                return Err(err);
            }
        };
        info!(movie_id = %movie.id, "created movie, refreshing collection");
        self.emit(CatalogEvent::MovieCreated(movie.clone()));
        self.refresh_after_mutation().await;
        Ok(movie)
    }

    /// Records `movie_id` as the delete target and opens the confirmation
    /// prompt. Nothing is sent to the server.
    pub async fn stage_delete(&self, movie_id: MovieId) {
        self.update(|state| state.stage_delete(movie_id)).await;
    }

    pub async fn cancel_delete(&self) {
        self.update(CatalogState::cancel_delete).await;
    }

    /// Deletes the staged movie. Returns `Ok(None)` without touching the
    /// network when nothing is staged or a delete is already outstanding.
    pub async fn confirm_delete(&self) -> CatalogResult<Option<MovieId>> {
        let Some(movie_id) = self.update(CatalogState::begin_delete).await else {
            return Ok(None);
        };

        let result = self.api.delete_movie(movie_id).await;
        self.update(|state| state.finish_delete(movie_id, &result))
            .await;

        if let Err(err) = result {
            warn!(%movie_id, "failed to delete movie: {err}");
            return Err(err);
        }
        self.emit(CatalogEvent::MovieDeleted(movie_id));
        self.refresh_after_mutation().await;
        Ok(Some(movie_id))
    }

    async fn refresh_after_mutation(&self) {
        // The reload failure is already recorded as the collection error.
        let _ = self.load_collection().await;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
