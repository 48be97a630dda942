//! Reducer-like catalog state. Every transition is synchronous and free of
//! I/O; the controller wraps these around the network calls.

use shared::{
    domain::MovieId,
    protocol::{CreateMovieRequest, Movie},
};
use tracing::debug;

use crate::{
    error::{CatalogError, CatalogResult},
    form::MovieForm,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

impl Visibility {
    pub fn is_open(self) -> bool {
        self == Visibility::Open
    }
}

/// Identifies one issued read so that only the latest response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    pub movies: Vec<Movie>,
    pub loading: bool,
    pub error: Option<CatalogError>,
    latest: Option<Ticket>,
}

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub visibility: Visibility,
    pub requested: Option<MovieId>,
    pub movie: Option<Movie>,
    pub loading: bool,
    pub error: Option<CatalogError>,
    latest: Option<Ticket>,
}

#[derive(Debug, Clone, Default)]
pub struct AddFormState {
    pub visibility: Visibility,
    pub fields: MovieForm,
    pub submitting: bool,
    pub error: Option<CatalogError>,
}

/// `pending` is the single staged delete target; the prompt is open exactly
/// while it is set.
#[derive(Debug, Clone, Default)]
pub struct DeleteState {
    pub pending: Option<MovieId>,
    pub in_flight: bool,
    pub error: Option<CatalogError>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub collection: CollectionState,
    pub detail: DetailState,
    pub add_form: AddFormState,
    pub delete: DeleteState,
    next_ticket: u64,
}

impl CatalogState {
    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    pub fn begin_collection_load(&mut self) -> Ticket {
        let ticket = self.issue_ticket();
        self.collection.latest = Some(ticket);
        self.collection.loading = true;
        ticket
    }

    /// Returns `false` when a newer load superseded this one. A failure keeps
    /// the previously loaded movies untouched.
    pub fn finish_collection_load(
        &mut self,
        ticket: Ticket,
        result: CatalogResult<Vec<Movie>>,
    ) -> bool {
        if self.collection.latest != Some(ticket) {
            debug!(?ticket, "discarding superseded collection response");
            return false;
        }
        self.collection.loading = false;
        match result {
            Ok(movies) => {
                self.collection.movies = movies;
                self.collection.error = None;
            }
            Err(err) => self.collection.error = Some(err),
        }
        true
    }

    pub fn dismiss_collection_error(&mut self) {
        self.collection.error = None;
    }

    pub fn begin_detail_load(&mut self, movie_id: MovieId) -> Ticket {
        let ticket = self.issue_ticket();
        let detail = &mut self.detail;
        detail.latest = Some(ticket);
        detail.visibility = Visibility::Open;
        detail.loading = true;
        detail.error = None;
        if detail.requested != Some(movie_id) {
            detail.movie = None;
        }
        detail.requested = Some(movie_id);
        ticket
    }

    pub fn finish_detail_load(&mut self, ticket: Ticket, result: CatalogResult<Movie>) -> bool {
        let detail = &mut self.detail;
        if detail.latest != Some(ticket) {
            debug!(?ticket, "discarding superseded detail response");
            return false;
        }
        detail.loading = false;
        match result {
            Ok(movie) => {
                detail.movie = Some(movie);
                detail.error = None;
            }
            Err(err) => {
                detail.movie = None;
                detail.error = Some(err);
            }
        }
        true
    }

    /// Closing also acknowledges any detail error. A response still in
    /// flight is discarded when it lands.
    pub fn close_detail(&mut self) {
        self.detail = DetailState::default();
    }

    pub fn open_add_form(&mut self) {
        self.add_form.visibility = Visibility::Open;
    }

    /// Typed values survive a close; only a successful create clears them.
    pub fn close_add_form(&mut self) {
        self.add_form.visibility = Visibility::Closed;
        self.add_form.error = None;
    }

    pub fn begin_create(&mut self, form: MovieForm) -> CatalogResult<CreateMovieRequest> {
        let add_form = &mut self.add_form;
        if add_form.submitting {
            return Err(CatalogError::Busy("create"));
        }
        add_form.visibility = Visibility::Open;
        add_form.fields = form;
        match add_form.fields.to_request() {
            Ok(request) => {
                add_form.submitting = true;
                add_form.error = None;
                Ok(request)
            }
            Err(err) => {
                add_form.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn finish_create(&mut self, result: &CatalogResult<Movie>) {
        let add_form = &mut self.add_form;
        add_form.submitting = false;
        match result {
            Ok(_) => *add_form = AddFormState::default(),
            Err(err) => {
                add_form.visibility = Visibility::Open;
                add_form.error = Some(err.clone());
            }
        }
    }

    /// Staging overwrites any previously staged target.
    pub fn stage_delete(&mut self, movie_id: MovieId) {
        self.delete.pending = Some(movie_id);
        self.delete.error = None;
    }

    pub fn cancel_delete(&mut self) {
        self.delete.pending = None;
        self.delete.error = None;
    }

    /// Returns the staged id to send, or `None` when nothing is staged or a
    /// delete is already outstanding.
    pub fn begin_delete(&mut self) -> Option<MovieId> {
        if self.delete.in_flight {
            return None;
        }
        let movie_id = self.delete.pending?;
        self.delete.in_flight = true;
        self.delete.error = None;
        Some(movie_id)
    }

    /// On failure the target stays staged so the prompt can offer a retry.
    pub fn finish_delete(&mut self, movie_id: MovieId, result: &CatalogResult<()>) {
        self.delete.in_flight = false;
        if self.delete.pending != Some(movie_id) {
            return;
        }
        match result {
            Ok(()) => self.cancel_delete(),
            Err(err) => self.delete.error = Some(err.clone()),
        }
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.collection
            .movies
            .iter()
            .find(|movie| movie.id == movie_id)
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
