//! Backend commands queued from UI to backend worker.

use client_core::MovieForm;
use shared::domain::MovieId;

#[derive(Debug)]
pub enum BackendCommand {
    LoadCollection,
    DismissCollectionError,
    LoadDetail { movie_id: MovieId },
    CloseDetail,
    OpenAddForm,
    CloseAddForm,
    SubmitCreate { form: MovieForm },
    StageDelete { movie_id: MovieId },
    ConfirmDelete,
    CancelDelete,
    FetchPoster { url: String },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadCollection => "load_collection",
            BackendCommand::DismissCollectionError => "dismiss_collection_error",
            BackendCommand::LoadDetail { .. } => "load_detail",
            BackendCommand::CloseDetail => "close_detail",
            BackendCommand::OpenAddForm => "open_add_form",
            BackendCommand::CloseAddForm => "close_add_form",
            BackendCommand::SubmitCreate { .. } => "submit_create",
            BackendCommand::StageDelete { .. } => "stage_delete",
            BackendCommand::ConfirmDelete => "confirm_delete",
            BackendCommand::CancelDelete => "cancel_delete",
            BackendCommand::FetchPoster { .. } => "fetch_poster",
            BackendCommand::Shutdown => "shutdown",
        }
    }

    /// Commands that wait on the server run as their own task. Everything
    /// else is a local state transition applied in queue order.
    pub fn needs_network(&self) -> bool {
        matches!(
            self,
            BackendCommand::LoadCollection
                | BackendCommand::LoadDetail { .. }
                | BackendCommand::SubmitCreate { .. }
                | BackendCommand::ConfirmDelete
                | BackendCommand::FetchPoster { .. }
        )
    }
}
