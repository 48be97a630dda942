use shared::{domain::MovieField, protocol::CreateMovieRequest};

use crate::error::{CatalogError, CatalogResult};

/// Raw text of the add-movie form, exactly as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub description: String,
    pub director: String,
    pub release_year: String,
    pub genre: String,
}

impl MovieForm {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the create request. Only the release year is checked here;
    /// everything else is left for the server to accept or reject.
    pub fn to_request(&self) -> CatalogResult<CreateMovieRequest> {
        let raw_year = self.release_year.trim();
        let release_year = raw_year
            .parse::<i32>()
            .map_err(|_| CatalogError::Validation {
                field: MovieField::ReleaseYear,
                message: if raw_year.is_empty() {
                    "a release year is required".to_string()
                } else {
                    format!("expected a whole number, got {raw_year:?}")
                },
            })?;

        Ok(CreateMovieRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            director: self.director.clone(),
            release_year,
            genre: self.genre.clone(),
        })
    }
}
