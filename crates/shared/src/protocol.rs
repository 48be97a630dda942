use serde::{Deserialize, Serialize};

use crate::domain::MovieId;

/// A movie as the catalog server returns it.
///
/// Optional fields are tolerated as missing or `null`; unknown fields are
/// ignored. `release_year` is optional because rows written with an
/// unparsable year are stored as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

/// Body of `POST /movies`. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: String,
    pub director: String,
    pub release_year: i32,
    pub genre: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
