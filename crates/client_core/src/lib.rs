use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::MovieId,
    protocol::{CreateMovieRequest, Movie},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod controller;
pub mod error;
pub mod form;
pub mod settings;
pub mod state;
pub mod view;

pub use controller::{CatalogController, CatalogEvent};
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use form::MovieForm;
pub use settings::{load_settings, ClientSettings};
pub use view::CatalogView;

/// Remote movie catalog as the controller sees it.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_movies(&self) -> CatalogResult<Vec<Movie>>;
    async fn get_movie(&self, movie_id: MovieId) -> CatalogResult<Movie>;
    async fn create_movie(&self, request: &CreateMovieRequest) -> CatalogResult<Movie>;
    async fn delete_movie(&self, movie_id: MovieId) -> CatalogResult<()>;
}

/// `CatalogApi` over HTTP/JSON.
///
/// Every request carries the configured timeout. Reads are retried with
/// exponential backoff on retryable failures; mutations are sent once.
pub struct HttpCatalogApi {
    http: Client,
    base_url: Url,
    timeout: Duration,
    read_retries: u32,
    retry_backoff: Duration,
}

impl HttpCatalogApi {
    pub fn new(settings: &ClientSettings) -> CatalogResult<Self> {
        let base_url = parse_base_url(&settings.server_url)?;
        let timeout = settings.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CatalogError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            timeout,
            read_retries: settings.read_retries,
            retry_backoff: settings.retry_backoff(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> CatalogResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| CatalogError::Config(format!("invalid endpoint '{path}': {err}")))
    }

    async fn send(&self, request: RequestBuilder) -> CatalogResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| CatalogError::from_transport(err, self.timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::from_status(status, &body))
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> CatalogResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CatalogError::from_transport(err, self.timeout))?;
        serde_json::from_slice(&bytes).map_err(|err| CatalogError::Decode(err.to_string()))
    }

    /// Downloads a poster image. Relative URLs resolve against the server
    /// base URL; absolute ones are used as given. Sent once, like mutations.
    pub async fn fetch_poster(&self, poster_url: &str) -> CatalogResult<Vec<u8>> {
        let url = self
            .base_url
            .join(poster_url.trim())
            .map_err(|err| CatalogError::Decode(format!("invalid poster url '{poster_url}': {err}")))?;
        let response = self.send(self.http.get(url)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CatalogError::from_transport(err, self.timeout))?;
        debug!(%poster_url, len = bytes.len(), "fetched poster");
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CatalogResult<T> {
        let url = self.endpoint(path)?;
        let mut attempt = 0;
        loop {
            let result = match self.send(self.http.get(url.clone())).await {
                Ok(response) => self.decode(response).await,
                Err(err) => Err(err),
            };

            match result {
                Err(err) if err.is_retryable() && attempt < self.read_retries => {
                    let delay = backoff_delay(self.retry_backoff, attempt);
                    warn!(%url, attempt = attempt + 1, ?delay, "catalog read failed, retrying: {err}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_movies(&self) -> CatalogResult<Vec<Movie>> {
        let movies: Vec<Movie> = self.get_json("movies").await?;
        debug!(count = movies.len(), "fetched movie collection");
        Ok(movies)
    }

    async fn get_movie(&self, movie_id: MovieId) -> CatalogResult<Movie> {
        self.get_json(&format!("movie/{movie_id}")).await
    }

    async fn create_movie(&self, request: &CreateMovieRequest) -> CatalogResult<Movie> {
        let url = self.endpoint("movies")?;
        let response = self.send(self.http.post(url).json(request)).await?;
        let movie: Movie = self.decode(response).await?;
        info!(movie_id = %movie.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    async fn delete_movie(&self, movie_id: MovieId) -> CatalogResult<()> {
        let url = self.endpoint(&format!("movies/{movie_id}"))?;
        self.send(self.http.delete(url)).await?;
        info!(%movie_id, "movie deleted");
        Ok(())
    }
}

/// Accepts the base URL with or without a trailing slash; relative endpoint
/// paths are joined beneath its path.
pub fn parse_base_url(raw: &str) -> CatalogResult<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw)
        .map_err(|err| CatalogError::Config(format!("invalid server url '{raw}': {err}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::Config(format!(
            "server url '{raw}' must be an http(s) url"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
