use super::*;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct MockCatalogState {
    movies: Arc<Mutex<Vec<Movie>>>,
    created: Arc<Mutex<Vec<serde_json::Value>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
    list_failures_remaining: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
    mutations_unavailable: Arc<AtomicBool>,
    create_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

fn unavailable() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({"error": "maintenance"})),
    )
}

fn movie(id: i64, title: &str, genre: &str) -> Movie {
    Movie {
        id: MovieId(id),
        title: title.to_string(),
        description: None,
        director: None,
        release_year: Some(1990 + id as i32),
        genre: genre.to_string(),
        poster_url: None,
        duration: None,
        rating: None,
    }
}

async fn list_movies(State(state): State<MockCatalogState>) -> Result<Json<Vec<Movie>>, (StatusCode, String)> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let remaining = state.list_failures_remaining.load(Ordering::SeqCst);
    if remaining > 0 {
        state
            .list_failures_remaining
            .store(remaining - 1, Ordering::SeqCst);
        return Err((StatusCode::SERVICE_UNAVAILABLE, "warming up".to_string()));
    }
    Ok(Json(state.movies.lock().await.clone()))
}

async fn get_movie(
    State(state): State<MockCatalogState>,
    Path(id): Path<i64>,
) -> Result<Json<Movie>, (StatusCode, Json<serde_json::Value>)> {
    state
        .movies
        .lock()
        .await
        .iter()
        .find(|movie| movie.id.0 == id)
        .cloned()
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"code": "not_found", "message": format!("movie {id} not found")})),
        ))
}

async fn create_movie(
    State(state): State<MockCatalogState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Movie>, (StatusCode, Json<serde_json::Value>)> {
    state.create_calls.fetch_add(1, Ordering::SeqCst);
    if state.mutations_unavailable.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    let title = body["title"].as_str().unwrap_or_default().to_string();
    if title.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"error": "title is required"})),
        ));
    }
    state.created.lock().await.push(body.clone());
    let mut movies = state.movies.lock().await;
    let id = movies.iter().map(|movie| movie.id.0).max().unwrap_or(0) + 1;
    let created = Movie {
        release_year: body["release_year"].as_i64().map(|year| year as i32),
        ..movie(id, &title, body["genre"].as_str().unwrap_or_default())
    };
    movies.push(created.clone());
    Ok(Json(created))
}

async fn delete_movie(State(state): State<MockCatalogState>, Path(id): Path<i64>) -> StatusCode {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    if state.mutations_unavailable.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    state.deleted.lock().await.push(id);
    let mut movies = state.movies.lock().await;
    let before = movies.len();
    movies.retain(|movie| movie.id.0 != id);
    if movies.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn slow_movies() -> Json<Vec<Movie>> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(Vec::new())
}

async fn slow_create(State(state): State<MockCatalogState>) -> StatusCode {
    state.create_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(3)).await;
    StatusCode::CREATED
}

async fn slow_delete(State(state): State<MockCatalogState>, Path(_id): Path<i64>) -> StatusCode {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(3)).await;
    StatusCode::NO_CONTENT
}

const POSTER_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-pixels";

async fn poster() -> ([(axum::http::header::HeaderName, &'static str); 1], &'static [u8]) {
    ([(axum::http::header::CONTENT_TYPE, "image/png")], POSTER_BYTES)
}

async fn spawn_catalog_server(movies: Vec<Movie>) -> (String, MockCatalogState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = MockCatalogState {
        movies: Arc::new(Mutex::new(movies)),
        ..MockCatalogState::default()
    };
    let app = Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movie/:id", get(get_movie))
        .route("/movies/:id", axum::routing::delete(delete_movie))
        .route("/slow/movies", get(slow_movies).post(slow_create))
        .route("/slow/movies/:id", axum::routing::delete(slow_delete))
        .route("/posters/heat.png", get(poster))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn arrival_request() -> CreateMovieRequest {
    CreateMovieRequest {
        title: "Arrival".to_string(),
        description: String::new(),
        director: "Denis Villeneuve".to_string(),
        release_year: 2016,
        genre: "Sci-Fi".to_string(),
    }
}

fn slow_api(server_url: &str) -> HttpCatalogApi {
    HttpCatalogApi::new(&ClientSettings {
        server_url: format!("{server_url}/slow"),
        request_timeout_secs: 1,
        retry_backoff_ms: 1,
        ..ClientSettings::default()
    })
    .expect("build api")
}

fn api_for(server_url: &str) -> HttpCatalogApi {
    HttpCatalogApi::new(&ClientSettings {
        server_url: server_url.to_string(),
        retry_backoff_ms: 1,
        ..ClientSettings::default()
    })
    .expect("build api")
}

#[tokio::test]
async fn list_movies_preserves_server_order() {
    let (server_url, _) = spawn_catalog_server(vec![
        movie(3, "Ran", "Drama"),
        movie(1, "Alien", "Horror, Sci-Fi"),
    ])
    .await;

    let movies = api_for(&server_url).list_movies().await.expect("list");

    let ids: Vec<i64> = movies.iter().map(|movie| movie.id.0).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(movies[1].genre, "Horror, Sci-Fi");
}

#[tokio::test]
async fn get_movie_uses_singular_detail_path() {
    let (server_url, _) = spawn_catalog_server(vec![movie(7, "Heat", "Crime")]).await;

    let found = api_for(&server_url)
        .get_movie(MovieId(7))
        .await
        .expect("detail");

    assert_eq!(found.title, "Heat");
}

#[tokio::test]
async fn missing_movie_maps_to_not_found_without_retry() {
    let (server_url, _) = spawn_catalog_server(Vec::new()).await;

    let err = api_for(&server_url)
        .get_movie(MovieId(42))
        .await
        .expect_err("missing movie");

    assert_eq!(err, CatalogError::NotFound("movie 42 not found".to_string()));
}

#[tokio::test]
async fn create_movie_posts_json_with_integer_year() {
    let (server_url, state) = spawn_catalog_server(Vec::new()).await;
    let request = CreateMovieRequest {
        title: "Arrival".to_string(),
        description: "First contact.".to_string(),
        director: "Denis Villeneuve".to_string(),
        release_year: 2016,
        genre: "Sci-Fi, Drama".to_string(),
    };

    let created = api_for(&server_url)
        .create_movie(&request)
        .await
        .expect("create");

    assert_eq!(created.id, MovieId(1));
    let bodies = state.created.lock().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["release_year"], serde_json::json!(2016));
    assert_eq!(bodies[0]["director"], "Denis Villeneuve");
    assert!(bodies[0].get("id").is_none());
}

#[tokio::test]
async fn rejected_create_maps_to_client_error() {
    let (server_url, state) = spawn_catalog_server(Vec::new()).await;
    let request = CreateMovieRequest {
        title: String::new(),
        description: String::new(),
        director: String::new(),
        release_year: 2016,
        genre: String::new(),
    };

    let err = api_for(&server_url)
        .create_movie(&request)
        .await
        .expect_err("rejected");

    assert_eq!(
        err,
        CatalogError::Client {
            status: 422,
            message: "title is required".to_string(),
        }
    );
    assert!(state.created.lock().await.is_empty());
}

#[tokio::test]
async fn delete_movie_sends_delete_for_id() {
    let (server_url, state) =
        spawn_catalog_server(vec![movie(1, "Alien", "Horror"), movie(2, "Heat", "Crime")]).await;
    let api = api_for(&server_url);

    api.delete_movie(MovieId(2)).await.expect("delete");

    assert_eq!(*state.deleted.lock().await, vec![2]);
    let remaining = api.list_movies().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, MovieId(1));
}

#[tokio::test]
async fn reads_retry_server_errors_with_backoff() {
    let (server_url, state) = spawn_catalog_server(vec![movie(1, "Alien", "Horror")]).await;
    state.list_failures_remaining.store(2, Ordering::SeqCst);

    let movies = api_for(&server_url).list_movies().await.expect("eventual list");

    assert_eq!(movies.len(), 1);
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn reads_give_up_after_configured_retries() {
    let (server_url, state) = spawn_catalog_server(Vec::new()).await;
    state.list_failures_remaining.store(10, Ordering::SeqCst);

    let err = api_for(&server_url)
        .list_movies()
        .await
        .expect_err("exhausted retries");

    assert_eq!(
        err,
        CatalogError::Server {
            status: 503,
            message: "warming up".to_string(),
        }
    );
    assert_eq!(state.list_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn slow_server_surfaces_timeout() {
    let (server_url, _) = spawn_catalog_server(Vec::new()).await;
    let api = HttpCatalogApi::new(&ClientSettings {
        server_url: format!("{server_url}/slow"),
        request_timeout_secs: 1,
        read_retries: 0,
        ..ClientSettings::default()
    })
    .expect("build api");

    let err = api.list_movies().await.expect_err("timeout");

    assert_eq!(err, CatalogError::Timeout(Duration::from_secs(1)));
}

#[tokio::test]
async fn unreachable_server_surfaces_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = HttpCatalogApi::new(&ClientSettings {
        server_url: format!("http://{addr}"),
        read_retries: 0,
        ..ClientSettings::default()
    })
    .expect("build api");

    let err = api.list_movies().await.expect_err("refused");

    assert!(matches!(err, CatalogError::Network(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[test]
fn base_url_gains_trailing_slash_so_paths_nest() {
    let api = api_for("http://catalog.local:8080/api");

    assert_eq!(api.base_url().as_str(), "http://catalog.local:8080/api/");
    assert_eq!(
        api.endpoint("movie/3").expect("join").as_str(),
        "http://catalog.local:8080/api/movie/3"
    );
}

#[test]
fn rejects_non_http_server_urls() {
    assert!(matches!(parse_base_url("ftp://catalog"), Err(CatalogError::Config(_))));
    assert!(matches!(parse_base_url("not a url"), Err(CatalogError::Config(_))));
}

#[test]
fn backoff_doubles_per_attempt() {
    let base = Duration::from_millis(200);

    assert_eq!(backoff_delay(base, 0), Duration::from_millis(200));
    assert_eq!(backoff_delay(base, 2), Duration::from_millis(800));
}

#[tokio::test]
async fn failed_create_is_sent_exactly_once() {
    let (server_url, state) = spawn_catalog_server(Vec::new()).await;
    state.mutations_unavailable.store(true, Ordering::SeqCst);

    let err = api_for(&server_url)
        .create_movie(&arrival_request())
        .await
        .expect_err("unavailable");

    assert_eq!(
        err,
        CatalogError::Server {
            status: 503,
            message: "maintenance".to_string(),
        }
    );
    assert!(err.is_retryable());
    assert_eq!(state.create_calls.load(Ordering::SeqCst), 1);
    assert!(state.movies.lock().await.is_empty());
}

#[tokio::test]
async fn failed_delete_is_sent_exactly_once() {
    let (server_url, state) = spawn_catalog_server(vec![movie(1, "Alien", "Horror")]).await;
    state.mutations_unavailable.store(true, Ordering::SeqCst);

    let err = api_for(&server_url)
        .delete_movie(MovieId(1))
        .await
        .expect_err("unavailable");

    assert!(matches!(err, CatalogError::Server { status: 503, .. }), "got {err:?}");
    assert_eq!(state.delete_calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.movies.lock().await.len(), 1);
}

#[tokio::test]
async fn timed_out_create_is_not_resent() {
    let (server_url, state) = spawn_catalog_server(Vec::new()).await;

    let err = slow_api(&server_url)
        .create_movie(&arrival_request())
        .await
        .expect_err("timeout");

    assert_eq!(err, CatalogError::Timeout(Duration::from_secs(1)));
    assert_eq!(state.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timed_out_delete_is_not_resent() {
    let (server_url, state) = spawn_catalog_server(Vec::new()).await;

    let err = slow_api(&server_url)
        .delete_movie(MovieId(5))
        .await
        .expect_err("timeout");

    assert_eq!(err, CatalogError::Timeout(Duration::from_secs(1)));
    assert_eq!(state.delete_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn relative_poster_url_resolves_against_server() {
    let (server_url, _) = spawn_catalog_server(Vec::new()).await;

    let bytes = api_for(&server_url)
        .fetch_poster("posters/heat.png")
        .await
        .expect("poster");

    assert_eq!(bytes, POSTER_BYTES);
}

#[tokio::test]
async fn absolute_poster_url_is_used_as_given() {
    let (server_url, _) = spawn_catalog_server(Vec::new()).await;
    let api = api_for("http://catalog.invalid/api");

    let bytes = api
        .fetch_poster(&format!("{server_url}/posters/heat.png"))
        .await
        .expect("poster");

    assert_eq!(bytes, POSTER_BYTES);
}

#[tokio::test]
async fn missing_poster_maps_to_not_found() {
    let (server_url, _) = spawn_catalog_server(Vec::new()).await;

    let err = api_for(&server_url)
        .fetch_poster("posters/missing.png")
        .await
        .expect_err("missing poster");

    assert!(err.is_not_found(), "got {err:?}");
}
