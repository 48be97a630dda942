//! Plain-text rendering of catalog views for the terminal.

use std::fmt::Write as _;

use client_core::view::{DeletePromptView, ErrorView, MovieCardView, MovieDetailView};

pub fn cards(cards: &[MovieCardView]) -> String {
    if cards.is_empty() {
        return "No movies in the catalog.\n".to_string();
    }

    let id_width = cards
        .iter()
        .map(|card| card.id.0.to_string().len())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    for card in cards {
        let _ = writeln!(
            out,
            "{:>id_width$}  {} ({})",
            card.id.0, card.title, card.release_year
        );
        let _ = writeln!(out, "{:id_width$}  {}", "", card.description);
    }
    out
}

pub fn detail(movie: &MovieDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", movie.title);
    if !movie.genres.is_empty() {
        let tags: Vec<String> = movie.genres.iter().map(|tag| format!("[{tag}]")).collect();
        let _ = writeln!(out, "{}", tags.join(" "));
    }
    let _ = writeln!(out, "Director:     {}", movie.director);
    let _ = writeln!(out, "Release year: {}", movie.release_year);
    let _ = writeln!(out, "Duration:     {}", movie.duration);
    let _ = writeln!(out, "Rating:       {}", movie.rating);
    if let Some(poster_url) = &movie.poster_url {
        let _ = writeln!(out, "Poster:       {poster_url}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", movie.description);
    out
}

pub fn delete_prompt(prompt: &DeletePromptView) -> String {
    match &prompt.title {
        Some(title) => format!("Delete \"{title}\" (id {})? [y/N] ", prompt.movie_id),
        None => format!("Delete movie {}? [y/N] ", prompt.movie_id),
    }
}

pub fn error(error: &ErrorView) -> String {
    if error.retryable {
        format!("{} (retryable)", error.message)
    } else {
        error.message.clone()
    }
}

pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
