use std::{
    io::{self, Write as _},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings,
    view::{describe_error, ErrorContext},
    CatalogController, CatalogError, HttpCatalogApi, MovieForm,
};
use shared::domain::MovieId;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "movie-catalog", about = "Browse and edit a remote movie catalog")]
struct Args {
    /// Catalog server base URL (overrides catalog.toml and environment).
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every movie in server order.
    List,
    /// Show one movie's details.
    Show { id: i64 },
    /// Add a movie, then print the refreshed list.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        director: String,
        /// Parsed as a whole number; anything else is rejected before sending.
        #[arg(long)]
        release_year: String,
        /// Comma-separated genre tags.
        #[arg(long, default_value = "")]
        genre: String,
    },
    /// Delete a movie after confirmation.
    Delete {
        id: i64,
        /// Skip the interactive confirmation.
        #[arg(long)]
        yes: bool,
    },
}

fn failure(err: CatalogError, context: ErrorContext) -> anyhow::Error {
    let message = render::error(&describe_error(&err, context));
    anyhow::Error::new(err).context(message)
}

async fn read_answer(prompt: String) -> Result<String> {
    tokio::task::spawn_blocking(move || -> io::Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        Ok(answer)
    })
    .await
    .context("confirmation prompt task failed")?
    .context("failed to read confirmation")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    tracing::debug!(?settings, "resolved client settings");

    let api = HttpCatalogApi::new(&settings)
        .map_err(|err| failure(err, ErrorContext::Collection))?;
    let controller = CatalogController::new(Arc::new(api));

    match args.command {
        Command::List => {
            controller
                .load_collection()
                .await
                .map_err(|err| failure(err, ErrorContext::Collection))?;
            print!("{}", render::cards(&controller.view().await.cards));
        }
        Command::Show { id } => {
            controller
                .load_detail(MovieId(id))
                .await
                .map_err(|err| failure(err, ErrorContext::Detail))?;
            let Some(movie) = controller.view().await.detail.and_then(|panel| panel.movie) else {
                bail!("movie {id} was not loaded");
            };
            print!("{}", render::detail(&movie));
        }
        Command::Add {
            title,
            description,
            director,
            release_year,
            genre,
        } => {
            let form = MovieForm {
                title,
                description,
                director,
                release_year,
                genre,
            };
            let movie = controller
                .request_create(form)
                .await
                .map_err(|err| failure(err, ErrorContext::Create))?;
            println!("Added \"{}\" as id {}.", movie.title, movie.id);

            let view = controller.view().await;
            if let Some(banner) = &view.collection_error {
                eprintln!("Could not refresh the list: {}", render::error(banner));
            } else {
                print!("{}", render::cards(&view.cards));
            }
        }
        Command::Delete { id, yes } => {
            // Loaded first so the prompt can name the movie.
            if let Err(err) = controller.load_collection().await {
                tracing::warn!("continuing without movie titles: {err}");
            }
            controller.stage_delete(MovieId(id)).await;

            let confirmed = if yes {
                true
            } else {
                let Some(prompt) = controller.view().await.delete_prompt else {
                    bail!("no delete is staged");
                };
                render::is_confirmation(&read_answer(render::delete_prompt(&prompt)).await?)
            };

            if !confirmed {
                controller.cancel_delete().await;
                println!("Cancelled.");
                return Ok(());
            }

            controller
                .confirm_delete()
                .await
                .map_err(|err| failure(err, ErrorContext::Delete))?;
            println!("Deleted movie {id}.");
            print!("{}", render::cards(&controller.view().await.cards));
        }
    }

    Ok(())
}
