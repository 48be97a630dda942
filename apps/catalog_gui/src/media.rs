//! Poster decoding and the per-URL texture cache.

use std::collections::HashMap;

use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;

const POSTER_MAX_DIMENSION: u32 = 640;

#[derive(Clone)]
pub struct PosterImage {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl PosterImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }
}

/// Decodes on the worker thread; the texture is created on first draw.
pub fn decode_poster(bytes: &[u8]) -> Result<PosterImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = dynamic
        .thumbnail(POSTER_MAX_DIMENSION, POSTER_MAX_DIMENSION)
        .to_rgba8();
    Ok(PosterImage {
        width: resized.width() as usize,
        height: resized.height() as usize,
        rgba: resized.into_raw(),
    })
}

/// Scales `size` down to fit inside `max`, keeping the aspect ratio. Never
/// scales up.
pub fn fit_within(size: [usize; 2], max: egui::Vec2) -> egui::Vec2 {
    let natural = egui::vec2(size[0] as f32, size[1] as f32);
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (max.x / natural.x).min(max.y / natural.y).min(1.0);
    natural * scale
}

enum PosterState {
    Loading,
    Ready {
        image: PosterImage,
        texture: Option<egui::TextureHandle>,
    },
    Failed(String),
}

pub enum PosterSlot {
    Loading,
    Ready {
        texture: egui::TextureHandle,
        size: [usize; 2],
    },
    Failed(String),
}

#[derive(Default)]
pub struct PosterCache {
    entries: HashMap<String, PosterState>,
}

impl PosterCache {
    /// Queues a fetch the first time `url` is seen. Failed posters are not
    /// refetched.
    pub fn request(&mut self, url: &str, actions: &mut Vec<BackendCommand>) {
        if self.entries.contains_key(url) {
            return;
        }
        self.entries.insert(url.to_string(), PosterState::Loading);
        actions.push(BackendCommand::FetchPoster {
            url: url.to_string(),
        });
    }

    pub fn loaded(&mut self, url: String, image: PosterImage) {
        self.entries.insert(
            url,
            PosterState::Ready {
                image,
                texture: None,
            },
        );
    }

    pub fn failed(&mut self, url: String, reason: String) {
        self.entries.insert(url, PosterState::Failed(reason));
    }

    /// A queued fetch that never reached the worker is dropped so the next
    /// frame requests it again.
    pub fn forget(&mut self, url: &str) {
        if matches!(self.entries.get(url), Some(PosterState::Loading)) {
            self.entries.remove(url);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .values()
            .any(|state| matches!(state, PosterState::Loading))
    }

    pub fn is_loading(&self, url: &str) -> bool {
        matches!(self.entries.get(url), Some(PosterState::Loading))
    }

    pub fn slot(&mut self, ctx: &egui::Context, url: &str) -> PosterSlot {
        match self.entries.get_mut(url) {
            None | Some(PosterState::Loading) => PosterSlot::Loading,
            Some(PosterState::Failed(reason)) => PosterSlot::Failed(reason.clone()),
            Some(PosterState::Ready { image, texture }) => {
                let texture = texture.get_or_insert_with(|| {
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied(image.size(), &image.rgba);
                    ctx.load_texture(
                        format!("poster:{url}"),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    )
                });
                PosterSlot::Ready {
                    texture: texture.clone(),
                    size: image.size(),
                }
            }
        }
    }
}
