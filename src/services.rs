//! Interfaces to the external generation services.
//!
//! The drawing core never talks to the network itself. It hands encoded
//! images and text to these traits and receives their results through the
//! enhancement pipeline.

use std::sync::Arc;

use egui::{pos2, Color32};
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::ServiceError;
use crate::stroke::draw_segment;
use crate::style::ArtStyle;
use crate::surface::PixelSurface;

/// Turns a sketch into a short text description
pub trait ImageCaptioner: Send + Sync {
    fn describe(&self, image_png: Arc<[u8]>) -> BoxFuture<'static, Result<String, ServiceError>>;
}

/// Generates an enhanced picture from a description and a style tag
pub trait ImageEnhancer: Send + Sync {
    fn enhance(
        &self,
        description: String,
        style: ArtStyle,
    ) -> BoxFuture<'static, Result<Vec<u8>, ServiceError>>;
}

/// Writes a short story about a described picture
pub trait StoryWriter: Send + Sync {
    fn write_story(
        &self,
        description: String,
        style: ArtStyle,
    ) -> BoxFuture<'static, Result<String, ServiceError>>;
}

/// The set of collaborators a session uses
#[derive(Clone)]
pub struct Services {
    pub captioner: Arc<dyn ImageCaptioner>,
    pub enhancer: Arc<dyn ImageEnhancer>,
    pub story_writer: Arc<dyn StoryWriter>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl Services {
    /// Uses the same object for all three services
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: ImageCaptioner + ImageEnhancer + StoryWriter + 'static,
    {
        let provider = Arc::new(provider);
        Self {
            captioner: provider.clone(),
            enhancer: provider.clone(),
            story_writer: provider,
        }
    }

    /// Offline services producing deterministic placeholder results
    pub fn placeholder(art_size: [u32; 2]) -> Self {
        Self::from_provider(PlaceholderServices::new(art_size))
    }
}

/// Offline stand-in for the real providers.
///
/// The caption counts inked pixels, the "enhanced" art is a colouring page
/// tinted with the style's accent colour, and the story is a fixed template.
#[derive(Debug, Clone)]
pub struct PlaceholderServices {
    art_size: [u32; 2],
}

impl PlaceholderServices {
    pub fn new(art_size: [u32; 2]) -> Self {
        Self { art_size }
    }

    fn render_page(&self, style: ArtStyle) -> Result<Vec<u8>, ServiceError> {
        let [width, height] = self.art_size;
        let mut page = PixelSurface::new(width, height, Color32::WHITE);
        let ink = Color32::BLACK;
        let line = 3.0;

        let (w, h) = (width as f32, height as f32);
        let margin = (w.min(h) * 0.05).max(2.0);
        let corners = [
            pos2(margin, margin),
            pos2(w - margin, margin),
            pos2(w - margin, h - margin),
            pos2(margin, h - margin),
        ];
        for i in 0..corners.len() {
            draw_segment(&mut page, corners[i], corners[(i + 1) % corners.len()], line, ink);
        }

        // A sun-like disc in the middle, outlined so it can be filled
        let center = pos2(w / 2.0, h / 2.0);
        let radius = w.min(h) / 4.0;
        let steps = 64;
        for i in 0..steps {
            let a0 = i as f32 / steps as f32 * std::f32::consts::TAU;
            let a1 = (i + 1) as f32 / steps as f32 * std::f32::consts::TAU;
            draw_segment(
                &mut page,
                center + radius * egui::vec2(a0.cos(), a0.sin()),
                center + radius * egui::vec2(a1.cos(), a1.sin()),
                line,
                ink,
            );
        }
        crate::fill::flood_fill(
            &mut page,
            [center.x as i64, center.y as i64],
            style.accent(),
        );

        page.encode_png().map_err(|err| ServiceError::InvalidResponse {
            service: "placeholder enhancer",
            reason: err.to_string(),
        })
    }
}

impl ImageCaptioner for PlaceholderServices {
    fn describe(&self, image_png: Arc<[u8]>) -> BoxFuture<'static, Result<String, ServiceError>> {
        async move {
            let sketch = PixelSurface::decode(&image_png).map_err(|err| ServiceError::InvalidResponse {
                service: "placeholder captioner",
                reason: err.to_string(),
            })?;
            let background = sketch.pixels().get_pixel(0, 0);
            let inked = sketch.pixels().pixels().filter(|p| *p != background).count();
            let detail = match inked {
                0 => "an empty page",
                1..=500 => "a few simple lines",
                501..=5000 => "a friendly little doodle",
                _ => "a big colourful scene",
            };
            Ok(format!("A child's drawing of {detail}"))
        }
        .boxed()
    }
}

impl ImageEnhancer for PlaceholderServices {
    fn enhance(
        &self,
        description: String,
        style: ArtStyle,
    ) -> BoxFuture<'static, Result<Vec<u8>, ServiceError>> {
        log::debug!("Placeholder art for {:?} in {} style", description, style);
        let page = self.render_page(style);
        async move { page }.boxed()
    }
}

impl StoryWriter for PlaceholderServices {
    fn write_story(
        &self,
        description: String,
        style: ArtStyle,
    ) -> BoxFuture<'static, Result<String, ServiceError>> {
        async move {
            Ok(format!(
                "Once upon a time there was {}. It was a {} day, and everyone who saw the picture smiled. The end.",
                description.to_lowercase(),
                style.label().to_lowercase()
            ))
        }
        .boxed()
    }
}
