use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;
use uuid::Uuid;

use crate::error::SurfaceError;
use crate::state::SurfaceKind;
use crate::surface::PixelSurface;

/// Errors that can occur while preparing a texture
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to decode thumbnail: {0}")]
    Decode(#[from] SurfaceError),
    #[error("texture has no pixels")]
    InvalidDimensions,
}

/// What a cached texture shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Surface(SurfaceKind),
    Thumbnail(Uuid),
}

/// Caches GPU textures for surfaces and history thumbnails.
///
/// Textures are keyed by what they show plus a version. Surfaces use their
/// revision, so a texture is re-uploaded only after the pixels changed.
pub struct TextureManager {
    texture_cache: HashMap<(TextureKey, u64), TextureHandle>,
    // Frame in which each texture was last requested
    last_used: HashMap<(TextureKey, u64), u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("cached", &self.texture_cache.len())
            .field("current_frame", &self.current_frame)
            .field("max_cache_size", &self.max_cache_size)
            .finish()
    }
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    pub fn get_or_create_texture<F>(
        &mut self,
        key: TextureKey,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureError>
    where
        F: FnOnce() -> Result<ColorImage, TextureError>,
    {
        let cache_key = (key, version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        // Older versions of the same surface are never shown again
        if let TextureKey::Surface(_) = key {
            self.invalidate(key);
        }
        self.prune_cache_if_needed();

        let image = generator()?;
        if image.size[0] == 0 || image.size[1] == 0 {
            return Err(TextureError::InvalidDimensions);
        }

        let name = match key {
            TextureKey::Surface(kind) => format!("{:?}_r{}", kind, version).to_lowercase(),
            TextureKey::Thumbnail(id) => format!("thumbnail_{}", id),
        };
        let handle = ctx.load_texture(name, image, TextureOptions::LINEAR);

        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);

        Ok(handle.id())
    }

    /// Texture for a live surface, re-uploaded when its revision changes
    pub fn surface_texture(
        &mut self,
        kind: SurfaceKind,
        surface: &PixelSurface,
        ctx: &Context,
    ) -> Result<TextureId, TextureError> {
        self.get_or_create_texture(
            TextureKey::Surface(kind),
            surface.revision(),
            || Ok(surface.to_color_image()),
            ctx,
        )
    }

    /// Texture for a history thumbnail decoded from encoded image bytes.
    /// `version` distinguishes the original art from a saved colouring.
    pub fn thumbnail_texture(
        &mut self,
        id: Uuid,
        version: u64,
        bytes: &[u8],
        ctx: &Context,
    ) -> Result<TextureId, TextureError> {
        self.get_or_create_texture(
            TextureKey::Thumbnail(id),
            version,
            || Ok(PixelSurface::decode(bytes)?.to_color_image()),
            ctx,
        )
    }

    /// Drops every version cached for `key`
    pub fn invalidate(&mut self, key: TextureKey) {
        self.texture_cache.retain(|(cached, _), _| *cached != key);
        self.last_used.retain(|(cached, _), _| *cached != key);
    }

    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<((TextureKey, u64), u64)> =
            self.last_used.iter().map(|(k, v)| (*k, *v)).collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() + 1 - self.max_cache_size.max(1);
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn contains(&self, key: TextureKey, version: u64) -> bool {
        self.texture_cache.contains_key(&(key, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    fn white() -> Result<ColorImage, TextureError> {
        Ok(ColorImage::new([10, 10], Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        let key = TextureKey::Thumbnail(Uuid::new_v4());

        let first = manager.get_or_create_texture(key, 0, white, &ctx).unwrap();
        let second = manager.get_or_create_texture(key, 0, white, &ctx).unwrap();

        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn test_surface_revision_replaces_texture() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        let mut surface = PixelSurface::new(4, 4, Color32::WHITE);

        manager.surface_texture(SurfaceKind::Sketch, &surface, &ctx).unwrap();
        let old = surface.revision();
        surface.set_pixel(1, 1, Color32::BLACK);
        manager.surface_texture(SurfaceKind::Sketch, &surface, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 1);
        assert!(!manager.contains(TextureKey::Surface(SurfaceKind::Sketch), old));
        assert!(manager.contains(TextureKey::Surface(SurfaceKind::Sketch), surface.revision()));
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);
        let keys: Vec<TextureKey> = (0..3).map(|_| TextureKey::Thumbnail(Uuid::new_v4())).collect();

        for key in &keys {
            manager.get_or_create_texture(*key, 0, white, &ctx).unwrap();
            manager.begin_frame();
        }

        assert_eq!(manager.cache_size(), 2);
        assert!(!manager.contains(keys[0], 0));
        assert!(manager.contains(keys[1], 0));
        assert!(manager.contains(keys[2], 0));
    }

    #[test]
    fn test_thumbnail_versions_are_separate() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        let id = Uuid::new_v4();
        let png = PixelSurface::new(3, 3, Color32::RED).encode_png().unwrap();

        manager.thumbnail_texture(id, 0, &png, &ctx).unwrap();
        manager.thumbnail_texture(id, 1, &png, &ctx).unwrap();
        assert_eq!(manager.cache_size(), 2);

        manager.invalidate(TextureKey::Thumbnail(id));
        assert_eq!(manager.cache_size(), 0);
    }

    #[test]
    fn test_undecodable_thumbnail() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        let result = manager.thumbnail_texture(Uuid::new_v4(), 0, b"not an image", &ctx);
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }
}
