use egui::{Color32, ColorImage};
use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::SurfaceError;

/// Converts an egui color into the pixel representation used by surfaces
pub fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Converts a surface pixel back into an egui color
pub fn to_color32(pixel: Rgba<u8>) -> Color32 {
    let [r, g, b, a] = pixel.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// A fixed-size RGBA pixel grid backing a drawable area.
///
/// The dimensions never change after creation. Every mutation bumps
/// [`PixelSurface::revision`], which is what the renderer watches to decide
/// when the texture has to be uploaded again.
#[derive(Clone)]
pub struct PixelSurface {
    pixels: RgbaImage,
    revision: u64,
}

impl std::fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("revision", &self.revision)
            .finish()
    }
}

impl PixelSurface {
    /// Creates a surface with every pixel set to `background`
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        assert!(width > 0 && height > 0, "surface must not be empty");
        Self {
            pixels: RgbaImage::from_pixel(width, height, to_rgba(background)),
            revision: 0,
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        assert!(
            pixels.width() > 0 && pixels.height() > 0,
            "surface must not be empty"
        );
        Self {
            pixels,
            revision: 0,
        }
    }

    /// Decodes any image format supported by the `image` crate
    pub fn decode(bytes: &[u8]) -> Result<Self, SurfaceError> {
        let decoded = image::load_from_memory(bytes).map_err(SurfaceError::Decode)?;
        Ok(Self::from_image(decoded.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    /// Returns a copy of the whole pixel grid
    pub fn read(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Borrow the pixel grid without copying it
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Replaces the whole pixel grid.
    ///
    /// # Panics
    ///
    /// Panics if `grid` does not have the surface's dimensions.
    pub fn write(&mut self, grid: RgbaImage) {
        assert_eq!(
            grid.dimensions(),
            self.pixels.dimensions(),
            "pixel grid does not match surface size"
        );
        self.pixels = grid;
        self.touch();
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Color32 {
        to_color32(*self.pixels.get_pixel(x, y))
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the surface.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color32) {
        self.pixels.put_pixel(x, y, to_rgba(color));
        self.touch();
    }

    /// Resets every pixel to `color`
    pub fn clear(&mut self, color: Color32) {
        let rgba = to_rgba(color);
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
        self.touch();
    }

    /// True when every pixel has the same value
    pub fn is_uniform(&self) -> bool {
        let mut pixels = self.pixels.pixels();
        match pixels.next() {
            Some(first) => pixels.all(|p| p == first),
            None => true,
        }
    }

    /// Decodes `bytes` and draws the result over the whole surface, scaling it
    /// to the surface size when the dimensions differ.
    pub fn replace_from_bytes(&mut self, bytes: &[u8]) -> Result<(), SurfaceError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(SurfaceError::Decode)?
            .to_rgba8();
        let grid = if decoded.dimensions() == self.pixels.dimensions() {
            decoded
        } else {
            log::debug!(
                "Scaling {}x{} image onto {}x{} surface",
                decoded.width(),
                decoded.height(),
                self.width(),
                self.height()
            );
            image::imageops::resize(&decoded, self.width(), self.height(), FilterType::Triangle)
        };
        self.write(grid);
        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(SurfaceError::Encode)?;
        Ok(bytes)
    }

    /// Converts the grid into an egui image for texture upload
    pub fn to_color_image(&self) -> ColorImage {
        let size = [self.width() as usize, self.height() as usize];
        ColorImage::from_rgba_unmultiplied(size, self.pixels.as_raw())
    }

    pub(crate) fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_uniform() {
        let surface = PixelSurface::new(3, 2, Color32::WHITE);
        assert_eq!(surface.size(), [3, 2]);
        assert!(surface.is_uniform());
        assert_eq!(surface.pixel(2, 1), Color32::WHITE);
        assert_eq!(surface.revision(), 0);
    }

    #[test]
    fn test_write_bumps_revision() {
        let mut surface = PixelSurface::new(2, 2, Color32::WHITE);
        let mut grid = surface.read();
        grid.put_pixel(1, 1, to_rgba(Color32::RED));
        surface.write(grid);

        assert_eq!(surface.revision(), 1);
        assert_eq!(surface.pixel(1, 1), Color32::RED);
        assert!(!surface.is_uniform());
    }

    #[test]
    #[should_panic(expected = "pixel grid does not match surface size")]
    fn test_write_rejects_other_size() {
        let mut surface = PixelSurface::new(2, 2, Color32::WHITE);
        surface.write(RgbaImage::new(3, 3));
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_pixel_fails_fast() {
        let surface = PixelSurface::new(2, 2, Color32::WHITE);
        surface.pixel(2, 0);
    }

    #[test]
    fn test_contains() {
        let surface = PixelSurface::new(4, 3, Color32::WHITE);
        assert!(surface.contains(0, 0));
        assert!(surface.contains(3, 2));
        assert!(!surface.contains(4, 0));
        assert!(!surface.contains(0, -1));
    }

    #[test]
    fn test_png_round_trip_keeps_pixels() {
        let mut surface = PixelSurface::new(4, 4, Color32::WHITE);
        surface.set_pixel(1, 2, Color32::from_rgb(10, 20, 30));

        let bytes = surface.encode_png().unwrap();
        let decoded = PixelSurface::decode(&bytes).unwrap();

        assert_eq!(decoded.size(), [4, 4]);
        assert_eq!(decoded.pixel(1, 2), Color32::from_rgb(10, 20, 30));
        assert_eq!(decoded.pixel(0, 0), Color32::WHITE);
    }

    #[test]
    fn test_replace_from_bytes_scales_to_surface() {
        let source = PixelSurface::new(2, 2, Color32::BLUE);
        let bytes = source.encode_png().unwrap();

        let mut target = PixelSurface::new(8, 6, Color32::WHITE);
        target.replace_from_bytes(&bytes).unwrap();

        assert_eq!(target.size(), [8, 6]);
        assert_eq!(target.pixel(4, 3), Color32::BLUE);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = PixelSurface::decode(&[1, 2, 3, 4]);
        assert!(matches!(result, Err(SurfaceError::Decode(_))));
    }
}
