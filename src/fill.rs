//! Bucket fill for pixel surfaces.
//!
//! The fill is 4-connected and iterative. Pixels are matched against the
//! seed's original colour with exact per-channel equality, so soft
//! anti-aliased edges may keep a rim of unfilled pixels.

use egui::Color32;
use image::Rgba;

use crate::surface::PixelSurface;

/// What a call to [`flood_fill`] did to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The seed was outside the surface; nothing was read or written
    OutOfBounds,
    /// The seed already had the target colour; nothing was written
    AlreadyFilled,
    /// The region was recoloured in a single write
    Filled { pixels: usize },
}

impl FillOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, FillOutcome::Filled { .. })
    }
}

/// Replaces the 4-connected region around `seed` that shares the seed's
/// colour with `target`, forced fully opaque.
pub fn flood_fill(surface: &mut PixelSurface, seed: [i64; 2], target: Color32) -> FillOutcome {
    let [seed_x, seed_y] = seed;
    if !surface.contains(seed_x, seed_y) {
        return FillOutcome::OutOfBounds;
    }

    let width = surface.width();
    let height = surface.height();
    let [r, g, b, _] = target.to_srgba_unmultiplied();
    let target = Rgba([r, g, b, 255]);

    let original = surface.pixels();
    let seed_color = *original.get_pixel(seed_x as u32, seed_y as u32);
    if seed_color == target {
        return FillOutcome::AlreadyFilled;
    }

    let mut grid = original.clone();
    let mut visited = vec![false; width as usize * height as usize];
    let mut stack: Vec<(u32, u32)> = vec![(seed_x as u32, seed_y as u32)];
    let mut filled = 0usize;

    while let Some((x, y)) = stack.pop() {
        let idx = y as usize * width as usize + x as usize;
        if visited[idx] {
            continue;
        }
        // Compare against the untouched grid so recoloured pixels never
        // count as part of the region.
        if *original.get_pixel(x, y) != seed_color {
            continue;
        }

        visited[idx] = true;
        grid.put_pixel(x, y, target);
        filled += 1;

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    surface.write(grid);
    log::debug!("Filled {} pixels from seed ({}, {})", filled, seed_x, seed_y);
    FillOutcome::Filled { pixels: filled }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color32 = Color32::WHITE;
    const RED: Color32 = Color32::from_rgb(255, 0, 0);
    const BLACK: Color32 = Color32::BLACK;

    #[test]
    fn test_fill_whole_surface() {
        let mut surface = PixelSurface::new(4, 4, WHITE);
        let outcome = flood_fill(&mut surface, [0, 0], RED);

        assert_eq!(outcome, FillOutcome::Filled { pixels: 16 });
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(surface.pixel(x, y), RED);
            }
        }
    }

    #[test]
    fn test_fill_stops_at_wall() {
        let mut surface = PixelSurface::new(4, 4, WHITE);
        for y in 0..4 {
            surface.set_pixel(2, y, BLACK);
        }

        let outcome = flood_fill(&mut surface, [0, 0], RED);

        assert_eq!(outcome, FillOutcome::Filled { pixels: 8 });
        for y in 0..4 {
            for x in 0..4 {
                let expected = match x {
                    0 | 1 => RED,
                    2 => BLACK,
                    _ => WHITE,
                };
                assert_eq!(surface.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_same_color_is_noop() {
        let mut surface = PixelSurface::new(3, 3, RED);
        let revision = surface.revision();

        assert_eq!(flood_fill(&mut surface, [1, 1], RED), FillOutcome::AlreadyFilled);
        assert_eq!(surface.revision(), revision);
    }

    #[test]
    fn test_seed_outside_is_noop() {
        let mut surface = PixelSurface::new(3, 3, WHITE);
        assert_eq!(flood_fill(&mut surface, [3, 0], RED), FillOutcome::OutOfBounds);
        assert_eq!(flood_fill(&mut surface, [-1, 1], RED), FillOutcome::OutOfBounds);
        assert_eq!(surface.revision(), 0);
        assert!(surface.is_uniform());
    }

    #[test]
    fn test_isolated_pixel_gets_one_write() {
        let mut surface = PixelSurface::new(3, 3, BLACK);
        surface.set_pixel(1, 1, WHITE);
        let before = surface.revision();

        let outcome = flood_fill(&mut surface, [1, 1], RED);

        assert_eq!(outcome, FillOutcome::Filled { pixels: 1 });
        assert_eq!(surface.revision(), before + 1);
        assert_eq!(surface.pixel(1, 1), RED);
        assert_eq!(surface.pixel(0, 1), BLACK);
    }

    #[test]
    fn test_fill_forces_opaque_alpha() {
        let mut surface = PixelSurface::new(2, 2, WHITE);
        flood_fill(&mut surface, [0, 0], Color32::from_rgba_unmultiplied(0, 0, 255, 128));
        let [r, g, _, a] = surface.pixels().get_pixel(1, 1).0;
        assert_eq!([r, g, a], [0, 0, 255]);
    }

    #[test]
    fn test_exact_match_leaves_near_colors() {
        let mut surface = PixelSurface::new(3, 1, WHITE);
        surface.set_pixel(1, 0, Color32::from_rgb(254, 255, 255));

        flood_fill(&mut surface, [0, 0], RED);

        assert_eq!(surface.pixel(0, 0), RED);
        assert_eq!(surface.pixel(1, 0), Color32::from_rgb(254, 255, 255));
        assert_eq!(surface.pixel(2, 0), WHITE);
    }
}
