use egui::{Color32, Pos2};

use crate::surface::{to_rgba, PixelSurface};

// Sealed stroke, immutable once the pointer is released
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
}

// Stroke still being drawn
#[derive(Debug)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
}

impl Stroke {
    pub fn new(color: Color32, width: f32, points: Vec<Pos2>) -> Self {
        Self {
            points,
            color,
            width,
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Draws the whole stroke onto `surface` as connected round segments
    pub fn rasterize(&self, surface: &mut PixelSurface) {
        let Some(first) = self.points.first() else {
            return;
        };
        stamp_disc(surface, *first, self.width, self.color);
        for pair in self.points.windows(2) {
            draw_segment(surface, pair[0], pair[1], self.width, self.color);
        }
    }
}

impl MutableStroke {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn last_point(&self) -> Option<Pos2> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    // Seal into an immutable Stroke
    pub fn into_stroke(self) -> Stroke {
        Stroke::new(self.color, self.width, self.points)
    }
}

/// Turns pointer movement into strokes painted directly onto a surface.
///
/// Points are surface-local pixel coordinates; callers map screen positions
/// with [`crate::input::SurfaceMapping`] first.
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    current: Option<MutableStroke>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&MutableStroke> {
        self.current.as_ref()
    }

    /// Starts a new stroke, dropping any stroke that was never ended
    pub fn begin(&mut self, surface: &mut PixelSurface, point: Pos2, color: Color32, width: f32) {
        let mut stroke = MutableStroke::new(color, width);
        stroke.add_point(point);
        stamp_disc(surface, point, width, color);
        self.current = Some(stroke);
    }

    /// Adds a segment from the last point to `point`. Returns false when no
    /// stroke is active.
    pub fn extend(&mut self, surface: &mut PixelSurface, point: Pos2) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        if let Some(last) = stroke.last_point() {
            draw_segment(surface, last, point, stroke.width(), stroke.color());
        }
        stroke.add_point(point);
        true
    }

    pub fn end(&mut self) -> Option<Stroke> {
        let stroke = self.current.take()?.into_stroke();
        log::debug!("Stroke sealed with {} points", stroke.points().len());
        Some(stroke)
    }

    /// Drops the active stroke without sealing it
    pub fn cancel(&mut self) {
        self.current = None;
    }
}

/// Paints a filled disc of the given diameter centred on `center`
pub fn stamp_disc(surface: &mut PixelSurface, center: Pos2, width: f32, color: Color32) {
    let rgba = to_rgba(color);
    stamp_disc_rgba(surface, center.x.floor() as i64, center.y.floor() as i64, width, rgba);
    surface.touch();
}

/// Connects `from` and `to` with discs stamped at every Bresenham step,
/// which gives round caps and joins without gaps at any pointer speed.
pub fn draw_segment(surface: &mut PixelSurface, from: Pos2, to: Pos2, width: f32, color: Color32) {
    let rgba = to_rgba(color);
    let (x1, y1) = (to.x.floor() as i64, to.y.floor() as i64);
    let (mut x, mut y) = (from.x.floor() as i64, from.y.floor() as i64);

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp_disc_rgba(surface, x, y, width, rgba);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    surface.touch();
}

fn stamp_disc_rgba(surface: &mut PixelSurface, cx: i64, cy: i64, width: f32, rgba: image::Rgba<u8>) {
    let radius = (width / 2.0).max(0.5);
    let reach = radius.ceil() as i64;
    let limit = radius * radius;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if (dx * dx + dy * dy) as f32 > limit {
                continue;
            }
            let (px, py) = (cx + dx, cy + dy);
            if surface.contains(px, py) {
                surface.pixels_mut().put_pixel(px as u32, py as u32, rgba);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn blank() -> PixelSurface {
        PixelSurface::new(40, 40, Color32::WHITE)
    }

    #[test]
    fn test_extend_without_begin_is_noop() {
        let mut surface = blank();
        let mut recorder = StrokeRecorder::new();

        assert!(!recorder.extend(&mut surface, pos2(5.0, 5.0)));
        assert!(recorder.end().is_none());
        assert!(surface.is_uniform());
    }

    #[test]
    fn test_begin_extend_end_seals_stroke() {
        let mut surface = blank();
        let mut recorder = StrokeRecorder::new();

        recorder.begin(&mut surface, pos2(2.0, 2.0), Color32::BLACK, 3.0);
        assert!(recorder.is_active());
        assert!(recorder.extend(&mut surface, pos2(20.0, 2.0)));

        let stroke = recorder.end().unwrap();
        assert!(!recorder.is_active());
        assert_eq!(stroke.points(), &[pos2(2.0, 2.0), pos2(20.0, 2.0)]);
        assert_eq!(stroke.color(), Color32::BLACK);
        assert_eq!(stroke.width(), 3.0);
    }

    #[test]
    fn test_sparse_samples_draw_continuous_line() {
        let mut surface = blank();
        let mut recorder = StrokeRecorder::new();

        // Two far apart samples, as produced by a fast flick
        recorder.begin(&mut surface, pos2(1.0, 1.0), Color32::BLACK, 1.0);
        recorder.extend(&mut surface, pos2(30.0, 30.0));
        recorder.end();

        for i in 1..=30 {
            assert_eq!(surface.pixel(i, i), Color32::BLACK, "gap at ({i}, {i})");
        }
    }

    #[test]
    fn test_round_cap_covers_disc() {
        let mut surface = blank();
        stamp_disc(&mut surface, pos2(20.0, 20.0), 10.0, Color32::RED);

        assert_eq!(surface.pixel(20, 20), Color32::RED);
        assert_eq!(surface.pixel(25, 20), Color32::RED);
        assert_eq!(surface.pixel(20, 15), Color32::RED);
        // Corner of the bounding square lies outside the disc
        assert_eq!(surface.pixel(25, 25), Color32::WHITE);
    }

    #[test]
    fn test_stroke_near_edge_is_clipped() {
        let mut surface = PixelSurface::new(4, 4, Color32::WHITE);
        let mut recorder = StrokeRecorder::new();

        recorder.begin(&mut surface, pos2(-3.0, 0.0), Color32::BLACK, 4.0);
        recorder.extend(&mut surface, pos2(10.0, 0.0));
        recorder.end();

        assert_eq!(surface.pixel(0, 0), Color32::BLACK);
        assert_eq!(surface.pixel(3, 0), Color32::BLACK);
    }

    #[test]
    fn test_replayed_stroke_matches_recorded_pixels() {
        let mut live = blank();
        let mut recorder = StrokeRecorder::new();
        recorder.begin(&mut live, pos2(3.0, 30.0), Color32::BLUE, 5.0);
        recorder.extend(&mut live, pos2(15.0, 10.0));
        recorder.extend(&mut live, pos2(35.0, 25.0));
        let stroke = recorder.end().unwrap();

        let mut replay = blank();
        stroke.rasterize(&mut replay);

        assert_eq!(live.pixels(), replay.pixels());
    }
}
