use egui::{pos2, Pos2, Rect, Response, Vec2};

/// Maps screen positions onto the pixel grid of a surface.
///
/// A surface is usually displayed at a different size than its pixel
/// dimensions, so the horizontal and vertical scale are tracked separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMapping {
    screen_rect: Rect,
    pixel_size: Vec2,
}

impl SurfaceMapping {
    pub fn new(screen_rect: Rect, pixel_size: [u32; 2]) -> Self {
        Self {
            screen_rect,
            pixel_size: Vec2::new(pixel_size[0] as f32, pixel_size[1] as f32),
        }
    }

    /// Displayed size divided by pixel size, per axis
    pub fn scale(&self) -> Vec2 {
        Vec2::new(
            self.screen_rect.width() / self.pixel_size.x,
            self.screen_rect.height() / self.pixel_size.y,
        )
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    /// Translates a screen position into surface-local pixel coordinates.
    /// Returns `None` while the surface has no visible area.
    pub fn to_surface(&self, screen: Pos2) -> Option<Pos2> {
        let scale = self.scale();
        if scale.x <= 0.0 || scale.y <= 0.0 || !scale.x.is_finite() || !scale.y.is_finite() {
            return None;
        }
        let local = screen - self.screen_rect.min;
        Some(pos2(local.x / scale.x, local.y / scale.y))
    }

    pub fn to_screen(&self, surface: Pos2) -> Pos2 {
        let scale = self.scale();
        self.screen_rect.min + Vec2::new(surface.x * scale.x, surface.y * scale.y)
    }

    pub fn contains(&self, screen: Pos2) -> bool {
        self.screen_rect.contains(screen)
    }
}

/// Pointer input for a single surface, already in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed (or touch started) on the surface
    Down(Pos2),
    /// Pointer moved while the button is held
    Move(Pos2),
    /// Button released
    Up,
    /// Pointer dragged off the surface while held
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PressState {
    Released,
    Pressed { last: Pos2 },
    // Left the surface while held; wait for the release before tracking again
    Left,
}

/// Converts egui responses for a canvas into [`PointerEvent`]s
#[derive(Debug)]
pub struct InputHandler {
    state: PressState,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            state: PressState::Released,
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.state, PressState::Pressed { .. })
    }

    /// Process the canvas response for this frame
    pub fn process(&mut self, response: &Response, mapping: &SurfaceMapping) -> Vec<PointerEvent> {
        let held = response.is_pointer_button_down_on();
        let screen_pos = response.interact_pointer_pos().or(response.hover_pos());
        let inside = screen_pos.is_some_and(|pos| mapping.contains(pos));
        self.step(held, screen_pos.filter(|_| inside), mapping)
    }

    /// State transition shared by [`InputHandler::process`] and tests.
    /// `screen_pos` is `None` when the pointer is not over the surface.
    pub fn step(
        &mut self,
        held: bool,
        screen_pos: Option<Pos2>,
        mapping: &SurfaceMapping,
    ) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let surface_pos = screen_pos.and_then(|pos| mapping.to_surface(pos));

        match (self.state, held, surface_pos) {
            (PressState::Released, true, Some(pos)) => {
                events.push(PointerEvent::Down(pos));
                self.state = PressState::Pressed { last: pos };
            }
            (PressState::Pressed { last }, true, Some(pos)) => {
                if pos != last {
                    events.push(PointerEvent::Move(pos));
                    self.state = PressState::Pressed { last: pos };
                }
            }
            (PressState::Pressed { .. }, true, None) => {
                events.push(PointerEvent::Leave);
                self.state = PressState::Left;
            }
            (PressState::Pressed { .. }, false, _) => {
                events.push(PointerEvent::Up);
                self.state = PressState::Released;
            }
            (PressState::Left, false, _) => {
                self.state = PressState::Released;
            }
            _ => {}
        }

        events
    }
}
