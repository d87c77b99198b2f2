//! The drawing session controller.
//!
//! `DrawingSession` owns everything a child interacts with: the sketch and
//! art surfaces, the current tool mode, colour and brush width, the stroke
//! recorder and the history store. All mutation happens through it, on the
//! UI thread, and every state change goes through [`SessionState`]
//! transitions.
//!
//! Asynchronous work is split in two halves. `begin_*` validates the state,
//! issues a fresh [`GenerationToken`] and returns a request for the
//! pipeline; `complete_*` applies the result only if its token is still the
//! current one. Clearing the canvas or cancelling invalidates the token, so
//! a late result can never resurrect stale art.

use egui::{Color32, Pos2};
use uuid::Uuid;

use crate::config::StudioConfig;
use crate::error::{ConfigError, HistoryError, SessionError, SessionResult};
use crate::fill::{flood_fill, FillOutcome};
use crate::history::{HistoryEntry, HistoryStore};
use crate::input::PointerEvent;
use crate::pipeline::{EnhancementRequest, EnhancementResult, StoryRequest, StoryResult};
use crate::state::{GenerationToken, SessionState, SurfaceKind, ToolMode};
use crate::stroke::{Stroke, StrokeRecorder};
use crate::style::ArtStyle;
use crate::surface::PixelSurface;

const DEFAULT_DESCRIPTION: &str = "a child's drawing";

#[derive(Debug)]
pub struct DrawingSession {
    config: StudioConfig,
    state: SessionState,
    tool_mode: ToolMode,
    color: Color32,
    brush_width: f32,
    style: ArtStyle,
    background: Color32,
    sketch: PixelSurface,
    art: Option<PixelSurface>,
    // History entry currently shown on the art surface
    displayed_entry: Option<Uuid>,
    recorder: StrokeRecorder,
    history: HistoryStore,
    generation: GenerationToken,
    error: Option<String>,
}

impl DrawingSession {
    pub fn new(config: StudioConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let history = HistoryStore::new(config.history_capacity)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        let background = config.background_color();
        let [width, height] = config.sketch_size;
        let color = config.palette_colors().first().copied().unwrap_or(Color32::BLACK);

        Ok(Self {
            state: SessionState::Idle,
            tool_mode: config.initial_tool,
            color,
            brush_width: config.clamp_brush_width(config.brush_width),
            style: ArtStyle::default(),
            background,
            sketch: PixelSurface::new(width, height, background),
            art: None,
            displayed_entry: None,
            recorder: StrokeRecorder::new(),
            history,
            generation: GenerationToken::first(),
            error: None,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.tool_mode
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    pub fn style(&self) -> ArtStyle {
        self.style
    }

    pub fn sketch(&self) -> &PixelSurface {
        &self.sketch
    }

    /// The art surface, once an enhancement or history entry has been shown
    pub fn art(&self) -> Option<&PixelSurface> {
        self.art.as_ref()
    }

    pub fn surface(&self, kind: SurfaceKind) -> Option<&PixelSurface> {
        match kind {
            SurfaceKind::Sketch => Some(&self.sketch),
            SurfaceKind::Art => self.art.as_ref(),
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn displayed_entry(&self) -> Option<Uuid> {
        self.displayed_entry
    }

    /// The message for the last failed attempt, if it has not been dismissed
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        if self.tool_mode != mode {
            log::info!("Tool mode: {}", mode.name());
            self.tool_mode = mode;
        }
    }

    pub fn toggle_tool_mode(&mut self) -> ToolMode {
        self.set_tool_mode(self.tool_mode.toggled());
        self.tool_mode
    }

    /// Takes effect for the next stroke or fill; sealed strokes keep theirs
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.brush_width = self.config.clamp_brush_width(width);
    }

    pub fn set_style(&mut self, style: ArtStyle) {
        self.style = style;
    }

    /// Routes one pointer event to the recorder or the fill engine.
    /// Returns true when a surface changed.
    pub fn handle_pointer(&mut self, kind: SurfaceKind, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(kind, pos),
            PointerEvent::Move(pos) => self.pointer_move(kind, pos),
            PointerEvent::Up | PointerEvent::Leave => self.pointer_up(kind).is_some(),
        }
    }

    /// Starts a stroke, or fills once, depending on the surface and tool mode.
    /// The sketch surface always uses the pen.
    pub fn pointer_down(&mut self, kind: SurfaceKind, pos: Pos2) -> bool {
        if self.state.is_generating() {
            log::debug!("Ignoring input while {}", self.state.name());
            return false;
        }
        if let Some(open) = self.state.drawing_surface() {
            self.pointer_up(open);
        }

        let mode = match kind {
            SurfaceKind::Sketch => ToolMode::Pen,
            SurfaceKind::Art => self.tool_mode,
        };
        let Some(surface) = surface_for(&mut self.sketch, &mut self.art, kind) else {
            // Nothing to draw on yet
            return false;
        };

        match mode {
            ToolMode::Pen => {
                self.recorder.begin(surface, pos, self.color, self.brush_width);
                self.state = SessionState::Drawing { surface: kind };
                true
            }
            ToolMode::Fill => {
                let seed = [pos.x.floor() as i64, pos.y.floor() as i64];
                let outcome = flood_fill(surface, seed, self.color);
                if outcome == FillOutcome::OutOfBounds {
                    log::debug!("Fill seed {:?} is outside the {:?} surface", seed, kind);
                }
                outcome.changed()
            }
        }
    }

    pub fn pointer_move(&mut self, kind: SurfaceKind, pos: Pos2) -> bool {
        if self.state.drawing_surface() != Some(kind) {
            return false;
        }
        match surface_for(&mut self.sketch, &mut self.art, kind) {
            Some(surface) => self.recorder.extend(surface, pos),
            None => false,
        }
    }

    /// Seals the stroke in progress on `kind`, if any
    pub fn pointer_up(&mut self, kind: SurfaceKind) -> Option<Stroke> {
        if self.state.drawing_surface() != Some(kind) {
            return None;
        }
        self.state = SessionState::Idle;
        self.recorder.end()
    }

    /// Starts enhancing the current sketch.
    ///
    /// # Errors
    ///
    /// `Busy` while another operation is running, `NoSketch` when the sketch
    /// surface is still blank.
    pub fn begin_enhancement(&mut self) -> SessionResult<EnhancementRequest> {
        let token = self.generation.next();
        self.check_transition(SessionState::GeneratingEnhancement { token }, "start a new picture")?;
        if self.sketch.is_uniform() {
            return Err(SessionError::NoSketch);
        }

        let sketch_png = self.sketch.encode_png()?;
        self.generation = token;
        self.state = SessionState::GeneratingEnhancement { token };
        self.error = None;
        log::info!("Enhancement {} requested", token);

        Ok(EnhancementRequest {
            token,
            sketch_png: sketch_png.into(),
            style: self.style,
        })
    }

    /// Applies an enhancement result: shows the art and records a history
    /// entry. Returns the new entry's index.
    pub fn complete_enhancement(&mut self, result: EnhancementResult) -> SessionResult<usize> {
        if !self.is_current(result.token, |state| {
            matches!(state, SessionState::GeneratingEnhancement { .. })
        }) {
            log::warn!("Discarding stale enhancement {}", result.token);
            return Err(SessionError::StaleGeneration);
        }
        self.state = SessionState::Idle;

        let art = match result.outcome {
            Ok(art) => art,
            Err(err) => return Err(self.report(err.into())),
        };

        let surface = match self.load_art(&art.image) {
            Ok(surface) => surface,
            Err(err) => return Err(self.report(err)),
        };

        let entry = HistoryEntry::new(art.sketch_png, art.image)
            .with_prompt(art.description)
            .with_style(art.style);
        let id = entry.id();
        let index = self.history.append(entry);
        self.history.select(index)?;
        self.show_art(surface, id);
        log::info!("Enhancement {} stored as history entry {}", result.token, index);
        Ok(index)
    }

    /// Starts writing a story for the history entry at `index`
    pub fn begin_story(&mut self, index: usize) -> SessionResult<StoryRequest> {
        let entry = self.history.get(index).ok_or(HistoryError::InvalidIndex {
            index,
            len: self.history.len(),
        })?;
        let (entry_id, style) = (entry.id(), entry.style());
        let description = entry.prompt().unwrap_or(DEFAULT_DESCRIPTION).to_owned();

        let token = self.generation.next();
        self.check_transition(
            SessionState::GeneratingStory {
                token,
                entry: entry_id,
            },
            "write a story",
        )?;
        self.generation = token;
        self.state = SessionState::GeneratingStory {
            token,
            entry: entry_id,
        };
        self.error = None;
        log::info!("Story {} requested for entry {}", token, index);

        Ok(StoryRequest {
            token,
            entry: entry_id,
            description,
            style,
        })
    }

    pub fn begin_story_for_selected(&mut self) -> SessionResult<StoryRequest> {
        let index = self.history.selected().ok_or(SessionError::NoSelection)?;
        self.begin_story(index)
    }

    /// Attaches a finished story to its entry. The entry is looked up again
    /// by id, so a story whose entry was deleted or evicted is discarded.
    pub fn complete_story(&mut self, result: StoryResult) -> SessionResult<usize> {
        if !self.is_current(result.token, |state| {
            matches!(state, SessionState::GeneratingStory { entry, .. } if *entry == result.entry)
        }) {
            log::warn!("Discarding stale story {}", result.token);
            return Err(SessionError::StaleGeneration);
        }
        self.state = SessionState::Idle;

        let story = match result.outcome {
            Ok(story) => story,
            Err(err) => return Err(self.report(err.into())),
        };
        let Some(index) = self.history.position_of(result.entry) else {
            log::warn!("Story {} arrived for a removed entry", result.token);
            return Err(SessionError::StaleGeneration);
        };
        self.history.attach_story(index, story)?;
        log::info!("Story {} attached to entry {}", result.token, index);
        Ok(index)
    }

    /// Abandons the generation in flight; its result will be discarded
    pub fn cancel_generation(&mut self) {
        if self.state.is_generating() {
            log::info!("Cancelled {}", self.state.name());
            self.generation = self.generation.next();
            self.state = SessionState::Idle;
        }
    }

    /// Wipes both surfaces and abandons any generation in flight. History
    /// entries are kept but nothing stays selected.
    pub fn clear_all(&mut self) {
        self.recorder.cancel();
        self.sketch.clear(self.background);
        self.art = None;
        self.displayed_entry = None;
        self.history.clear_selection();
        self.generation = self.generation.next();
        self.state = SessionState::Idle;
        self.error = None;
        log::info!("Canvas cleared");
    }

    /// Shows the history entry at `index` on the art surface, preferring the
    /// saved colouring over the original art.
    pub fn select_history(&mut self, index: usize) -> SessionResult<()> {
        if let Some(open) = self.state.drawing_surface() {
            self.pointer_up(open);
        }
        let entry = self.history.select(index)?.clone();
        let bytes = entry.coloring().unwrap_or(entry.generated());
        let surface = match self.load_art(bytes) {
            Ok(surface) => surface,
            Err(err) => return Err(self.report(err)),
        };
        self.show_art(surface, entry.id());
        Ok(())
    }

    /// Removes a history entry. When it was the one on display, the art
    /// surface is cleared as well.
    pub fn delete_history(&mut self, index: usize) -> SessionResult<HistoryEntry> {
        let removed = self.history.delete(index)?;
        if self.displayed_entry == Some(removed.id()) {
            if self.state.drawing_surface() == Some(SurfaceKind::Art) {
                self.recorder.cancel();
                self.state = SessionState::Idle;
            }
            self.art = None;
            self.displayed_entry = None;
        }
        Ok(removed)
    }

    /// Stores the coloured art surface into the selected entry
    pub fn save_coloring(&mut self) -> SessionResult<usize> {
        let index = self.history.selected().ok_or(SessionError::NoSelection)?;
        let entry_id = self.history.get(index).map(HistoryEntry::id);
        let art = match &self.art {
            Some(art) if entry_id.is_some() && self.displayed_entry == entry_id => art,
            _ => return Err(SessionError::NoSelection),
        };
        let bytes = art.encode_png()?;
        self.history.attach_coloring(index, bytes)?;
        log::info!("Saved colouring for entry {}", index);
        Ok(index)
    }

    fn load_art(&self, bytes: &[u8]) -> SessionResult<PixelSurface> {
        let [width, height] = self.config.art_size;
        let mut surface = PixelSurface::new(width, height, self.background);
        surface.replace_from_bytes(bytes)?;
        Ok(surface)
    }

    // Writes into the existing art surface so its revision keeps increasing
    fn show_art(&mut self, surface: PixelSurface, entry: Uuid) {
        match &mut self.art {
            Some(art) if art.size() == surface.size() => art.write(surface.into_image()),
            _ => self.art = Some(surface),
        }
        self.displayed_entry = Some(entry);
    }

    fn check_transition(&self, next: SessionState, action: &'static str) -> SessionResult<()> {
        if self.state.can_transition_to(&next) {
            Ok(())
        } else {
            Err(SessionError::Busy {
                action,
                state: self.state.name(),
            })
        }
    }

    fn is_current(&self, token: GenerationToken, expected: impl Fn(&SessionState) -> bool) -> bool {
        token == self.generation && self.state.pending_token() == Some(token) && expected(&self.state)
    }

    // Records one user-visible message per failed attempt
    fn report(&mut self, err: SessionError) -> SessionError {
        log::warn!("Generation failed: {}", err);
        self.error = Some(err.to_string());
        err
    }
}

fn surface_for<'a>(
    sketch: &'a mut PixelSurface,
    art: &'a mut Option<PixelSurface>,
    kind: SurfaceKind,
) -> Option<&'a mut PixelSurface> {
    match kind {
        SurfaceKind::Sketch => Some(sketch),
        SurfaceKind::Art => art.as_mut(),
    }
}
