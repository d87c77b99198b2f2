use egui::Color32;

use crate::config::StudioConfig;
use crate::error::{ConfigError, SessionError};
use crate::input::InputHandler;
use crate::panels::{central_panel, history_panel, tools_panel};
use crate::pipeline::{PipelineMessage, PipelineRunner};
use crate::services::Services;
use crate::session::DrawingSession;
use crate::state::{SurfaceKind, ToolMode};
use crate::style::ArtStyle;
use crate::texture_manager::{TextureError, TextureKey, TextureManager};

const TEXTURE_CACHE_SIZE: usize = 32;

/// Choices restored when the app starts again
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Preferences {
    pub tool_mode: ToolMode,
    pub color: [u8; 4],
    pub brush_width: f32,
    pub style: ArtStyle,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tool_mode: ToolMode::default(),
            color: Color32::BLACK.to_srgba_unmultiplied(),
            brush_width: 5.0,
            style: ArtStyle::default(),
        }
    }
}

pub struct StudioApp {
    session: DrawingSession,
    runner: PipelineRunner,
    textures: TextureManager,
    sketch_input: InputHandler,
    art_input: InputHandler,
    // History entry whose story window is open
    story_window: Option<uuid::Uuid>,
}

impl std::fmt::Debug for StudioApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioApp")
            .field("session", &self.session)
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl StudioApp {
    /// Called once before the first frame.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: StudioConfig,
        services: Services,
    ) -> Result<Self, ConfigError> {
        let mut app = Self::with_services(config, services)?;
        if let Some(storage) = cc.storage {
            if let Some(preferences) = eframe::get_value::<Preferences>(storage, eframe::APP_KEY) {
                log::info!("Restored preferences");
                app.apply_preferences(&preferences);
            }
        }
        Ok(app)
    }

    /// Builds the app without a window, used by `new` and by tests
    pub fn with_services(config: StudioConfig, services: Services) -> Result<Self, ConfigError> {
        Ok(Self {
            session: DrawingSession::new(config)?,
            runner: PipelineRunner::new(services),
            textures: TextureManager::new(TEXTURE_CACHE_SIZE),
            sketch_input: InputHandler::new(),
            art_input: InputHandler::new(),
            story_window: None,
        })
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DrawingSession {
        &mut self.session
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// Texture showing the current pixels of `kind`, if that surface exists
    pub fn surface_texture(
        &mut self,
        kind: SurfaceKind,
        ctx: &egui::Context,
    ) -> Option<Result<egui::TextureId, TextureError>> {
        let surface = self.session.surface(kind)?;
        Some(self.textures.surface_texture(kind, surface, ctx))
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            tool_mode: self.session.tool_mode(),
            color: self.session.color().to_srgba_unmultiplied(),
            brush_width: self.session.brush_width(),
            style: self.session.style(),
        }
    }

    pub fn apply_preferences(&mut self, preferences: &Preferences) {
        let [r, g, b, a] = preferences.color;
        self.session.set_tool_mode(preferences.tool_mode);
        self.session.set_color(Color32::from_rgba_unmultiplied(r, g, b, a));
        self.session.set_brush_width(preferences.brush_width);
        self.session.set_style(preferences.style);
    }

    /// Mutable access to the session and the input handler of one surface
    pub fn input_parts(&mut self, kind: SurfaceKind) -> (&mut DrawingSession, &mut InputHandler) {
        let input = match kind {
            SurfaceKind::Sketch => &mut self.sketch_input,
            SurfaceKind::Art => &mut self.art_input,
        };
        (&mut self.session, input)
    }

    /// Sends the current sketch to the enhancement pipeline
    pub fn make_art(&mut self, ctx: &egui::Context) {
        match self.session.begin_enhancement() {
            Ok(request) => {
                let ctx = ctx.clone();
                self.runner
                    .spawn_enhancement(request, move || ctx.request_repaint());
            }
            Err(err) => log::info!("Cannot make art: {}", err),
        }
    }

    /// Asks for a story about the selected history entry
    pub fn write_story(&mut self, ctx: &egui::Context) {
        match self.session.begin_story_for_selected() {
            Ok(request) => {
                self.story_window = Some(request.entry);
                let ctx = ctx.clone();
                self.runner.spawn_story(request, move || ctx.request_repaint());
            }
            Err(err) => log::info!("Cannot write a story: {}", err),
        }
    }

    pub fn open_story(&mut self, entry: uuid::Uuid) {
        self.story_window = Some(entry);
    }

    /// Applies every pipeline result that arrived since the last frame
    pub fn process_pipeline_results(&mut self) {
        for message in self.runner.drain() {
            let applied = match message {
                PipelineMessage::Enhancement(result) => {
                    self.session.complete_enhancement(result).map(|_| ())
                }
                PipelineMessage::Story(result) => self.session.complete_story(result).map(|_| ()),
            };
            match applied {
                Ok(()) | Err(SessionError::StaleGeneration) => {}
                Err(err) => log::debug!("Pipeline result not applied: {}", err),
            }
        }
    }

    fn story_window(&mut self, ctx: &egui::Context) {
        let Some(id) = self.story_window else {
            return;
        };
        let history = self.session.history();
        let Some(entry) = history.position_of(id).and_then(|index| history.get(index)) else {
            self.story_window = None;
            return;
        };
        let pending = matches!(
            self.session.state(),
            crate::state::SessionState::GeneratingStory { entry, .. } if entry == id
        );

        let mut open = true;
        egui::Window::new("Story")
            .collapsible(false)
            .resizable(true)
            .default_width(360.0)
            .open(&mut open)
            .show(ctx, |ui| {
                if let Some(prompt) = entry.prompt() {
                    ui.weak(prompt);
                    ui.separator();
                }
                match entry.story() {
                    Some(story) => {
                        ui.label(story);
                    }
                    None if pending => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Writing a story...");
                        });
                    }
                    None => {
                        ui.label("No story yet.");
                    }
                }
            });
        if !open {
            self.story_window = None;
        }
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.session.last_error().map(str::to_owned) else {
            return;
        };
        egui::Window::new("Oops!")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 40.0))
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.session.dismiss_error();
                }
            });
    }
}

impl eframe::App for StudioApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.preferences());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();
        self.process_pipeline_results();
        if self.session.art().is_none() {
            self.textures.invalidate(TextureKey::Surface(SurfaceKind::Art));
        }

        tools_panel(self, ctx);
        history_panel(self, ctx);
        central_panel(self, ctx);

        self.story_window(ctx);
        self.error_window(ctx);
    }
}
