#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod fill;
pub mod history;
pub mod input;
pub mod panels;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod state;
pub mod stroke;
pub mod style;
pub mod surface;
pub mod texture_manager;
pub mod util;

pub use app::{Preferences, StudioApp};
pub use config::StudioConfig;
pub use error::{ConfigError, HistoryError, ServiceError, SessionError, SessionResult, SurfaceError};
pub use fill::{flood_fill, FillOutcome};
pub use history::{HistoryEntry, HistoryStore};
pub use input::{InputHandler, PointerEvent, SurfaceMapping};
pub use pipeline::{PipelineMessage, PipelineRunner};
pub use services::{ImageCaptioner, ImageEnhancer, PlaceholderServices, Services, StoryWriter};
pub use session::DrawingSession;
pub use state::{GenerationToken, SessionState, SurfaceKind, ToolMode};
pub use stroke::{Stroke, StrokeRecorder};
pub use style::ArtStyle;
pub use surface::PixelSurface;
