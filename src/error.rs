use thiserror::Error;

/// Errors reported by the session history store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history index {index} is out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("history capacity must be at least 1")]
    ZeroCapacity,
}

/// Errors that can occur while encoding or decoding surface pixels
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Failures reported by the external generation services
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{service} is not available: {reason}")]
    Unavailable { service: &'static str, reason: String },

    #[error("{service} returned an unusable response: {reason}")]
    InvalidResponse { service: &'static str, reason: String },

    #[error("{0}")]
    Failed(String),
}

/// Errors reported by the drawing session controller
#[derive(Debug, Error)]
pub enum SessionError {
    /// A generation result arrived after it was superseded
    #[error("generation result is stale and was discarded")]
    StaleGeneration,

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("there is nothing on the sketch surface yet")]
    NoSketch,

    #[error("no history entry is selected")]
    NoSelection,

    #[error("cannot {action} while {state}")]
    Busy {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors that can occur while loading the studio configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
