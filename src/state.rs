//! State machine for a drawing session.
//!
//! The session is always in exactly one of these states, so combinations
//! such as "drawing while the enhancement is being written" cannot occur.
//!
//! ```text
//!              ┌──────────────────────┐
//!        ┌─────►  Drawing { surface } ├─────┐
//!        │     └──────────────────────┘     │
//! ┌──────┴─┐   ┌──────────────────────┐   ┌─▼──────┐
//! │  Idle  ├───► GeneratingEnhancement├───►  Idle  │
//! └──────┬─┘   └──────────────────────┘   └─▲──────┘
//!        │     ┌──────────────────────┐     │
//!        └─────►   GeneratingStory    ├─────┘
//!              └──────────────────────┘
//! ```
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a pointer press on the art surface does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    Pen,
    #[default]
    Fill,
}

impl ToolMode {
    pub fn toggled(self) -> Self {
        match self {
            ToolMode::Pen => ToolMode::Fill,
            ToolMode::Fill => ToolMode::Pen,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Pen => "Pen",
            ToolMode::Fill => "Fill",
        }
    }
}

/// The two independent drawing surfaces of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// The child's line drawing, always drawn with the pen
    Sketch,
    /// The enhanced picture, coloured with pen or fill
    Art,
}

/// Identifies one asynchronous generation. Only results carrying the
/// session's current token are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub(crate) fn first() -> Self {
        Self(0)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No active operation
    #[default]
    Idle,
    /// A pen stroke is in progress
    Drawing { surface: SurfaceKind },
    /// Waiting for the caption and enhancement services
    GeneratingEnhancement { token: GenerationToken },
    /// Waiting for the story service for the given history entry
    GeneratingStory { token: GenerationToken, entry: Uuid },
}

impl SessionState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &SessionState) -> bool {
        match (self, new_state) {
            // Cancelling or finishing is always allowed
            (_, SessionState::Idle) => true,

            (SessionState::Idle, _) => true,

            // All other transitions are invalid
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Drawing { .. } => "drawing",
            SessionState::GeneratingEnhancement { .. } => "generating art",
            SessionState::GeneratingStory { .. } => "writing a story",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, SessionState::Drawing { .. })
    }

    pub fn is_generating(&self) -> bool {
        matches!(
            self,
            SessionState::GeneratingEnhancement { .. } | SessionState::GeneratingStory { .. }
        )
    }

    /// Returns the surface being drawn on, if a stroke is in progress
    pub fn drawing_surface(&self) -> Option<SurfaceKind> {
        match self {
            SessionState::Drawing { surface } => Some(*surface),
            _ => None,
        }
    }

    /// Token of the generation in flight, if any
    pub fn pending_token(&self) -> Option<GenerationToken> {
        match self {
            SessionState::GeneratingEnhancement { token } | SessionState::GeneratingStory { token, .. } => {
                Some(*token)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_mode_toggle() {
        assert_eq!(ToolMode::default(), ToolMode::Fill);
        assert_eq!(ToolMode::Fill.toggled(), ToolMode::Pen);
        assert_eq!(ToolMode::Pen.toggled(), ToolMode::Fill);
    }

    #[test]
    fn test_transitions() {
        let token = GenerationToken::first().next();
        let drawing = SessionState::Drawing {
            surface: SurfaceKind::Sketch,
        };
        let generating = SessionState::GeneratingEnhancement { token };

        assert!(SessionState::Idle.can_transition_to(&drawing));
        assert!(SessionState::Idle.can_transition_to(&generating));
        assert!(drawing.can_transition_to(&SessionState::Idle));
        assert!(generating.can_transition_to(&SessionState::Idle));

        assert!(!drawing.can_transition_to(&generating));
        assert!(!generating.can_transition_to(&drawing));
        assert!(!generating.can_transition_to(&SessionState::GeneratingStory {
            token,
            entry: Uuid::nil(),
        }));
    }

    #[test]
    fn test_pending_token() {
        let token = GenerationToken::first().next();
        assert_eq!(
            SessionState::GeneratingEnhancement { token }.pending_token(),
            Some(token)
        );
        assert_eq!(SessionState::Idle.pending_token(), None);
    }
}
