use egui::Color32;
use serde::{Deserialize, Serialize};

/// Mood of the picture and story the generation services are asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    #[default]
    Happy,
    Scary,
    Science,
    Moral,
    Health,
    Adventure,
    Nature,
    Fantasy,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 8] = [
        ArtStyle::Happy,
        ArtStyle::Scary,
        ArtStyle::Science,
        ArtStyle::Moral,
        ArtStyle::Health,
        ArtStyle::Adventure,
        ArtStyle::Nature,
        ArtStyle::Fantasy,
    ];

    /// Stable tag passed to the external services
    pub fn tag(&self) -> &'static str {
        match self {
            ArtStyle::Happy => "happy",
            ArtStyle::Scary => "scary",
            ArtStyle::Science => "science",
            ArtStyle::Moral => "moral",
            ArtStyle::Health => "health",
            ArtStyle::Adventure => "adventure",
            ArtStyle::Nature => "nature",
            ArtStyle::Fantasy => "fantasy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtStyle::Happy => "Happy",
            ArtStyle::Scary => "Spooky",
            ArtStyle::Science => "Science",
            ArtStyle::Moral => "Lesson",
            ArtStyle::Health => "Healthy",
            ArtStyle::Adventure => "Adventure",
            ArtStyle::Nature => "Nature",
            ArtStyle::Fantasy => "Fantasy",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.tag() == tag)
    }

    /// Colour used to tint offline placeholder art
    pub fn accent(&self) -> Color32 {
        match self {
            ArtStyle::Happy => Color32::from_rgb(255, 214, 0),
            ArtStyle::Scary => Color32::from_rgb(90, 40, 120),
            ArtStyle::Science => Color32::from_rgb(0, 150, 200),
            ArtStyle::Moral => Color32::from_rgb(230, 120, 40),
            ArtStyle::Health => Color32::from_rgb(60, 180, 90),
            ArtStyle::Adventure => Color32::from_rgb(200, 60, 40),
            ArtStyle::Nature => Color32::from_rgb(40, 140, 60),
            ArtStyle::Fantasy => Color32::from_rgb(220, 90, 200),
        }
    }
}

impl std::fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
