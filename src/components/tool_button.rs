use egui::{Align2, Color32, FontId, Response, Sense, Stroke, Ui};

use crate::state::ToolMode;

/// A large square button for picking the art surface tool
pub struct ToolButton {
    pub mode: ToolMode,
    pub icon: &'static str,
    pub selected: bool,
}

impl ToolButton {
    pub fn new(mode: ToolMode, selected: bool) -> Self {
        let icon = match mode {
            ToolMode::Pen => "✏",
            ToolMode::Fill => "🪣",
        };
        Self { mode, icon, selected }
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let button_size = egui::vec2(48.0, 48.0);
        let (rect, response) = ui.allocate_exact_size(button_size, Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.selected {
                Color32::from_rgb(100, 181, 246)
            } else if response.hovered() {
                Color32::from_gray(60)
            } else {
                Color32::from_gray(40)
            };
            ui.painter().rect_filled(rect, 6.0, bg_color);

            let text_color = if self.selected { Color32::BLACK } else { Color32::WHITE };
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.icon,
                FontId::proportional(28.0),
                text_color,
            );

            if self.selected {
                ui.painter()
                    .rect_stroke(rect, 6.0, Stroke::new(2.0, Color32::from_rgb(33, 150, 243)));
            }
        }

        response.on_hover_text(self.mode.name())
    }
}
