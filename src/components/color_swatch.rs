use egui::{Color32, Response, Sense, Stroke, Ui};

/// One palette colour; outlined when it is the current colour
pub struct ColorSwatch {
    pub color: Color32,
    pub selected: bool,
}

impl ColorSwatch {
    pub fn new(color: Color32, selected: bool) -> Self {
        Self { color, selected }
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.circle_filled(rect.center(), rect.width() / 2.0 - 2.0, self.color);

            let outline = if self.selected {
                Stroke::new(3.0, Color32::from_rgb(33, 150, 243))
            } else if response.hovered() {
                Stroke::new(1.5, Color32::LIGHT_GRAY)
            } else {
                Stroke::new(1.0, Color32::DARK_GRAY)
            };
            painter.circle_stroke(rect.center(), rect.width() / 2.0 - 1.0, outline);
        }

        response
    }
}
