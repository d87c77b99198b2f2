use egui::{Color32, Rect, Sense, Vec2};

use crate::StudioApp;
use crate::input::SurfaceMapping;
use crate::state::SurfaceKind;

pub fn central_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available = ui.available_size();
        let half = Vec2::new((available.x - ui.spacing().item_spacing.x) / 2.0, available.y - 24.0);

        ui.horizontal_top(|ui| {
            for (kind, title) in [(SurfaceKind::Sketch, "Draw here"), (SurfaceKind::Art, "Colour me in")] {
                ui.vertical(|ui| {
                    ui.label(title);
                    canvas(app, ui, kind, half);
                });
            }
        });
    });
}

fn canvas(app: &mut StudioApp, ui: &mut egui::Ui, kind: SurfaceKind, max_size: Vec2) {
    let surface_size = match app.session().surface(kind) {
        Some(surface) => surface.size(),
        None => app.session().config().art_size,
    };
    let size = fit(surface_size, max_size);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

    if app.session().surface(kind).is_none() {
        empty_canvas(app, ui, rect);
        return;
    }

    let mapping = SurfaceMapping::new(rect, surface_size);
    let (session, input) = app.input_parts(kind);
    for event in input.process(&response, &mapping) {
        session.handle_pointer(kind, event);
    }

    let ctx = ui.ctx().clone();
    match app.surface_texture(kind, &ctx) {
        Some(Ok(texture)) => {
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter().image(texture, rect, uv, Color32::WHITE);
        }
        Some(Err(err)) => log::warn!("Cannot show {:?} surface: {}", kind, err),
        None => return,
    }
    ui.painter()
        .rect_stroke(rect, 0.0, egui::Stroke::new(1.0, Color32::GRAY));
}

fn empty_canvas(app: &StudioApp, ui: &mut egui::Ui, rect: Rect) {
    let painter = ui.painter();
    painter.rect_filled(rect, 4.0, Color32::from_gray(230));
    let message = if app.session().state().is_generating() {
        "Making your picture..."
    } else {
        "Your picture will appear here"
    };
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        message,
        egui::FontId::proportional(18.0),
        Color32::DARK_GRAY,
    );
}

/// Largest size with the surface's aspect ratio that fits `max_size`
fn fit(surface_size: [u32; 2], max_size: Vec2) -> Vec2 {
    let [width, height] = surface_size.map(|v| v as f32);
    let scale = (max_size.x / width).min(max_size.y / height).max(0.1);
    Vec2::new(width * scale, height * scale)
}
