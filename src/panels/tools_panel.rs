use crate::StudioApp;
use crate::components::{ColorSwatch, ToolButton};
use crate::state::ToolMode;
use crate::style::ArtStyle;

pub fn tools_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");
            ui.label("Colouring the picture with:");
            ui.horizontal(|ui| {
                let current = app.session().tool_mode();
                for mode in [ToolMode::Pen, ToolMode::Fill] {
                    if ToolButton::new(mode, current == mode).show(ui).clicked() {
                        app.session_mut().set_tool_mode(mode);
                    }
                }
            });
            ui.separator();

            ui.label("Colours");
            let palette = app.session().config().palette_colors();
            let current = app.session().color();
            ui.horizontal_wrapped(|ui| {
                for color in palette {
                    if ColorSwatch::new(color, color == current).show(ui).clicked() {
                        app.session_mut().set_color(color);
                    }
                }
            });
            ui.separator();

            let [min, max] = app.session().config().brush_width_range;
            let mut width = app.session().brush_width();
            if ui
                .add(egui::Slider::new(&mut width, min..=max).text("Brush"))
                .changed()
            {
                app.session_mut().set_brush_width(width);
            }
            ui.separator();

            let mut style = app.session().style();
            egui::ComboBox::from_label("Style")
                .selected_text(style.label())
                .show_ui(ui, |ui| {
                    for option in ArtStyle::ALL {
                        ui.selectable_value(&mut style, option, option.label());
                    }
                });
            if style != app.session().style() {
                app.session_mut().set_style(style);
            }
            ui.separator();

            actions(app, ui);
        });
}

fn actions(app: &mut StudioApp, ui: &mut egui::Ui) {
    let state = app.session().state();
    let has_sketch = !app.session().sketch().is_uniform();
    let has_selection = app.session().history().selected().is_some();

    if state.is_generating() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("{}...", capitalise(state.name())));
        });
        if ui.button("Cancel").clicked() {
            app.session_mut().cancel_generation();
        }
        ui.separator();
    }

    let idle = state.is_idle();
    if ui
        .add_enabled(idle && has_sketch, egui::Button::new("✨ Make Art"))
        .clicked()
    {
        app.make_art(ui.ctx());
    }
    if ui
        .add_enabled(idle && has_selection, egui::Button::new("📖 Tell a Story"))
        .clicked()
    {
        app.write_story(ui.ctx());
    }
    if ui
        .add_enabled(has_selection && app.session().art().is_some(), egui::Button::new("💾 Save Colouring"))
        .clicked()
    {
        let saved = app.session_mut().save_coloring();
        match saved {
            Ok(index) => {
                if let Some(id) = app.session().history().get(index).map(|entry| entry.id()) {
                    app.textures_mut()
                        .invalidate(crate::texture_manager::TextureKey::Thumbnail(id));
                }
            }
            Err(err) => log::info!("Cannot save colouring: {}", err),
        }
    }
    if ui.button("🗑 Clear").clicked() {
        app.session_mut().clear_all();
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
