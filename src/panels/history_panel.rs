use crate::StudioApp;
use crate::history::HistoryEntry;
use crate::texture_manager::TextureKey;

const THUMBNAIL_WIDTH: f32 = 120.0;

enum HistoryAction {
    Select(usize),
    Delete(usize),
    ShowStory(uuid::Uuid),
}

pub fn history_panel(app: &mut StudioApp, ctx: &egui::Context) {
    // Entries are cheap to clone; the bytes are shared
    let entries: Vec<HistoryEntry> = app.session().history().iter().cloned().collect();
    let selected = app.session().history().selected();
    let capacity = app.session().history().capacity();
    let mut action = None;

    egui::SidePanel::right("history_panel")
        .resizable(false)
        .default_width(THUMBNAIL_WIDTH + 40.0)
        .show(ctx, |ui| {
            ui.heading(format!("My Pictures {}/{}", entries.len(), capacity));
            ui.separator();

            if entries.is_empty() {
                ui.weak("Pictures you make will show up here.");
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for (index, entry) in entries.iter().enumerate() {
                    let version = u64::from(entry.coloring().is_some());
                    let bytes = entry.coloring().unwrap_or(entry.generated());
                    let texture = app.textures_mut().thumbnail_texture(entry.id(), version, bytes, ctx);

                    let frame = egui::Frame::group(ui.style()).stroke(if selected == Some(index) {
                        egui::Stroke::new(2.0, egui::Color32::from_rgb(33, 150, 243))
                    } else {
                        ui.visuals().widgets.noninteractive.bg_stroke
                    });
                    frame.show(ui, |ui| {
                        match texture {
                            Ok(texture) => {
                                let art = egui::load::SizedTexture::new(
                                    texture,
                                    egui::vec2(THUMBNAIL_WIDTH, THUMBNAIL_WIDTH * 4.0 / 3.0),
                                );
                                let image = egui::Image::new(art).sense(egui::Sense::click());
                                if ui.add(image).on_hover_text(entry.style().label()).clicked() {
                                    action = Some(HistoryAction::Select(index));
                                }
                            }
                            Err(err) => {
                                log::warn!("Thumbnail for {} unavailable: {}", entry.id(), err);
                                if ui.button("Show").clicked() {
                                    action = Some(HistoryAction::Select(index));
                                }
                            }
                        }
                        ui.horizontal(|ui| {
                            if entry.story().is_some() && ui.small_button("📖").clicked() {
                                action = Some(HistoryAction::ShowStory(entry.id()));
                            }
                            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                action = Some(HistoryAction::Delete(index));
                            }
                        });
                    });
                }
            });
        });

    match action {
        Some(HistoryAction::Select(index)) => {
            if let Err(err) = app.session_mut().select_history(index) {
                log::warn!("Cannot show history entry {}: {}", index, err);
            }
        }
        Some(HistoryAction::Delete(index)) => match app.session_mut().delete_history(index) {
            Ok(removed) => {
                log::info!("Deleted history entry {}", index);
                app.textures_mut().invalidate(TextureKey::Thumbnail(removed.id()));
            }
            Err(err) => log::warn!("Cannot delete history entry {}: {}", index, err),
        },
        Some(HistoryAction::ShowStory(id)) => app.open_story(id),
        None => {}
    }
}
