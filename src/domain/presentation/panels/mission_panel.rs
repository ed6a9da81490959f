use bevy_egui::egui::{self, Align2, Color32, FontId, RichText};

use crate::domain::simulation::level::LevelConfig;

pub fn show_mission_panel(ctx: &mut egui::Context, level: &LevelConfig) {
    egui::Area::new("mission_panel".into())
        .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 40.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(200))
                .inner_margin(egui::Margin::symmetric(40.0, 12.0))
                .show(ui, |ui| {
                    ui.set_max_width(960.0);
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new(level.title)
                                .font(FontId::proportional(24.0))
                                .color(Color32::GREEN),
                        );
                    });
                    for line in level.briefing {
                        ui.label(
                            RichText::new(*line)
                                .font(FontId::proportional(18.0))
                                .color(Color32::WHITE),
                        );
                    }
                });
        });
}
