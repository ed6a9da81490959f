use bevy_egui::egui::{self, Align2, Color32, RichText};

use crate::domain::presentation::HudSettings;
use crate::domain::simulation::{format_time, GameSession, Tense};

pub fn show_hud_panel(ctx: &mut egui::Context, session: &GameSession, hud: &HudSettings) {
    egui::Area::new("hud".into())
        .anchor(Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(150))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("Time  {}", format_time(session.elapsed())))
                            .size(20.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                    ui.label(
                        RichText::new(format!("Items  {}", session.items_collected()))
                            .size(20.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                    if let Some(tense) = session.active_tense() {
                        let color = match tense {
                            Tense::Present => Color32::LIGHT_GREEN,
                            Tense::Past => Color32::LIGHT_GRAY,
                        };
                        ui.label(RichText::new(tense.label()).color(color));
                    }
                });
        });

    if !hud.show_help {
        return;
    }
    egui::Area::new("controls_help".into())
        .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
        .interactable(false)
        .show(ctx, |ui| {
            hint(ui, "Press ", "Enter", " to interact");
            hint(ui, "Press ", "SPACE", " to switch time");
            hint(ui, "Use ", "arrow keys", " to move");
            hint(ui, "Press ", "H", " to hide these hints");
        });
}

fn hint(ui: &mut egui::Ui, before: &str, key: &str, after: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(before).strong().color(Color32::WHITE));
        ui.label(RichText::new(key).size(14.0).strong().color(Color32::YELLOW));
        ui.label(RichText::new(after).strong().color(Color32::WHITE));
    });
}
