use bevy::prelude::*;
use bevy_egui::egui::{self, Align2, Color32, FontId, RichText};

use crate::domain::simulation::ResetEvent;

pub fn show_game_over_panel(
    ctx: &mut egui::Context,
    ev_reset: &mut EventWriter<ResetEvent>,
    ev_exit: &mut EventWriter<AppExit>,
) {
    egui::Window::new("Game Over")
        .title_bar(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("Game Over")
                        .font(FontId::proportional(30.0))
                        .color(Color32::WHITE),
                );
                ui.add_space(12.0);
                if ui.add_sized([200.0, 32.0], egui::Button::new("Restart")).clicked() {
                    ev_reset.send(ResetEvent);
                }
                if ui.add_sized([200.0, 32.0], egui::Button::new("Quit")).clicked() {
                    ev_exit.send(AppExit::Success);
                }
            });
        });
}
