use bevy::prelude::*;
use bevy_egui::egui::{self, Align2, Color32, FontId, RichText};

use crate::domain::simulation::ResetEvent;

pub fn show_ending_panel(
    ctx: &mut egui::Context,
    ev_reset: &mut EventWriter<ResetEvent>,
    ev_exit: &mut EventWriter<AppExit>,
) {
    egui::Area::new("ending_story".into())
        .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 60.0))
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(200))
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.set_max_width(900.0);
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new("At Kelly's home")
                                .font(FontId::proportional(24.0))
                                .color(Color32::GREEN),
                        );
                    });
                    ui.label(
                        RichText::new(
                            "Congratulations! You've completed the three missions that have \
                             tested your resolve, responsibility, and kindness.",
                        )
                        .font(FontId::proportional(18.0))
                        .color(Color32::WHITE),
                    );
                });
        });

    egui::Area::new("ending_buttons".into())
        .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -120.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_sized([200.0, 32.0], egui::Button::new("Restart")).clicked() {
                    ev_reset.send(ResetEvent);
                }
                ui.add_space(120.0);
                if ui.add_sized([200.0, 32.0], egui::Button::new("Quit")).clicked() {
                    ev_exit.send(AppExit::Success);
                }
            });
        });
}
