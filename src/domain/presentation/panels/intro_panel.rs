use bevy::prelude::*;
use bevy_egui::egui::{self, Align2, Color32, FontId, RichText};

use crate::domain::simulation::StartEvent;

const STORY: &[&str] = &[
    "Arrrrffff ! You and Kelly are fighting because you broke her favorite paint palette \
     and got paint all over the floor....",
    "She's so mad that she's left the house and you're not sure where she's gone.",
    "You need to find her and apologize before she gets too far away.",
];

pub fn show_intro_panel(ctx: &mut egui::Context, ev_start: &mut EventWriter<StartEvent>) {
    egui::Area::new("intro_story".into())
        .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 40.0))
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(200))
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.set_max_width(1000.0);
                    ui.label(
                        RichText::new("At home")
                            .font(FontId::proportional(24.0))
                            .color(Color32::GREEN),
                    );
                    for line in STORY {
                        ui.label(
                            RichText::new(*line)
                                .font(FontId::proportional(18.0))
                                .color(Color32::WHITE),
                        );
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        ui.label(
                            RichText::new("Change the time to find her...")
                                .font(FontId::proportional(18.0))
                                .color(Color32::WHITE)
                                .strong(),
                        );
                    });
                });
        });

    egui::Area::new("intro_start".into())
        .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -240.0))
        .show(ctx, |ui| {
            if ui.add_sized([200.0, 36.0], egui::Button::new("Let's go !")).clicked() {
                ev_start.send(StartEvent);
            }
        });
}
