use bevy::prelude::*;
use bevy_egui::egui::{self, Align2, Color32, FontId, RichText};
use std::time::Duration;

use crate::domain::simulation::Tense;

const BANNER_SECONDS: f32 = 2.5;

/// A short-lived headline, e.g. after finishing a level.
#[derive(Resource, Default)]
pub struct Banner {
    text: Option<&'static str>,
    timer: Timer,
}

impl Banner {
    pub fn show(&mut self, text: &'static str) {
        self.text = Some(text);
        self.timer = Timer::from_seconds(BANNER_SECONDS, TimerMode::Once);
    }

    pub fn tick(&mut self, delta: Duration) {
        if self.timer.tick(delta).finished() {
            self.text = None;
        }
    }

    pub fn text(&self) -> Option<&'static str> {
        self.text
    }
}

pub fn show_banners(ctx: &mut egui::Context, banner: &Banner, tense: Option<Tense>) {
    if let Some(text) = banner.text() {
        show_success_banner(ctx, text);
    }
    if tense == Some(Tense::Past) {
        show_past_banner(ctx);
    }
}

fn show_success_banner(ctx: &mut egui::Context, text: &str) {
    egui::Area::new("success_banner".into())
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            let text = RichText::new(text)
                .font(FontId::proportional(48.0))
                .color(Color32::GREEN);
            ui.label(text);
        });
}

fn show_past_banner(ctx: &mut egui::Context) {
    egui::Area::new("past_banner".into())
        .anchor(Align2::LEFT_TOP, egui::vec2(60.0, 12.0))
        .interactable(false)
        .show(ctx, |ui| {
            let text = RichText::new("The past")
                .font(FontId::proportional(28.0))
                .italics()
                .color(Color32::LIGHT_GRAY);
            ui.label(text);
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_expire() {
        let mut banner = Banner::default();
        assert_eq!(banner.text(), None);
        banner.show("Mission complete!");
        banner.tick(Duration::from_secs(1));
        assert_eq!(banner.text(), Some("Mission complete!"));
        banner.tick(Duration::from_secs(2));
        assert_eq!(banner.text(), None);
    }
}
