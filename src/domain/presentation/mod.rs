mod music;
mod panels;
mod world_view;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin};

use crate::config::GameConfig;
use crate::domain::simulation::{
    AppState, GameSession, ResetEvent, SessionEvent, SessionNotice, StartEvent, View,
};
use panels::banners::{show_banners, Banner};
use panels::ending_panel::show_ending_panel;
use panels::game_over_panel::show_game_over_panel;
use panels::hud_panel::show_hud_panel;
use panels::intro_panel::show_intro_panel;
use panels::mission_panel::show_mission_panel;

pub use music::MusicPlugin;
pub use world_view::WorldViewPlugin;

/// The briefing hides once the player walks into the top of the screen.
const BRIEFING_CLEARANCE: f32 = 300.0;

#[derive(Resource)]
pub struct HudSettings {
    pub show_help: bool,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self { show_help: true }
    }
}

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_plugins((WorldViewPlugin, MusicPlugin))
            .init_resource::<HudSettings>()
            .init_resource::<Banner>()
            .add_systems(Update, (collect_banners, play_ui).chain().run_if(in_state(AppState::Playing)))
            .add_systems(Update, game_over_ui.run_if(in_state(AppState::GameOver)))
            .add_systems(Update, ending_ui.run_if(in_state(AppState::Ending)));
    }
}

fn collect_banners(
    mut notices: EventReader<SessionNotice>,
    mut banner: ResMut<Banner>,
    time: Res<Time>,
) {
    for SessionNotice(event) in notices.read() {
        if let SessionEvent::LevelCompleted(_) = event {
            banner.show("Mission complete!");
        }
    }
    banner.tick(time.delta());
}

fn play_ui(
    mut contexts: EguiContexts,
    session: Res<GameSession>,
    hud: Res<HudSettings>,
    banner: Res<Banner>,
    config: Res<GameConfig>,
    mut ev_start: EventWriter<StartEvent>,
) {
    let ctx = contexts.ctx_mut();
    show_hud_panel(ctx, &session, &hud);
    match session.view() {
        View::Intro => show_intro_panel(ctx, &mut ev_start),
        View::Level(controller) => {
            if session.player.pos.y < config.window.height - BRIEFING_CLEARANCE {
                show_mission_panel(ctx, controller.level());
            }
        }
        View::Ending => {}
    }
    show_banners(ctx, &banner, session.active_tense());
}

fn game_over_ui(
    mut contexts: EguiContexts,
    mut ev_reset: EventWriter<ResetEvent>,
    mut ev_exit: EventWriter<AppExit>,
) {
    show_game_over_panel(contexts.ctx_mut(), &mut ev_reset, &mut ev_exit);
}

fn ending_ui(
    mut contexts: EguiContexts,
    session: Res<GameSession>,
    mut ev_reset: EventWriter<ResetEvent>,
    mut ev_exit: EventWriter<AppExit>,
) {
    let ctx = contexts.ctx_mut();
    show_hud_panel(ctx, &session, &HudSettings { show_help: false });
    show_ending_panel(ctx, &mut ev_reset, &mut ev_exit);
}
