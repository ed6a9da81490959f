use bevy::audio::Volume;
use bevy::prelude::*;

use crate::config::GameConfig;
use crate::domain::simulation::{GameSession, SessionStep, Tense, View};

const INTRO_TRACK: &str = "sounds/intro.mp3";
const PRESENT_TRACK: &str = "sounds/present.mp3";
const PAST_TRACK: &str = "sounds/passe.mp3";

#[derive(Component)]
struct Music;

pub struct MusicPlugin;
impl Plugin for MusicPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, switch_music.after(SessionStep));
    }
}

/// Track that should be looping for `view`. The ending keeps whatever was
/// already playing.
fn track_for(view: &View, playing: Option<&'static str>) -> Option<&'static str> {
    match view {
        View::Intro => Some(INTRO_TRACK),
        View::Level(controller) => Some(match controller.tense() {
            Tense::Present => PRESENT_TRACK,
            Tense::Past => PAST_TRACK,
        }),
        View::Ending => playing,
    }
}

fn switch_music(
    mut commands: Commands,
    session: Res<GameSession>,
    config: Res<GameConfig>,
    asset_server: Res<AssetServer>,
    players: Query<Entity, With<Music>>,
    mut playing: Local<Option<&'static str>>,
) {
    if !config.audio.enabled {
        return;
    }
    let wanted = track_for(session.view(), *playing);
    if wanted == *playing {
        return;
    }
    for entity in &players {
        commands.entity(entity).despawn_recursive();
    }
    *playing = wanted;
    if let Some(track) = wanted {
        debug!("music: {track}");
        commands.spawn((
            AudioBundle {
                source: asset_server.load(track),
                settings: PlaybackSettings::LOOP.with_volume(Volume::new(config.audio.volume)),
            },
            Music,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulation::controller::MapController;
    use crate::domain::simulation::level::LevelConfig;
    use crate::domain::simulation::puzzle::Condition;
    use crate::domain::simulation::scene::Scene;

    #[test]
    fn tracks_follow_the_era() {
        let mut level = View::Level(MapController::new(
            LevelConfig::empty("test", Condition::Always),
            Scene::default(),
        ));
        assert_eq!(track_for(&View::Intro, None), Some(INTRO_TRACK));
        assert_eq!(track_for(&level, Some(INTRO_TRACK)), Some(PRESENT_TRACK));
        if let View::Level(controller) = &mut level {
            controller.toggle_tense();
        }
        assert_eq!(track_for(&level, None), Some(PAST_TRACK));
        assert_eq!(track_for(&View::Ending, Some(PAST_TRACK)), Some(PAST_TRACK));
    }
}
