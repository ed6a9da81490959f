//! Authoritative game state. Everything below `session` is plain data and
//! logic; this module only moves it through bevy's schedule.

pub mod controller;
pub mod level;
pub mod levels;
pub mod physics;
pub mod player;
pub mod puzzle;
pub mod scene;
pub mod session;
pub mod steering;
pub mod tense;
pub mod tilemap;

use bevy::prelude::*;

pub use controller::Action;
pub use levels::LevelLibrary;
pub use player::Facing;
pub use session::{format_time, GameSession, SessionEvent, View};
pub use steering::Heading;
pub use tense::Tense;

use crate::config::GameConfig;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Playing,
    GameOver,
    Ending,
}

/// Throw the current run away and start over from the intro.
#[derive(Event, Default)]
pub struct ResetEvent;

/// The intro's "Let's go !" button.
#[derive(Event, Default)]
pub struct StartEvent;

/// Session events re-published for audio and presentation.
#[derive(Event, Clone, Copy, Debug)]
pub struct SessionNotice(pub SessionEvent);

/// Bumped whenever a fresh session replaces the old one, so views built
/// from the previous run know to rebuild.
#[derive(Resource, Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct SessionEpoch(pub u32);

/// Systems that advance the session; input must run before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionStep;

pub struct SimPlugin;
impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionEpoch>()
            .add_event::<ResetEvent>()
            .add_event::<StartEvent>()
            .add_event::<SessionNotice>()
            .add_systems(Startup, start_session)
            .add_systems(
                Update,
                (handle_start, advance_session, publish_events)
                    .chain()
                    .in_set(SessionStep)
                    .run_if(in_state(AppState::Playing)),
            )
            .add_systems(Update, handle_reset.after(SessionStep));
    }
}

fn start_session(
    mut commands: Commands,
    config: Res<GameConfig>,
    library: Res<LevelLibrary>,
) {
    info!("starting a session with {} levels", library.len());
    commands.insert_resource(GameSession::new(&config, &library));
}

fn handle_start(mut ev_start: EventReader<StartEvent>, mut session: ResMut<GameSession>) {
    for _ in ev_start.read() {
        session.start();
    }
}

fn advance_session(time: Res<Time>, mut session: ResMut<GameSession>) {
    session.update(time.delta_seconds(), &mut rand::thread_rng());
}

fn publish_events(
    mut session: ResMut<GameSession>,
    mut notices: EventWriter<SessionNotice>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for event in session.drain_events() {
        match event {
            SessionEvent::GameOver => {
                warn!("game over after {}", format_time(session.elapsed()));
                next_state.set(AppState::GameOver);
            }
            SessionEvent::LevelCompleted(index) => {
                info!(
                    "level {index} done, {} items collected",
                    session.items_collected()
                );
            }
            SessionEvent::ViewChanged(_) if session.is_ending() => {
                info!("reached the ending in {}", format_time(session.elapsed()));
                next_state.set(AppState::Ending);
            }
            SessionEvent::ViewChanged(_) | SessionEvent::TenseChanged(_) => {}
        }
        notices.send(SessionNotice(event));
    }
}

fn handle_reset(
    mut ev_reset: EventReader<ResetEvent>,
    mut session: ResMut<GameSession>,
    mut epoch: ResMut<SessionEpoch>,
    mut next_state: ResMut<NextState<AppState>>,
    config: Res<GameConfig>,
    library: Res<LevelLibrary>,
) {
    if ev_reset.is_empty() {
        return;
    }
    ev_reset.clear();
    *session = GameSession::new(&config, &library);
    epoch.0 += 1;
    next_state.set(AppState::Playing);
    info!("restarting (session {})", epoch.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulation::level::LevelConfig;
    use crate::domain::simulation::puzzle::Condition;
    use crate::domain::simulation::level::GroupRule;
    use crate::domain::simulation::scene::{GroupId, Scene};
    use bevy::state::app::StatesPlugin;

    fn app(completion: Condition) -> App {
        app_with(LevelConfig::empty("test", completion), Scene::new(Vec2::new(1040.0, 800.0)))
    }

    fn app_with(level: LevelConfig, scene: Scene) -> App {
        let library = LevelLibrary::from_scenes(vec![(level, scene)]).unwrap();
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppState>()
            .insert_resource(GameConfig::default())
            .insert_resource(library)
            .add_plugins(SimPlugin);
        app.update();
        app
    }

    #[test]
    fn finishing_the_last_level_enters_the_ending() {
        let mut app = app(Condition::Always);
        app.world_mut().send_event(StartEvent);
        app.update();
        app.update();

        let session = app.world().resource::<GameSession>();
        assert!(session.is_ending());
        assert_eq!(session.items_collected(), 1);
        assert_eq!(
            app.world().resource::<State<AppState>>().get(),
            &AppState::Ending
        );
    }

    #[test]
    fn hazards_end_the_run_until_restart() {
        let mut level = LevelConfig::empty("test", Condition::Any(vec![]));
        level.hazards = vec![GroupRule::always(GroupId::PastMonsters)];
        let mut scene = Scene::new(Vec2::new(1040.0, 800.0));
        scene.spawn(GroupId::PastMonsters, Vec2::new(70.0, 280.0), Vec2::splat(16.0), None);
        let mut app = app_with(level, scene);

        app.world_mut().send_event(StartEvent);
        app.update();
        app.update();
        assert_eq!(
            app.world().resource::<State<AppState>>().get(),
            &AppState::GameOver
        );
        let elapsed = app.world().resource::<GameSession>().elapsed();
        app.world_mut()
            .resource_mut::<GameSession>()
            .update(1.0, &mut rand::thread_rng());
        assert_eq!(app.world().resource::<GameSession>().elapsed(), elapsed);

        app.world_mut().send_event(ResetEvent);
        app.update();
        app.update();
        assert_eq!(
            app.world().resource::<State<AppState>>().get(),
            &AppState::Playing
        );
        assert_eq!(app.world().resource::<GameSession>().current_view(), 0);
    }

    #[test]
    fn reset_builds_a_fresh_session() {
        let mut app = app(Condition::Any(vec![]));
        app.world_mut().send_event(StartEvent);
        app.update();
        assert_eq!(app.world().resource::<GameSession>().current_view(), 1);

        app.world_mut().send_event(ResetEvent);
        app.update();
        assert_eq!(app.world().resource::<GameSession>().current_view(), 0);
        assert_eq!(app.world().resource::<SessionEpoch>().0, 1);
    }
}
