use crate::domain::presentation::HudSettings;
use crate::domain::simulation::{Action, AppState, GameSession, Heading, SessionStep};
use bevy::prelude::*;

#[derive(Resource)]
pub struct Keybinds {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub toggle_tense: KeyCode,
    pub interact: KeyCode,
    pub help: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            up: KeyCode::ArrowUp,
            down: KeyCode::ArrowDown,
            left: KeyCode::ArrowLeft,
            right: KeyCode::ArrowRight,
            toggle_tense: KeyCode::Space,
            interact: KeyCode::Enter,
            help: KeyCode::KeyH,
        }
    }
}

impl Keybinds {
    pub fn actions(&self) -> [(KeyCode, Action); 6] {
        [
            (self.up, Action::Move(Heading::Up)),
            (self.down, Action::Move(Heading::Down)),
            (self.left, Action::Move(Heading::Left)),
            (self.right, Action::Move(Heading::Right)),
            (self.toggle_tense, Action::ToggleTense),
            (self.interact, Action::Interact),
        ]
    }
}

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Keybinds>()
            .add_systems(
                Update,
                keyboard_actions
                    .before(SessionStep)
                    .run_if(in_state(AppState::Playing)),
            )
            .add_systems(Update, help_toggle);
    }
}

fn keyboard_actions(
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    mut session: ResMut<GameSession>,
) {
    for (key, action) in keybinds.actions() {
        if keys.just_pressed(key) {
            session.on_key(action);
        }
        if keys.just_released(key) {
            session.on_key_up(action);
        }
    }
}

fn help_toggle(
    mut hud: ResMut<HudSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
) {
    if keys.just_pressed(keybinds.help) {
        hud.show_help = !hud.show_help;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::simulation::level::LevelConfig;
    use crate::domain::simulation::puzzle::Condition;
    use crate::domain::simulation::scene::Scene;
    use crate::domain::simulation::{LevelLibrary, Tense};

    fn app() -> App {
        let library = LevelLibrary::from_scenes(vec![(
            LevelConfig::empty("test", Condition::Any(vec![])),
            Scene::new(Vec2::new(1040.0, 800.0)),
        )])
        .unwrap();
        let mut session = GameSession::new(&GameConfig::default(), &library);
        session.start();

        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<Keybinds>()
            .insert_resource(session)
            .add_systems(Update, keyboard_actions);
        app
    }

    #[test]
    fn space_switches_the_era() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Space);
        app.update();
        assert_eq!(
            app.world().resource::<GameSession>().active_tense(),
            Some(Tense::Past)
        );
    }

    #[test]
    fn arrows_set_and_clear_velocity() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::ArrowLeft);
        app.update();
        assert!(app.world().resource::<GameSession>().player.vel.x < 0.0);

        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.clear();
            keys.release(KeyCode::ArrowLeft);
        }
        app.update();
        assert_eq!(app.world().resource::<GameSession>().player.vel.x, 0.0);
    }
}
