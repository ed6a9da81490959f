mod config;
mod domain;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use config::GameConfig;
use domain::{AppState, InputPlugin, LevelLibrary, SimPlugin, UiPlugin};

fn main() {
    let config = GameConfig::load();
    let library = match LevelLibrary::load(&config) {
        Ok(library) => library,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    App::new()
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: config.window.title.clone(),
                        resolution: WindowResolution::new(config.window.width, config.window.height),
                        resizable: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: config.assets_dir.to_string_lossy().into_owned(),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .init_state::<AppState>()
        .insert_resource(config)
        .insert_resource(library)
        .add_plugins((SimPlugin, UiPlugin, InputPlugin))
        .add_systems(Startup, setup_camera)
        .run();
}

/// The camera looks at the middle of the screen so world coordinates match
/// screen pixels with the origin bottom-left.
fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    let centre = config.screen() * 0.5;
    commands.spawn((
        Camera2dBundle {
            transform: Transform::from_xyz(centre.x, centre.y, 999.0),
            ..default()
        },
        MainCamera,
    ));
}

#[derive(Component)]
pub struct MainCamera;
