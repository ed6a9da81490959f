//! Sprites mirroring the active view's scene, the player and the past-era
//! overlay.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::GameConfig;
use crate::domain::simulation::scene::{EntityId, TextureRef};
use crate::domain::simulation::{Facing, GameSession, SessionEpoch, SessionStep, Tense, View};

const INTRO_BACKGROUND: &str = "images/backgrounds/house_map_present.png";
const ENDING_BACKGROUND: &str = "images/backgrounds/kelly_house.png";
const PLAYER_IMAGE: &str = "images/player.png";

const PLAYER_Z: f32 = 100.0;
const OVERLAY_Z: f32 = 200.0;
const VIGNETTE: f32 = 50.0;

/// Belongs to the view currently shown; despawned when it changes.
#[derive(Component)]
struct ViewSprite;

#[derive(Component)]
struct SceneSprite(EntityId);

#[derive(Component)]
struct PlayerSprite;

#[derive(Component)]
struct PastOverlay;

type LayoutKey = (String, UVec2, u32, u32, u32, u32);

#[derive(Resource, Default)]
struct AtlasLayouts(HashMap<LayoutKey, Handle<TextureAtlasLayout>>);

pub struct WorldViewPlugin;
impl Plugin for WorldViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AtlasLayouts>()
            .add_systems(Startup, spawn_fixtures)
            .add_systems(
                Update,
                (rebuild_view, sync_scene_sprites, sync_player, sync_overlay)
                    .chain()
                    .after(SessionStep),
            );
    }
}

fn spawn_fixtures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    let screen = config.screen();
    commands.spawn((
        SpriteBundle {
            texture: asset_server.load(PLAYER_IMAGE),
            sprite: Sprite {
                custom_size: Some(config.player_half_size() * 2.0),
                ..default()
            },
            transform: Transform::from_xyz(0.0, 0.0, PLAYER_Z),
            ..default()
        },
        PlayerSprite,
    ));

    let tint = Color::srgba(0.5, 0.5, 0.5, 150.0 / 255.0);
    let panes = [
        (screen * 0.5, screen, tint),
        (Vec2::new(screen.x * 0.5, 0.0), Vec2::new(screen.x, VIGNETTE), Color::BLACK),
        (Vec2::new(0.0, screen.y * 0.5), Vec2::new(VIGNETTE, screen.y), Color::BLACK),
        (Vec2::new(screen.x, screen.y * 0.5), Vec2::new(VIGNETTE, screen.y), Color::BLACK),
    ];
    for (i, (pos, size, color)) in panes.into_iter().enumerate() {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(size),
                    ..default()
                },
                transform: Transform::from_xyz(pos.x, pos.y, OVERLAY_Z + i as f32),
                visibility: Visibility::Hidden,
                ..default()
            },
            PastOverlay,
        ));
    }
}

/// Sprite for a texture, plus an atlas cell when the texture is a tileset.
fn textured_sprite(
    texture: &TextureRef,
    pos: Vec2,
    half_size: Vec2,
    z: f32,
    asset_server: &AssetServer,
    layouts: &mut Assets<TextureAtlasLayout>,
    cache: &mut AtlasLayouts,
) -> (SpriteBundle, Option<TextureAtlas>) {
    let bundle = SpriteBundle {
        texture: asset_server.load(texture.image.clone()),
        sprite: Sprite {
            custom_size: Some(half_size * 2.0),
            ..default()
        },
        transform: Transform::from_xyz(pos.x, pos.y, z),
        ..default()
    };
    let atlas = texture.atlas.as_ref().map(|cell| {
        let key = (
            texture.image.clone(),
            cell.tile_size,
            cell.columns,
            cell.rows,
            cell.spacing,
            cell.margin,
        );
        let layout = cache
            .0
            .entry(key)
            .or_insert_with(|| {
                layouts.add(TextureAtlasLayout::from_grid(
                    cell.tile_size,
                    cell.columns,
                    cell.rows,
                    Some(UVec2::splat(cell.spacing)),
                    Some(UVec2::splat(cell.margin)),
                ))
            })
            .clone();
        TextureAtlas {
            layout,
            index: cell.index as usize,
        }
    });
    (bundle, atlas)
}

#[allow(clippy::too_many_arguments)]
fn rebuild_view(
    mut commands: Commands,
    session: Res<GameSession>,
    epoch: Res<SessionEpoch>,
    config: Res<GameConfig>,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut cache: ResMut<AtlasLayouts>,
    old: Query<Entity, With<ViewSprite>>,
    mut shown: Local<Option<(u32, usize)>>,
) {
    let key = (epoch.0, session.current_view());
    if *shown == Some(key) {
        return;
    }
    *shown = Some(key);
    for entity in &old {
        commands.entity(entity).despawn_recursive();
    }

    let background = |image: &str| SpriteBundle {
        texture: asset_server.load(image.to_string()),
        sprite: Sprite {
            custom_size: Some(config.screen()),
            ..default()
        },
        transform: Transform::from_translation((config.screen() * 0.5).extend(0.0)),
        ..default()
    };
    match session.view() {
        View::Intro => {
            commands.spawn((background(INTRO_BACKGROUND), ViewSprite));
        }
        View::Ending => {
            commands.spawn((background(ENDING_BACKGROUND), ViewSprite));
        }
        View::Level(controller) => {
            let scene = controller.scene();
            let mut spawned = 0;
            for piece in &scene.backdrop {
                let Some(texture) = &piece.texture else {
                    continue;
                };
                let (bundle, atlas) = textured_sprite(
                    texture,
                    piece.pos,
                    piece.half_size,
                    piece.depth,
                    &asset_server,
                    &mut layouts,
                    &mut cache,
                );
                let mut e = commands.spawn((bundle, ViewSprite));
                if let Some(atlas) = atlas {
                    e.insert(atlas);
                }
                spawned += 1;
            }
            for (_, group) in scene.groups() {
                for entity in &group.entities {
                    let Some(texture) = &entity.texture else {
                        continue;
                    };
                    let (mut bundle, atlas) = textured_sprite(
                        texture,
                        entity.pos,
                        entity.half_size,
                        group.depth,
                        &asset_server,
                        &mut layouts,
                        &mut cache,
                    );
                    if !(group.visible && entity.visible) {
                        bundle.visibility = Visibility::Hidden;
                    }
                    let mut e = commands.spawn((bundle, ViewSprite, SceneSprite(entity.id)));
                    if let Some(atlas) = atlas {
                        e.insert(atlas);
                    }
                    spawned += 1;
                }
            }
            debug!("{}: spawned {spawned} sprites", controller.level().title);
        }
    }
}

fn sync_scene_sprites(
    mut commands: Commands,
    session: Res<GameSession>,
    mut sprites: Query<(Entity, &SceneSprite, &mut Transform, &mut Visibility)>,
) {
    if !session.is_changed() {
        return;
    }
    let View::Level(controller) = session.view() else {
        return;
    };
    let live: HashMap<EntityId, (Vec2, bool)> = controller
        .scene()
        .groups()
        .flat_map(|(_, g)| {
            g.entities
                .iter()
                .map(move |e| (e.id, (e.pos, g.visible && e.visible)))
        })
        .collect();

    for (entity, SceneSprite(id), mut transform, mut visibility) in &mut sprites {
        match live.get(id) {
            Some((pos, shown)) => {
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
                *visibility = if *shown {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                };
            }
            // Collected.
            None => commands.entity(entity).despawn_recursive(),
        }
    }
}

fn sync_player(
    session: Res<GameSession>,
    mut player: Query<(&mut Transform, &mut Visibility, &mut Sprite), With<PlayerSprite>>,
) {
    let Ok((mut transform, mut visibility, mut sprite)) = player.get_single_mut() else {
        return;
    };
    transform.translation.x = session.player.pos.x;
    transform.translation.y = session.player.pos.y;
    sprite.flip_x = session.player.facing == Facing::Left;
    *visibility = if session.player.visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
}

fn sync_overlay(
    session: Res<GameSession>,
    mut panes: Query<&mut Visibility, With<PastOverlay>>,
) {
    let shown = session.active_tense() == Some(Tense::Past);
    for mut visibility in &mut panes {
        *visibility = if shown {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
