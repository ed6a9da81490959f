//! The three playable levels and the library of their loaded scenes.

use bevy::prelude::*;

use super::controller::MapController;
use super::level::{
    Anchor, ContactRule, Effect, GroupRule, InteractionRule, LevelConfig, Placement, PursuerRule,
    VehicleRule, WanderRule,
};
use super::puzzle::{Condition, Counter};
use super::scene::{GroupId, Scene, TextureRef};
use super::tense::Tense;
use super::tilemap::{load_scene, MapError};
use crate::config::GameConfig;

/// How many dogs must be fed, and flags picked up in each era.
pub const DOGS_TO_FEED: u32 = 4;
pub const FLAGS_PER_ERA: u32 = 4;
pub const WOOD_FOR_BRIDGE: u32 = 4;

const CITY_BRIEFING: &[&str] = &[
    "Reconnect with your friend by rejoining the weekly drawing class you both loved.",
    "You missed the chance before due to your car breaking down.",
    "But now, with a second chance, go back to the past, get the item to repair the car \
     and come back to the present, so you can drive it.",
];

const FOREST_BRIEFING: &[&str] = &[
    "Your past laziness and irresponsibility led to broken promises and lost trust.",
    "Now, it's your chance to fix what you've done, take responsibility, rebuild trust, \
     and save your friendship.",
    "The dogs attacked, and your friend left because of your carelessness.",
];

const WINTER_BRIEFING: &[&str] = &[
    "You were afraid of the monsters and hesitated to collect the red flags with your friend. \
     Your reluctance and tendency to give up led your friend to leave, feeling let down.",
    "Though the fear of those monsters still lingers, you're now determined.",
    "To make things right, go back to the past, confront your fears, collect the red flags \
     and return to the present to collect them to win.",
];

fn present() -> Condition {
    Condition::In(Tense::Present)
}

fn past() -> Condition {
    Condition::In(Tense::Past)
}

pub fn city(cfg: &GameConfig) -> LevelConfig {
    let reach = cfg.collect_radius();
    let mut level = LevelConfig::empty("City Mission", Condition::AtLeast(Counter::Arrived, 1));
    level.briefing = CITY_BRIEFING;
    level.map_path = "maps/city/City.json";
    level.tile_scaling = cfg.tiles.scaling;

    level.visibility = vec![
        GroupRule::new(GroupId::Tool, past()),
        GroupRule::new(GroupId::PastCar, past()),
        GroupRule::new(GroupId::PresentCar, present()),
    ];
    level.walls = vec![
        GroupRule::always(GroupId::Decoration),
        GroupRule::always(GroupId::Buildings),
        GroupRule::always(GroupId::Road),
        GroupRule::always(GroupId::Wall),
        GroupRule::new(GroupId::PresentCar, present()),
        GroupRule::new(GroupId::PastCar, past()),
    ];
    level.interactions = vec![
        InteractionRule {
            group: GroupId::Tool,
            when: past(),
            anchor: Anchor::Player,
            radius: reach,
            effect: Effect::Collect(Counter::Tool),
        },
        InteractionRule {
            group: GroupId::Problem,
            when: Condition::past_and(Condition::AtLeast(Counter::Tool, 1)),
            anchor: Anchor::Player,
            radius: reach,
            effect: Effect::Collect(Counter::CarRepaired),
        },
        InteractionRule {
            group: GroupId::PresentCar,
            when: Condition::present_and(Condition::All(vec![
                Condition::AtLeast(Counter::CarRepaired, 1),
                Condition::Below(Counter::Driving, 1),
            ])),
            anchor: Anchor::Player,
            radius: reach,
            effect: Effect::Ride,
        },
    ];
    level.vehicle = Some(VehicleRule {
        vehicle: GroupId::PresentCar,
        destination: GroupId::Destination,
        speed: cfg.movement.player_speed * cfg.interaction.vehicle_speed_factor,
        arrived: Counter::Arrived,
    });
    level
}

pub fn forest(cfg: &GameConfig) -> LevelConfig {
    let reach = cfg.collect_radius();
    let tile = cfg.scaled_tile();
    let unfed = Condition::Below(Counter::DogsFed, DOGS_TO_FEED);
    let fed = Condition::AtLeast(Counter::DogsFed, DOGS_TO_FEED);
    let bridge = Condition::AtLeast(Counter::BridgeBuilt, 1);
    let no_bridge = Condition::Below(Counter::BridgeBuilt, 1);

    let mut level = LevelConfig::empty("Forest Mission", fed.clone());
    level.briefing = FOREST_BRIEFING;
    level.map_path = "maps/forest/test-map.json";
    level.tile_scaling = cfg.tiles.scaling;

    level.placements = vec![
        Placement {
            group: GroupId::Mail,
            image: "maps/raw/mail.png",
            size: Vec2::splat(48.0),
            positions: vec![Vec2::new(75.0, 35.0) * cfg.tiles.size],
        },
        Placement {
            group: GroupId::DogFood,
            image: "maps/raw/dog-food.png",
            size: Vec2::splat(24.0),
            positions: (0..5)
                .map(|i| Vec2::new(i as f32 * 3.0 * tile + tile * 15.0, tile * 5.0))
                .collect(),
        },
    ];
    level.visibility = vec![
        GroupRule::new(GroupId::AngryDogs, Condition::present_and(unfed.clone())),
        GroupRule::new(GroupId::FriendlyDogs, Condition::present_and(fed.clone())),
        GroupRule::new(GroupId::YoungDogs, past()),
        GroupRule::new(
            GroupId::Invisibles,
            Condition::Any(vec![present(), bridge.clone()]),
        ),
        GroupRule::new(GroupId::BridgeBlocks, Condition::past_and(no_bridge.clone())),
        GroupRule::new(GroupId::DogFood, Condition::past_and(bridge.clone())),
        GroupRule::new(GroupId::Mail, fed.clone()),
    ];
    level.walls = vec![
        GroupRule::always(GroupId::Collectables),
        GroupRule::always(GroupId::Blocks),
        GroupRule::new(GroupId::AngryDogs, Condition::present_and(unfed.clone())),
        GroupRule::new(GroupId::FriendlyDogs, Condition::present_and(fed)),
        GroupRule::new(GroupId::YoungDogs, past()),
        GroupRule::new(GroupId::BridgeBlocks, Condition::past_and(no_bridge.clone())),
    ];
    level.interactions = vec![
        InteractionRule {
            group: GroupId::Invisibles,
            when: Condition::past_and(Condition::All(vec![
                Condition::AtLeast(Counter::Wood, WOOD_FOR_BRIDGE),
                no_bridge,
            ])),
            anchor: Anchor::Player,
            radius: reach,
            effect: Effect::Trigger(Counter::BridgeBuilt),
        },
        InteractionRule {
            group: GroupId::Collectables,
            when: Condition::Always,
            anchor: Anchor::Player,
            radius: reach,
            effect: Effect::Collect(Counter::Wood),
        },
        InteractionRule {
            group: GroupId::DogFood,
            when: Condition::past_and(bridge.clone()),
            anchor: Anchor::Group(GroupId::YoungDogs),
            radius: reach * 3.0,
            effect: Effect::Collect(Counter::DogsFed),
        },
    ];
    level.pursuers = vec![
        PursuerRule {
            group: GroupId::AngryDogs,
            when: Condition::present_and(unfed.clone()),
            radius: cfg.chase_radius(),
            speed: cfg.interaction.chase_speed,
        },
        PursuerRule {
            group: GroupId::DogFood,
            when: Condition::past_and(bridge),
            radius: tile * 2.0,
            speed: cfg.movement.player_speed * 2.0,
        },
    ];
    level.hazards = vec![GroupRule::new(
        GroupId::AngryDogs,
        Condition::present_and(unfed),
    )];
    level
}

pub fn winter(cfg: &GameConfig) -> LevelConfig {
    let enough_past = Condition::AtLeast(Counter::FlagsPast, FLAGS_PER_ERA);
    let few_past = Condition::Below(Counter::FlagsPast, FLAGS_PER_ERA);

    let mut level = LevelConfig::empty(
        "Ski Mission",
        Condition::present_and(Condition::AtLeast(Counter::FlagsPresent, FLAGS_PER_ERA)),
    );
    level.briefing = WINTER_BRIEFING;
    level.map_path = "maps/ski/ski.json";
    level.tile_scaling = cfg.tiles.scaling;

    level.visibility = vec![
        GroupRule::new(GroupId::PastMonsters, past()),
        GroupRule::new(GroupId::PresentMonsters, Condition::present_and(few_past.clone())),
        GroupRule::new(GroupId::Flags, past()),
        GroupRule::new(GroupId::FlagsPresent, Condition::present_and(enough_past.clone())),
    ];
    level.walls = vec![GroupRule::always(GroupId::Decoration)];
    level.wanderers = vec![WanderRule {
        group: GroupId::PastMonsters,
        when: Condition::Always,
        speed: cfg.interaction.wander_speed,
        leash: cfg.scaled_tile() * cfg.interaction.wander_leash_tiles,
    }];
    level.contacts = vec![
        ContactRule {
            group: GroupId::Flags,
            when: past(),
            counter: Counter::FlagsPast,
        },
        ContactRule {
            group: GroupId::FlagsPresent,
            when: Condition::present_and(enough_past),
            counter: Counter::FlagsPresent,
        },
    ];
    level.hazards = vec![
        GroupRule::new(GroupId::PastMonsters, past()),
        GroupRule::new(GroupId::PresentMonsters, Condition::present_and(few_past)),
    ];
    level
}

pub fn catalogue(cfg: &GameConfig) -> Vec<LevelConfig> {
    vec![city(cfg), forest(cfg), winter(cfg)]
}

/// Checks that the map provides every group the level relies on, then adds
/// the level's placed sprites above the map layers.
pub fn prepare_scene(level: &LevelConfig, mut scene: Scene) -> Result<Scene, MapError> {
    if let Some(missing) = level
        .required_groups()
        .into_iter()
        .find(|g| !scene.has_group(*g))
    {
        return Err(MapError::MissingGroup {
            map: level.map_path.to_string(),
            layer: missing.layer_name(),
        });
    }

    let top = scene.groups().map(|(_, g)| g.depth).fold(0.0, f32::max);
    for (i, placement) in level.placements.iter().enumerate() {
        scene.ensure_group(placement.group).depth = top + 1.0 + i as f32;
        for pos in &placement.positions {
            scene.spawn(
                placement.group,
                *pos,
                placement.size * 0.5,
                Some(TextureRef::image(placement.image)),
            );
        }
    }
    Ok(scene)
}

/// Pristine copies of every level's scene. Each new session clones them so
/// a restart starts from the state on disk without reloading.
#[derive(Resource, Clone, Debug, Default)]
pub struct LevelLibrary {
    levels: Vec<(LevelConfig, Scene)>,
}

impl LevelLibrary {
    pub fn load(cfg: &GameConfig) -> Result<Self, MapError> {
        let levels = catalogue(cfg)
            .into_iter()
            .map(|level| {
                let scene = load_scene(&cfg.assets_dir, level.map_path, level.tile_scaling)?;
                let scene = prepare_scene(&level, scene)?;
                info!(
                    "loaded {} ({} groups)",
                    level.map_path,
                    scene.groups().count()
                );
                Ok((level, scene))
            })
            .collect::<Result<Vec<_>, MapError>>()?;
        Ok(Self { levels })
    }

    pub fn from_scenes(pairs: Vec<(LevelConfig, Scene)>) -> Result<Self, MapError> {
        let levels = pairs
            .into_iter()
            .map(|(level, scene)| prepare_scene(&level, scene).map(|s| (level, s)))
            .collect::<Result<Vec<_>, MapError>>()?;
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn controllers(&self) -> Vec<MapController> {
        self.levels
            .iter()
            .map(|(level, scene)| MapController::new(level.clone(), scene.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_layers_fail_the_load() {
        let cfg = GameConfig::default();
        let mut scene = Scene::new(Vec2::splat(640.0));
        scene.ensure_group(GroupId::Decoration);

        let err = prepare_scene(&winter(&cfg), scene).unwrap_err();
        match err {
            MapError::MissingGroup { map, layer } => {
                assert_eq!(map, "maps/ski/ski.json");
                assert!(GroupId::from_layer_name(layer).is_some());
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn forest_food_and_mail_are_placed_on_top() {
        let cfg = GameConfig::default();
        let level = forest(&cfg);
        let mut scene = Scene::new(Vec2::splat(3000.0));
        for g in level.required_groups() {
            scene.ensure_group(g).depth = 3.0;
        }

        let scene = prepare_scene(&level, scene).unwrap();
        let food: Vec<Vec2> = scene
            .entities(GroupId::DogFood)
            .iter()
            .map(|e| e.pos)
            .collect();
        assert_eq!(food.len(), 5);
        assert_eq!(food[0], Vec2::new(480.0, 160.0));
        assert_eq!(food[4], Vec2::new(864.0, 160.0));
        assert_eq!(
            scene.entities(GroupId::Mail)[0].pos,
            Vec2::new(1200.0, 560.0)
        );
        let depth = |g| scene.groups().find(|(id, _)| *id == g).unwrap().1.depth;
        assert!(depth(GroupId::DogFood) > 3.0);
        assert!(depth(GroupId::Mail) > 3.0);
    }

    #[test]
    fn city_car_drives_five_times_faster_than_walking() {
        let cfg = GameConfig::default();
        let vehicle = city(&cfg).vehicle.unwrap();
        assert_eq!(vehicle.speed, 1500.0);
        assert_eq!(vehicle.destination, GroupId::Destination);
    }
}
