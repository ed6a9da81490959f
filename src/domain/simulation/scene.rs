use bevy::prelude::*;
use std::collections::BTreeMap;

/// Every named layer a level may use. Resolved from tile-map layer names at
/// load time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum GroupId {
    Decoration,
    Buildings,
    Road,
    Wall,
    PresentCar,
    PastCar,
    Tool,
    Problem,
    Destination,
    AngryDogs,
    FriendlyDogs,
    YoungDogs,
    Collectables,
    Blocks,
    Invisibles,
    BridgeBlocks,
    DogFood,
    Mail,
    PastMonsters,
    PresentMonsters,
    Flags,
    FlagsPresent,
}

impl GroupId {
    pub const ALL: [GroupId; 22] = [
        GroupId::Decoration,
        GroupId::Buildings,
        GroupId::Road,
        GroupId::Wall,
        GroupId::PresentCar,
        GroupId::PastCar,
        GroupId::Tool,
        GroupId::Problem,
        GroupId::Destination,
        GroupId::AngryDogs,
        GroupId::FriendlyDogs,
        GroupId::YoungDogs,
        GroupId::Collectables,
        GroupId::Blocks,
        GroupId::Invisibles,
        GroupId::BridgeBlocks,
        GroupId::DogFood,
        GroupId::Mail,
        GroupId::PastMonsters,
        GroupId::PresentMonsters,
        GroupId::Flags,
        GroupId::FlagsPresent,
    ];

    /// Layer name as authored in the tile-map files.
    pub fn layer_name(self) -> &'static str {
        match self {
            GroupId::Decoration => "decoration",
            GroupId::Buildings => "immeuble",
            GroupId::Road => "road",
            GroupId::Wall => "wall",
            GroupId::PresentCar => "present_car",
            GroupId::PastCar => "past_car",
            GroupId::Tool => "tool",
            GroupId::Problem => "problem",
            GroupId::Destination => "destination",
            GroupId::AngryDogs => "angry-dogs",
            GroupId::FriendlyDogs => "friendly-dogs",
            GroupId::YoungDogs => "young-dogs",
            GroupId::Collectables => "collectables",
            GroupId::Blocks => "blocks",
            GroupId::Invisibles => "invisibles",
            GroupId::BridgeBlocks => "bridge-blocks",
            GroupId::DogFood => "dog-food",
            GroupId::Mail => "mail",
            GroupId::PastMonsters => "past-monsters",
            GroupId::PresentMonsters => "present-monsters",
            GroupId::Flags => "flags",
            GroupId::FlagsPresent => "flags-present",
        }
    }

    pub fn from_layer_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.layer_name() == name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// One cell of a tileset image laid out as a regular grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasCell {
    pub tile_size: UVec2,
    pub columns: u32,
    pub rows: u32,
    pub spacing: u32,
    pub margin: u32,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureRef {
    /// Path relative to the asset root.
    pub image: String,
    pub atlas: Option<AtlasCell>,
}

impl TextureRef {
    pub fn image(path: impl Into<String>) -> Self {
        Self {
            image: path.into(),
            atlas: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEntity {
    pub id: EntityId,
    pub pos: Vec2,
    pub half_size: Vec2,
    pub visible: bool,
    pub texture: Option<TextureRef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub visible: bool,
    /// Draw order, taken from the layer order in the map file.
    pub depth: f32,
    pub entities: Vec<SceneEntity>,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            visible: true,
            depth: 0.0,
            entities: Vec::new(),
        }
    }
}

/// Non-interactive scenery drawn under the named groups.
#[derive(Clone, Debug, PartialEq)]
pub struct Backdrop {
    pub pos: Vec2,
    pub half_size: Vec2,
    pub depth: f32,
    pub texture: Option<TextureRef>,
}

/// Strict axis-aligned overlap; touching edges do not count.
pub fn overlaps(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    let d = (a_pos - b_pos).abs();
    d.x < a_half.x + b_half.x && d.y < a_half.y + b_half.y
}

/// Named groups of positioned entities making up one level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    groups: BTreeMap<GroupId, Group>,
    pub backdrop: Vec<Backdrop>,
    /// Pixel extent of the map, origin bottom-left.
    pub size: Vec2,
    next_id: u32,
}

impl Scene {
    pub fn new(size: Vec2) -> Self {
        Self {
            groups: BTreeMap::new(),
            backdrop: Vec::new(),
            size,
            next_id: 0,
        }
    }

    pub fn ensure_group(&mut self, group: GroupId) -> &mut Group {
        self.groups.entry(group).or_default()
    }

    pub fn has_group(&self, group: GroupId) -> bool {
        self.groups.contains_key(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter().map(|(id, g)| (*id, g))
    }

    pub fn spawn(
        &mut self,
        group: GroupId,
        pos: Vec2,
        half_size: Vec2,
        texture: Option<TextureRef>,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.ensure_group(group).entities.push(SceneEntity {
            id,
            pos,
            half_size,
            visible: true,
            texture,
        });
        id
    }

    pub fn entities(&self, group: GroupId) -> &[SceneEntity] {
        self.groups
            .get(&group)
            .map(|g| g.entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn entities_mut(&mut self, group: GroupId) -> &mut [SceneEntity] {
        self.groups
            .get_mut(&group)
            .map(|g| g.entities.as_mut_slice())
            .unwrap_or(&mut [])
    }

    pub fn entity_mut(&mut self, group: GroupId, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities_mut(group).iter_mut().find(|e| e.id == id)
    }

    pub fn remove(&mut self, group: GroupId, id: EntityId) -> Option<SceneEntity> {
        let g = self.groups.get_mut(&group)?;
        let idx = g.entities.iter().position(|e| e.id == id)?;
        Some(g.entities.remove(idx))
    }

    pub fn is_visible(&self, group: GroupId) -> bool {
        self.groups.get(&group).is_some_and(|g| g.visible)
    }

    pub fn set_visible(&mut self, group: GroupId, visible: bool) {
        if let Some(g) = self.groups.get_mut(&group) {
            g.visible = visible;
        }
    }

    /// First entity of `group` overlapping the given box.
    pub fn first_overlap(&self, group: GroupId, pos: Vec2, half_size: Vec2) -> Option<EntityId> {
        self.entities(group)
            .iter()
            .find(|e| overlaps(e.pos, e.half_size, pos, half_size))
            .map(|e| e.id)
    }

    /// First entity of `group` whose centre is strictly closer than
    /// `radius` to any of the anchors.
    pub fn first_within(&self, group: GroupId, anchors: &[Vec2], radius: f32) -> Option<EntityId> {
        self.entities(group)
            .iter()
            .find(|e| anchors.iter().any(|a| e.pos.distance(*a) < radius))
            .map(|e| e.id)
    }
}
