//! Data-driven description of one level: which groups show and block in
//! each era, what the interact key does, what moves on its own and what
//! ends the level.

use bevy::prelude::*;

use super::puzzle::{Condition, Counter};
use super::scene::GroupId;

/// What an interaction measures distance from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Player,
    /// Any entity of the group, e.g. food brought close to a dog.
    Group(GroupId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Remove the entity and bump the counter.
    Collect(Counter),
    /// Bump the counter, leave the entity in place.
    Trigger(Counter),
    /// Hide the player inside the vehicle and start driving.
    Ride,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionRule {
    pub group: GroupId,
    pub when: Condition,
    pub anchor: Anchor,
    pub radius: f32,
    pub effect: Effect,
}

/// Gates a group's visibility or its presence in the wall set.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRule {
    pub group: GroupId,
    pub when: Condition,
}

impl GroupRule {
    pub fn new(group: GroupId, when: Condition) -> Self {
        Self { group, when }
    }

    pub fn always(group: GroupId) -> Self {
        Self::new(group, Condition::Always)
    }
}

/// Entities that walk straight at the player once it is within `radius`.
#[derive(Clone, Debug, PartialEq)]
pub struct PursuerRule {
    pub group: GroupId,
    pub when: Condition,
    pub radius: f32,
    pub speed: f32,
}

/// Entities that random-walk around their spawn point.
#[derive(Clone, Debug, PartialEq)]
pub struct WanderRule {
    pub group: GroupId,
    pub when: Condition,
    pub speed: f32,
    pub leash: f32,
}

/// Entities picked up by walking into them.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactRule {
    pub group: GroupId,
    pub when: Condition,
    pub counter: Counter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleRule {
    pub vehicle: GroupId,
    pub destination: GroupId,
    pub speed: f32,
    pub arrived: Counter,
}

/// Sprites added on top of the tile map at fixed positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub group: GroupId,
    pub image: &'static str,
    pub size: Vec2,
    pub positions: Vec<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    pub title: &'static str,
    pub briefing: &'static [&'static str],
    /// Asset-relative path of the Tiled JSON map.
    pub map_path: &'static str,
    pub tile_scaling: f32,
    pub placements: Vec<Placement>,
    pub visibility: Vec<GroupRule>,
    pub walls: Vec<GroupRule>,
    pub interactions: Vec<InteractionRule>,
    pub pursuers: Vec<PursuerRule>,
    pub wanderers: Vec<WanderRule>,
    pub contacts: Vec<ContactRule>,
    pub hazards: Vec<GroupRule>,
    pub vehicle: Option<VehicleRule>,
    pub completion: Condition,
}

impl LevelConfig {
    /// A level with no rules; completes only if `completion` says so.
    pub fn empty(title: &'static str, completion: Condition) -> Self {
        Self {
            title,
            briefing: &[],
            map_path: "",
            tile_scaling: 1.0,
            placements: Vec::new(),
            visibility: Vec::new(),
            walls: Vec::new(),
            interactions: Vec::new(),
            pursuers: Vec::new(),
            wanderers: Vec::new(),
            contacts: Vec::new(),
            hazards: Vec::new(),
            vehicle: None,
            completion,
        }
    }

    /// Groups the tile map itself must provide.
    pub fn required_groups(&self) -> Vec<GroupId> {
        let placed: Vec<GroupId> = self.placements.iter().map(|p| p.group).collect();
        let mut groups: Vec<GroupId> = self
            .visibility
            .iter()
            .chain(&self.walls)
            .chain(&self.hazards)
            .map(|r| r.group)
            .chain(self.interactions.iter().flat_map(|r| {
                let anchor = match r.anchor {
                    Anchor::Group(g) => Some(g),
                    Anchor::Player => None,
                };
                std::iter::once(r.group).chain(anchor)
            }))
            .chain(self.pursuers.iter().map(|r| r.group))
            .chain(self.wanderers.iter().map(|r| r.group))
            .chain(self.contacts.iter().map(|r| r.group))
            .chain(
                self.vehicle
                    .iter()
                    .flat_map(|v| [v.vehicle, v.destination]),
            )
            .filter(|g| !placed.contains(g))
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placed_groups_are_not_required_from_the_map() {
        let mut level = LevelConfig::empty("test", Condition::Always);
        level.placements.push(Placement {
            group: GroupId::DogFood,
            image: "food.png",
            size: Vec2::splat(8.0),
            positions: vec![Vec2::ZERO],
        });
        level.interactions.push(InteractionRule {
            group: GroupId::DogFood,
            when: Condition::Always,
            anchor: Anchor::Group(GroupId::YoungDogs),
            radius: 10.0,
            effect: Effect::Collect(Counter::DogsFed),
        });
        level.walls.push(GroupRule::always(GroupId::Blocks));
        level.hazards.push(GroupRule::always(GroupId::Blocks));

        assert_eq!(
            level.required_groups(),
            vec![GroupId::YoungDogs, GroupId::Blocks]
        );
    }
}
