//! One generic controller drives every level; the differences between
//! levels live entirely in their [`LevelConfig`].

use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;

use super::level::{Anchor, Effect, LevelConfig};
use super::physics::move_and_collide;
use super::player::Player;
use super::puzzle::{Counter, PuzzleState};
use super::scene::{overlaps, EntityId, GroupId, Scene};
use super::steering::{chase_step, Heading, Wanderer};
use super::tense::Tense;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Heading),
    ToggleTense,
    Interact,
}

/// Outcome of one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MapEvent {
    None,
    GameOver,
    Completed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapController {
    level: LevelConfig,
    scene: Scene,
    tense: Tense,
    puzzle: PuzzleState,
    walls: Vec<GroupId>,
    wanderers: HashMap<EntityId, Wanderer>,
    /// Direction key held while riding.
    held: Option<Heading>,
    completed: bool,
}

impl MapController {
    pub fn new(level: LevelConfig, scene: Scene) -> Self {
        let mut controller = Self {
            level,
            scene,
            tense: Tense::default(),
            puzzle: PuzzleState::default(),
            walls: Vec::new(),
            wanderers: HashMap::new(),
            held: None,
            completed: false,
        };
        controller.refresh();
        controller
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tense(&self) -> Tense {
        self.tense
    }

    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    /// Groups the player currently collides with.
    pub fn walls(&self) -> &[GroupId] {
        &self.walls
    }

    /// In the vehicle and not yet at its destination. Once it has arrived
    /// the player is back on foot for good.
    pub fn is_riding(&self) -> bool {
        self.level.vehicle.is_some_and(|rule| {
            self.puzzle.is_set(Counter::Driving) && !self.puzzle.is_set(rule.arrived)
        })
    }

    pub fn enter(&mut self, player: &mut Player) {
        self.held = None;
        self.refresh();
        player.visible = !self.is_riding();
    }

    pub fn on_input(&mut self, action: Action, player: &mut Player) {
        let riding = self.is_riding();
        match action {
            Action::Move(heading) if riding => self.held = Some(heading),
            Action::ToggleTense if !riding => self.toggle_tense(),
            Action::Interact if !riding => {
                self.interact(player);
            }
            _ => {}
        }
    }

    pub fn on_release(&mut self, action: Action) {
        if let Action::Move(heading) = action {
            if self.held == Some(heading) {
                self.held = None;
            }
        }
    }

    pub fn toggle_tense(&mut self) {
        self.tense = self.tense.toggled();
        self.refresh();
        debug!("{}: now in the {}", self.level.title, self.tense.label());
    }

    /// Applies every interaction rule that has an entity in range, at most
    /// one entity per rule. Returns how many effects fired.
    pub fn interact(&mut self, player: &mut Player) -> usize {
        let mut applied = 0;
        for rule in &self.level.interactions {
            if !rule.when.holds(self.tense, &self.puzzle) {
                continue;
            }
            let anchors: Vec<Vec2> = match rule.anchor {
                Anchor::Player => vec![player.pos],
                Anchor::Group(g) => self.scene.entities(g).iter().map(|e| e.pos).collect(),
            };
            let Some(id) = self.scene.first_within(rule.group, &anchors, rule.radius) else {
                continue;
            };
            match rule.effect {
                Effect::Collect(counter) => {
                    self.scene.remove(rule.group, id);
                    self.puzzle.bump(counter);
                }
                Effect::Trigger(counter) => {
                    self.puzzle.bump(counter);
                }
                Effect::Ride => {
                    self.puzzle.bump(Counter::Driving);
                    player.visible = false;
                }
            }
            info!(
                "{}: {:?} on {}",
                self.level.title,
                rule.effect,
                rule.group.layer_name()
            );
            applied += 1;
        }
        if applied > 0 {
            self.refresh();
        }
        applied
    }

    /// Advances the level by `dt` seconds. `displacement` is the player's
    /// intended move this frame, resolved here against the wall set.
    pub fn tick<R: Rng>(
        &mut self,
        dt: f32,
        player: &mut Player,
        displacement: Vec2,
        rng: &mut R,
    ) -> MapEvent {
        self.chase(dt, player.pos);
        self.wander(dt, rng);
        if self.drive(dt) {
            player.visible = true;
        }

        if player.visible {
            player.pos = move_and_collide(
                player.pos,
                player.half_size,
                displacement,
                &self.scene,
                &self.walls,
            );
            self.pick_up(player);

            let hit = self.level.hazards.iter().find(|rule| {
                rule.when.holds(self.tense, &self.puzzle)
                    && self
                        .scene
                        .first_overlap(rule.group, player.pos, player.half_size)
                        .is_some()
            });
            if let Some(rule) = hit {
                info!("{}: caught by {}", self.level.title, rule.group.layer_name());
                return MapEvent::GameOver;
            }
        }

        if !self.completed && self.level.completion.holds(self.tense, &self.puzzle) {
            self.completed = true;
            info!("{} complete", self.level.title);
            return MapEvent::Completed;
        }
        MapEvent::None
    }

    fn refresh(&mut self) {
        for rule in &self.level.visibility {
            self.scene
                .set_visible(rule.group, rule.when.holds(self.tense, &self.puzzle));
        }
        self.walls = self
            .level
            .walls
            .iter()
            .filter(|rule| rule.when.holds(self.tense, &self.puzzle))
            .map(|rule| rule.group)
            .collect();
    }

    fn chase(&mut self, dt: f32, target: Vec2) {
        for rule in &self.level.pursuers {
            if !rule.when.holds(self.tense, &self.puzzle) {
                continue;
            }
            for e in self.scene.entities_mut(rule.group) {
                let distance = e.pos.distance(target);
                if distance < rule.radius {
                    // Never overshoot, or fast followers jitter around the player.
                    e.pos = chase_step(e.pos, target, (rule.speed * dt).min(distance));
                }
            }
        }
    }

    fn wander<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        let bounds = self.scene.size;
        for rule in &self.level.wanderers {
            if !rule.when.holds(self.tense, &self.puzzle) {
                continue;
            }
            let walls: Vec<(Vec2, Vec2)> = self
                .walls
                .iter()
                .flat_map(|g| self.scene.entities(*g))
                .map(|w| (w.pos, w.half_size))
                .collect();
            let step = rule.speed * dt;
            for e in self.scene.entities_mut(rule.group) {
                let (pos, half) = (e.pos, e.half_size);
                let wanderer = self
                    .wanderers
                    .entry(e.id)
                    .or_insert_with(|| Wanderer::new(pos, rng));
                e.pos = wanderer.step(pos, step, rule.leash, rng, |p| {
                    p.x < 0.0
                        || p.y < 0.0
                        || p.x > bounds.x
                        || p.y > bounds.y
                        || walls
                            .iter()
                            .any(|(w_pos, w_half)| overlaps(*w_pos, *w_half, p, half))
                });
            }
        }
    }

    /// Moves the vehicle while a direction is held. Returns true on the
    /// tick it reaches its destination.
    fn drive(&mut self, dt: f32) -> bool {
        let (Some(rule), Some(heading)) = (self.level.vehicle, self.held) else {
            return false;
        };
        if !self.is_riding() {
            return false;
        }
        let delta = heading.vector() * rule.speed * dt;
        for e in self.scene.entities_mut(rule.vehicle) {
            e.pos += delta;
        }

        let arrived = self.scene.entities(rule.vehicle).iter().any(|car| {
            self.scene
                .first_overlap(rule.destination, car.pos, car.half_size)
                .is_some()
        });
        if !arrived {
            return false;
        }
        self.puzzle.bump(rule.arrived);
        self.held = None;
        info!("{}: arrived at {}", self.level.title, rule.destination.layer_name());
        self.refresh();
        true
    }

    fn pick_up(&mut self, player: &Player) {
        let mut picked = false;
        for rule in &self.level.contacts {
            if !rule.when.holds(self.tense, &self.puzzle) {
                continue;
            }
            while let Some(id) = self
                .scene
                .first_overlap(rule.group, player.pos, player.half_size)
            {
                self.scene.remove(rule.group, id);
                let n = self.puzzle.bump(rule.counter);
                debug!("{}: {:?} = {n}", self.level.title, rule.counter);
                picked = true;
            }
        }
        if picked {
            self.refresh();
        }
    }
}
