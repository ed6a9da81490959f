use bevy::prelude::*;
use rand::Rng;

/// Below this distance a pursuer is considered on top of its target.
pub const MIN_CHASE_DISTANCE: f32 = 0.01;

/// One step of straight-line pursuit: `pursuer + normalize(target - pursuer) * step`.
pub fn chase_step(pursuer: Vec2, target: Vec2, step: f32) -> Vec2 {
    let diff = target - pursuer;
    let distance = diff.length();
    if distance < MIN_CHASE_DISTANCE {
        return pursuer;
    }
    pursuer + diff / distance * step
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn vector(self) -> Vec2 {
        match self {
            Heading::Up => Vec2::Y,
            Heading::Down => Vec2::NEG_Y,
            Heading::Left => Vec2::NEG_X,
            Heading::Right => Vec2::X,
        }
    }
}

/// Random-walk state of one wandering entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wanderer {
    pub home: Vec2,
    pub heading: Heading,
}

impl Wanderer {
    pub fn new(home: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            home,
            heading: Heading::random(rng),
        }
    }

    /// Proposes the next position. `blocked` decides whether a candidate is
    /// off-limits; a blocked move is dropped and a new heading is drawn.
    pub fn step(
        &mut self,
        pos: Vec2,
        step: f32,
        leash: f32,
        rng: &mut impl Rng,
        blocked: impl Fn(Vec2) -> bool,
    ) -> Vec2 {
        let candidate = pos + self.heading.vector() * step;
        if candidate.distance(self.home) > leash || blocked(candidate) {
            self.heading = Heading::random(rng);
            return pos;
        }
        candidate
    }
}
