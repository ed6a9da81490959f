use bevy::prelude::*;

use super::steering::Heading;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

/// The player character, shared by every view of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    /// Pixels per second.
    pub vel: Vec2,
    pub half_size: Vec2,
    pub visible: bool,
    pub facing: Facing,
}

impl Player {
    pub fn new(pos: Vec2, half_size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half_size,
            visible: true,
            facing: Facing::Right,
        }
    }

    /// Applies a direction key. Releasing either horizontal key stops
    /// horizontal motion, and likewise for vertical.
    pub fn steer(&mut self, heading: Heading, pressed: bool, speed: f32) {
        match (heading, pressed) {
            (Heading::Right, true) => {
                self.vel.x = speed;
                self.facing = Facing::Right;
            }
            (Heading::Left, true) => {
                self.vel.x = -speed;
                self.facing = Facing::Left;
            }
            (Heading::Up, true) => self.vel.y = speed,
            (Heading::Down, true) => self.vel.y = -speed,
            (Heading::Left | Heading::Right, false) => self.vel.x = 0.0,
            (Heading::Up | Heading::Down, false) => self.vel.y = 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releasing_either_horizontal_key_stops_x() {
        let mut p = Player::new(Vec2::ZERO, Vec2::ONE);
        p.steer(Heading::Left, true, 300.0);
        p.steer(Heading::Up, true, 300.0);
        assert_eq!(p.vel, Vec2::new(-300.0, 300.0));
        assert_eq!(p.facing, Facing::Left);

        p.steer(Heading::Right, false, 300.0);
        assert_eq!(p.vel, Vec2::new(0.0, 300.0));
        p.steer(Heading::Down, false, 300.0);
        assert_eq!(p.vel, Vec2::ZERO);
    }
}
