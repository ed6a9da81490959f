use bevy::prelude::*;

use super::scene::{overlaps, GroupId, Scene, SceneEntity};

/// Moves a box by `delta` against the wall groups, one axis at a time, so a
/// blocked axis does not stop movement along the other one. Walls the box
/// already overlaps before moving are ignored, which lets the player walk
/// out of a wall that appeared under them after a tense switch.
pub fn move_and_collide(
    pos: Vec2,
    half_size: Vec2,
    delta: Vec2,
    scene: &Scene,
    walls: &[GroupId],
) -> Vec2 {
    let blocking: Vec<&SceneEntity> = walls
        .iter()
        .flat_map(|g| scene.entities(*g))
        .filter(|w| !overlaps(w.pos, w.half_size, pos, half_size))
        .collect();

    let mut out = pos;
    out.x = resolve_axis(out, half_size, delta.x, &blocking, Axis2::X);
    out.y = resolve_axis(out, half_size, delta.y, &blocking, Axis2::Y);
    out
}

#[derive(Clone, Copy)]
enum Axis2 {
    X,
    Y,
}

fn resolve_axis(pos: Vec2, half: Vec2, step: f32, walls: &[&SceneEntity], axis: Axis2) -> f32 {
    let (start, half_len) = match axis {
        Axis2::X => (pos.x, half.x),
        Axis2::Y => (pos.y, half.y),
    };
    if step == 0.0 {
        return start;
    }
    let moved = match axis {
        Axis2::X => Vec2::new(pos.x + step, pos.y),
        Axis2::Y => Vec2::new(pos.x, pos.y + step),
    };

    let mut target = start + step;
    for w in walls
        .iter()
        .filter(|w| overlaps(w.pos, w.half_size, moved, half))
    {
        let (w_centre, w_half) = match axis {
            Axis2::X => (w.pos.x, w.half_size.x),
            Axis2::Y => (w.pos.y, w.half_size.y),
        };
        // Flush against the near face of the wall.
        if step > 0.0 {
            target = target.min(w_centre - w_half - half_len);
        } else {
            target = target.max(w_centre + w_half + half_len);
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_wall(at: Vec2, half: Vec2) -> Scene {
        let mut scene = Scene::new(Vec2::splat(1000.0));
        scene.spawn(GroupId::Wall, at, half, None);
        scene
    }

    #[test]
    fn free_movement_is_unchanged() {
        let scene = scene_with_wall(Vec2::new(500.0, 500.0), Vec2::splat(10.0));
        let out = move_and_collide(
            Vec2::new(100.0, 100.0),
            Vec2::splat(8.0),
            Vec2::new(5.0, -5.0),
            &scene,
            &[GroupId::Wall],
        );
        assert_eq!(out, Vec2::new(105.0, 95.0));
    }

    #[test]
    fn walls_stop_the_player_flush() {
        let scene = scene_with_wall(Vec2::new(130.0, 100.0), Vec2::splat(10.0));
        let out = move_and_collide(
            Vec2::new(100.0, 100.0),
            Vec2::splat(8.0),
            Vec2::new(20.0, 0.0),
            &scene,
            &[GroupId::Wall],
        );
        assert_eq!(out, Vec2::new(112.0, 100.0));
    }

    #[test]
    fn blocked_axis_still_slides_along_the_other() {
        let scene = scene_with_wall(Vec2::new(130.0, 100.0), Vec2::new(10.0, 50.0));
        let out = move_and_collide(
            Vec2::new(110.0, 100.0),
            Vec2::splat(8.0),
            Vec2::new(5.0, 5.0),
            &scene,
            &[GroupId::Wall],
        );
        assert_eq!(out, Vec2::new(112.0, 105.0));
    }

    #[test]
    fn groups_outside_the_wall_set_do_not_block() {
        let scene = scene_with_wall(Vec2::new(130.0, 100.0), Vec2::splat(10.0));
        let out = move_and_collide(
            Vec2::new(100.0, 100.0),
            Vec2::splat(8.0),
            Vec2::new(20.0, 0.0),
            &scene,
            &[GroupId::Blocks],
        );
        assert_eq!(out, Vec2::new(120.0, 100.0));
    }

    #[test]
    fn overlapping_walls_let_the_player_out() {
        let scene = scene_with_wall(Vec2::new(100.0, 100.0), Vec2::splat(10.0));
        let out = move_and_collide(
            Vec2::new(100.0, 100.0),
            Vec2::splat(8.0),
            Vec2::new(-5.0, 0.0),
            &scene,
            &[GroupId::Wall],
        );
        assert_eq!(out, Vec2::new(95.0, 100.0));
    }
}
