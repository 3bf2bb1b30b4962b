use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Query, Res};
use glam::Vec2;
use tracing::trace;

use crate::constants::mechanics::{TURN_TOLERANCE, WALL_LOOKAHEAD};
use crate::constants::tile_center;
use crate::map::builder::{Map, TraversalFlags};
use crate::map::direction::{Axis, Direction};
use crate::systems::components::{BufferedDirection, DeltaTime, Ghost, PlayerControlled, Position, Traversal, Velocity};

/// The committed result of one step of motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub position: Vec2,
    pub direction: Direction,
}

/// Advances a mover by one physics step.
///
/// Resolution order matters: a turn near a tile center is tried first, then a
/// reversal, then the wall check, then tunnel wraparound. Reversal never checks walls.
pub fn advance(
    map: &Map,
    position: Vec2,
    velocity: &Velocity,
    intent: Direction,
    dt: f32,
    traversal: TraversalFlags,
) -> Step {
    let facing = velocity.direction;
    let distance = velocity.speed * dt;
    let mut projected = position + facing.as_vec2() * distance;

    let tile = position.floor().as_ivec2();
    let center = tile_center(tile);
    let in_house = traversal.contains(TraversalFlags::GHOST) && Map::in_house(tile);

    if intent != facing {
        let offset = match facing.axis() {
            Axis::Horizontal => (position.x - center.x).abs(),
            Axis::Vertical => (position.y - center.y).abs(),
        };

        if offset < TURN_TOLERANCE && !map.is_blocked(tile + intent.as_ivec2(), traversal, in_house) {
            return Step {
                position: center + intent.as_vec2() * distance,
                direction: intent,
            };
        }
    }

    if intent == facing.opposite() {
        return Step {
            position,
            direction: intent,
        };
    }

    let lookahead = (projected + facing.as_vec2() * WALL_LOOKAHEAD).floor().as_ivec2();
    if lookahead != tile && map.is_blocked(lookahead, traversal, in_house) {
        let clamped = match facing.axis() {
            Axis::Horizontal => Vec2::new(center.x, position.y),
            Axis::Vertical => Vec2::new(position.x, center.y),
        };
        return Step {
            position: clamped,
            direction: facing,
        };
    }

    let width = map.width() as f32;
    if projected.x < -0.5 {
        projected.x = width - 0.5;
    } else if projected.x > width - 0.5 {
        projected.x = -0.5;
    }

    Step {
        position: projected,
        direction: facing,
    }
}

pub fn player_movement_system(
    map: Res<Map>,
    delta_time: Res<DeltaTime>,
    mut players: Query<(&mut Position, &mut Velocity, &BufferedDirection, &Traversal), With<PlayerControlled>>,
) {
    for (mut position, mut velocity, buffered, traversal) in players.iter_mut() {
        let step = advance(&map, position.0, &velocity, buffered.0, delta_time.seconds, traversal.0);
        if step.direction != velocity.direction {
            trace!(from = velocity.direction.as_ref(), to = step.direction.as_ref(), "Player turned");
        }
        position.0 = step.position;
        velocity.direction = step.direction;
    }
}

pub fn ghost_movement_system(
    map: Res<Map>,
    delta_time: Res<DeltaTime>,
    mut ghosts: Query<(&mut Position, &mut Velocity, &BufferedDirection, &Traversal), (With<Ghost>, Without<PlayerControlled>)>,
) {
    for (mut position, mut velocity, buffered, traversal) in ghosts.iter_mut() {
        let step = advance(&map, position.0, &velocity, buffered.0, delta_time.seconds, traversal.0);
        position.0 = step.position;
        velocity.direction = step.direction;
    }
}
