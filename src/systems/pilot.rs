//! Heuristic steering for the player during DEMO (or with autopilot enabled).

use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Query, Res};
use glam::{IVec2, Vec2};
use tracing::trace;

use crate::constants::mechanics::{PILOT_DANGER_RADIUS, PILOT_PANIC_RADIUS};
use crate::constants::tile_center;
use crate::map::builder::{Map, TraversalFlags};
use crate::map::direction::Direction;
use crate::systems::components::{BufferedDirection, Ghost, GhostMode, Navigation, PlayerControlled, Position, Velocity};
use crate::systems::item::Pellets;

const PELLET_REWARD: f32 = 10.0;
const MOMENTUM_REWARD: f32 = 1.0;
const PROXIMITY_PENALTY: f32 = 100.0;
const PANIC_PENALTY: f32 = 1000.0;

/// Scores one candidate tile for the pilot.
fn score_tile(destination: IVec2, keeps_facing: bool, threats: &[Vec2], pellets: &Pellets) -> f32 {
    let mut score = 0.0;
    if pellets.contains(destination) {
        score += PELLET_REWARD;
    }
    if keeps_facing {
        score += MOMENTUM_REWARD;
    }

    let center = tile_center(destination);
    let mut panic = false;
    for threat in threats {
        let distance = center.distance(*threat);
        if distance < PILOT_DANGER_RADIUS {
            score -= PROXIMITY_PENALTY / (distance + 0.1);
            panic |= distance < PILOT_PANIC_RADIUS;
        }
    }
    if panic {
        score -= PANIC_PENALTY;
    }
    score
}

/// Picks the best direction out of `tile` for the player.
///
/// The reverse of `facing` is only taken when no other direction is open.
pub fn choose_direction(map: &Map, tile: IVec2, facing: Direction, threats: &[Vec2], pellets: &Pellets) -> Direction {
    let mut best: Option<(Direction, f32)> = None;
    for direction in Direction::DIRECTIONS {
        if direction == facing.opposite() {
            continue;
        }
        let destination = tile + direction.as_ivec2();
        if map.is_blocked(destination, TraversalFlags::PLAYER, false) {
            continue;
        }

        let score = score_tile(destination, direction == facing, threats, pellets);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((direction, score));
        }
    }

    best.map(|(direction, _)| direction).unwrap_or(facing.opposite())
}

/// Writes the pilot's choice into the player's buffered direction once per tile.
#[allow(clippy::type_complexity)]
pub fn pilot_system(
    map: Res<Map>,
    pellets: Res<Pellets>,
    mut player: Query<(&Position, &Velocity, &mut BufferedDirection, &mut Navigation), With<PlayerControlled>>,
    ghosts: Query<(&Position, &GhostMode), (With<Ghost>, Without<PlayerControlled>)>,
) {
    let threats: Vec<Vec2> = ghosts
        .iter()
        .filter(|(_, mode)| matches!(mode, GhostMode::Scatter | GhostMode::Chase))
        .map(|(position, _)| position.0)
        .collect();

    for (position, velocity, mut buffered, mut navigation) in player.iter_mut() {
        let tile = position.tile();
        if navigation.decided_at == Some(tile) {
            continue;
        }

        let direction = choose_direction(&map, tile, velocity.direction, &threats, &pellets);
        trace!(?tile, direction = direction.as_ref(), "Pilot decided");
        buffered.0 = direction;
        navigation.decided_at = Some(tile);
    }
}
