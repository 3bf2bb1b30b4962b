use bevy_ecs::event::EventWriter;
use bevy_ecs::query::{With, Without};
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Query, Res, ResMut};
use glam::{IVec2, Vec2};
use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::constants::mechanics::HOME_ARRIVAL_RADIUS;
use crate::constants::timing::{seconds_to_ticks, SCATTER_CHASE_WAVES};
use crate::constants::{house, tile_center};
use crate::error::{EntityError, GameError};
use crate::map::builder::{Map, TraversalFlags};
use crate::map::direction::Direction;
use crate::systems::components::{
    BufferedDirection, GameRng, Ghost, GhostMode, HomePosition, Level, Navigation, PlayerControlled, Position, Velocity,
};
use crate::systems::level::{difficulty_multiplier, ghost_speed};

/// Countdown for the shared fright period. `None` when no power item is in effect.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrightTimer {
    pub remaining_ticks: Option<u32>,
}

impl FrightTimer {
    pub fn active(&self) -> bool {
        self.remaining_ticks.is_some()
    }

    /// Ticks the timer.
    /// # Returns
    /// `true` on the step the fright period ends.
    pub fn tick(&mut self) -> bool {
        match self.remaining_ticks {
            None => false,
            Some(0 | 1) => {
                self.remaining_ticks = None;
                true
            }
            Some(ticks) => {
                self.remaining_ticks = Some(ticks - 1);
                false
            }
        }
    }
}

/// Progress through the alternating scatter/chase waves of a round.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeWaves {
    pub phase: usize,
    /// `None` once the final, unbounded chase phase is reached.
    pub remaining_ticks: Option<u32>,
}

impl Default for ModeWaves {
    fn default() -> Self {
        Self {
            phase: 0,
            remaining_ticks: Some(seconds_to_ticks(SCATTER_CHASE_WAVES[0])),
        }
    }
}

impl ModeWaves {
    /// Mode ghosts follow when not frightened or eaten.
    pub fn mode(&self) -> GhostMode {
        if self.phase % 2 == 0 {
            GhostMode::Scatter
        } else {
            GhostMode::Chase
        }
    }

    /// Ticks the wave countdown.
    /// # Returns
    /// The new mode on the step the phase changes.
    pub fn tick(&mut self) -> Option<GhostMode> {
        let remaining = self.remaining_ticks?;
        if remaining > 1 {
            self.remaining_ticks = Some(remaining - 1);
            return None;
        }

        self.phase += 1;
        self.remaining_ticks = SCATTER_CHASE_WAVES.get(self.phase).map(|seconds| seconds_to_ticks(*seconds));
        Some(self.mode())
    }
}

/// Switches a ghost's mode, keeping its speed consistent with the mode.
pub fn set_mode(mode: &mut GhostMode, velocity: &mut Velocity, new_mode: GhostMode, multiplier: f32) {
    *mode = new_mode;
    velocity.speed = ghost_speed(new_mode, multiplier);
}

/// Flips a ghost around on the spot. The only way a ghost ever reverses outside a dead end.
pub fn reverse(velocity: &mut Velocity, buffered: &mut BufferedDirection, navigation: &mut Navigation) {
    velocity.direction = velocity.direction.opposite();
    buffered.0 = velocity.direction;
    navigation.invalidate();
}

/// Picks the point a ghost steers towards this step.
pub fn target_for(ghost: Ghost, mode: GhostMode, tile: IVec2, home: Vec2, player: Vec2) -> Vec2 {
    if mode != GhostMode::Eaten && Map::in_house(tile) {
        return house::EXIT;
    }

    match mode {
        GhostMode::Eaten => home,
        GhostMode::Frightened => player,
        GhostMode::Scatter if !ghost.is_relentless() => ghost.scatter_target(),
        GhostMode::Scatter | GhostMode::Chase => player,
    }
}

/// Chooses a ghost's next direction from the tile it occupies.
///
/// The reverse of `facing` is never a candidate unless nothing else is open. Roaming
/// ghosts pick uniformly among candidates; otherwise the candidate whose tile center
/// is nearest the target wins, earliest in [`Direction::DIRECTIONS`] on ties.
pub fn next_direction<R: Rng + ?Sized>(
    map: &Map,
    tile: IVec2,
    facing: Direction,
    target: Vec2,
    roaming: bool,
    rng: &mut R,
) -> Direction {
    let in_house = Map::in_house(tile);
    let candidates: SmallVec<[Direction; 4]> = Direction::DIRECTIONS
        .into_iter()
        .filter(|direction| *direction != facing.opposite())
        .filter(|direction| !map.is_blocked(tile + direction.as_ivec2(), TraversalFlags::GHOST, in_house))
        .collect();

    if candidates.is_empty() {
        return facing.opposite();
    }

    if roaming {
        return candidates.choose(rng).copied().unwrap_or(facing.opposite());
    }

    let mut best = candidates[0];
    let mut best_distance = f32::INFINITY;
    for direction in candidates {
        let distance = tile_center(tile + direction.as_ivec2()).distance_squared(target);
        if distance < best_distance {
            best_distance = distance;
            best = direction;
        }
    }
    best
}

/// Chooses a direction for every ghost that has entered a new tile.
#[allow(clippy::type_complexity)]
pub fn ghost_decision_system(
    map: Res<Map>,
    mut rng: ResMut<GameRng>,
    player: Query<&Position, With<PlayerControlled>>,
    mut ghosts: Query<
        (&Ghost, &GhostMode, &HomePosition, &Position, &Velocity, &mut BufferedDirection, &mut Navigation),
        Without<PlayerControlled>,
    >,
    mut errors: EventWriter<GameError>,
) {
    let player_position = match player.single() {
        Ok(position) => position.0,
        Err(e) => {
            errors.write(EntityError::Player(e.to_string()).into());
            return;
        }
    };

    for (ghost, mode, home, position, velocity, mut buffered, mut navigation) in ghosts.iter_mut() {
        let tile = position.tile();
        if navigation.decided_at == Some(tile) {
            continue;
        }

        let target = target_for(*ghost, *mode, tile, home.0, player_position);
        let roaming = *mode == GhostMode::Frightened && !Map::in_house(tile);
        let direction = next_direction(&map, tile, velocity.direction, target, roaming, &mut rng.0);

        trace!(ghost = ghost.as_ref(), mode = mode.as_ref(), ?tile, direction = direction.as_ref(), "Ghost decided");
        buffered.0 = direction;
        navigation.decided_at = Some(tile);
    }
}

/// Eaten ghosts that reached home recover into CHASE.
pub fn eaten_arrival_system(
    level: Res<Level>,
    mut ghosts: Query<(&Ghost, &mut GhostMode, &HomePosition, &Position, &mut Velocity, &mut Navigation)>,
) {
    let multiplier = difficulty_multiplier(level.0);
    for (ghost, mut mode, home, position, mut velocity, mut navigation) in ghosts.iter_mut() {
        if *mode == GhostMode::Eaten && position.0.distance(home.0) < HOME_ARRIVAL_RADIUS {
            debug!(ghost = ghost.as_ref(), "Eaten ghost reached home, recovering");
            set_mode(&mut mode, &mut velocity, GhostMode::Chase, multiplier);
            navigation.invalidate();
        }
    }
}

/// Counts down the fright period and returns still-frightened ghosts to CHASE when it ends.
pub fn fright_timer_system(
    level: Res<Level>,
    mut fright: ResMut<FrightTimer>,
    mut ghosts: Query<(&Ghost, &mut GhostMode, &mut Velocity)>,
) {
    if !fright.tick() {
        return;
    }

    let multiplier = difficulty_multiplier(level.0);
    debug!("Fright period ended");
    for (ghost, mut mode, mut velocity) in ghosts.iter_mut() {
        if *mode == GhostMode::Frightened {
            trace!(ghost = ghost.as_ref(), "Ghost no longer frightened");
            set_mode(&mut mode, &mut velocity, GhostMode::Chase, multiplier);
        }
    }
}

/// Advances the scatter/chase waves. Frozen while a fright period runs.
pub fn mode_wave_system(
    level: Res<Level>,
    fright: Res<FrightTimer>,
    mut waves: ResMut<ModeWaves>,
    mut ghosts: Query<(&mut GhostMode, &mut Velocity, &mut BufferedDirection, &mut Navigation), With<Ghost>>,
) {
    if fright.active() {
        return;
    }
    let Some(new_mode) = waves.tick() else {
        return;
    };

    debug!(phase = waves.phase, mode = new_mode.as_ref(), "Ghost wave changed");
    let multiplier = difficulty_multiplier(level.0);
    for (mut mode, mut velocity, mut buffered, mut navigation) in ghosts.iter_mut() {
        if matches!(*mode, GhostMode::Scatter | GhostMode::Chase) {
            if *mode != new_mode {
                reverse(&mut velocity, &mut buffered, &mut navigation);
            }
            set_mode(&mut mode, &mut velocity, new_mode, multiplier);
        }
    }
}
