use std::collections::HashSet;

use bevy_ecs::event::EventWriter;
use bevy_ecs::query::{With, Without};
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Query, Res, ResMut};
use glam::{IVec2, Vec2};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::constants::mechanics::{BONUS_PICKUP_RADIUS, ITEM_PICKUP_RADIUS};
use crate::constants::timing::{BONUS_ACTIVE_TICKS, BONUS_RESPAWN_AFTER_MISS_SECONDS, BONUS_SPAWN_SECONDS, FRIGHT_TICKS};
use crate::constants::{score, tile_center, MapTile};
use crate::events::SessionEvent;
use crate::map::builder::Map;
use crate::systems::components::{
    BonusKind, BufferedDirection, GameRng, Ghost, GhostMode, Level, Navigation, PlayerControlled, Position, ScoreResource,
    Velocity,
};
use crate::systems::ghost::{reverse, set_mode, FrightTimer};
use crate::systems::level::difficulty_multiplier;

/// The items still on the board, keyed by tile. The two sets never overlap.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Pellets {
    pub pellets: HashSet<IVec2>,
    pub power_pellets: HashSet<IVec2>,
}

impl Pellets {
    /// Every item the board starts with.
    pub fn from_map(map: &Map) -> Self {
        Self {
            pellets: map.item_tiles(MapTile::Pellet).collect(),
            power_pellets: map.item_tiles(MapTile::PowerPellet).collect(),
        }
    }

    pub fn contains(&self, tile: IVec2) -> bool {
        self.pellets.contains(&tile) || self.power_pellets.contains(&tile)
    }

    /// The level is complete exactly when this holds.
    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty() && self.power_pellets.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pellets.len() + self.power_pellets.len()
    }

    /// All remaining item tiles in row-major order, so random picks are reproducible.
    pub fn sorted_tiles(&self) -> Vec<IVec2> {
        let mut tiles: Vec<IVec2> = self.pellets.iter().chain(self.power_pellets.iter()).copied().collect();
        tiles.sort_by_key(|tile| (tile.y, tile.x));
        tiles
    }
}

/// A bonus object currently on the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBonus {
    pub kind: BonusKind,
    pub position: Vec2,
    pub remaining_ticks: u32,
}

/// The single bonus object slot and its countdowns.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct BonusFruit {
    pub active: Option<ActiveBonus>,
    /// Steps until the next spawn attempt. Only counts down while no bonus is active.
    pub spawn_in_ticks: u32,
}

impl BonusFruit {
    /// An empty slot whose first spawn is drawn from the regular window.
    pub fn scheduled(rng: &mut GameRng) -> Self {
        Self {
            active: None,
            spawn_in_ticks: rng.ticks_between(BONUS_SPAWN_SECONDS),
        }
    }

    /// Removes any bonus and schedules the next one as if it had been missed.
    pub fn clear(&mut self, rng: &mut GameRng) {
        self.active = None;
        self.spawn_in_ticks = rng.ticks_between(BONUS_RESPAWN_AFTER_MISS_SECONDS);
    }
}

/// Puts every non-eaten ghost into FRIGHTENED and restarts the shared fright countdown.
fn frighten_ghosts<'a>(
    ghosts: impl Iterator<
        Item = (
            &'a Ghost,
            bevy_ecs::world::Mut<'a, GhostMode>,
            bevy_ecs::world::Mut<'a, Velocity>,
            bevy_ecs::world::Mut<'a, BufferedDirection>,
            bevy_ecs::world::Mut<'a, Navigation>,
        ),
    >,
    fright: &mut FrightTimer,
    multiplier: f32,
) {
    fright.remaining_ticks = Some(FRIGHT_TICKS);

    let mut frightened = 0;
    for (ghost, mut mode, mut velocity, mut buffered, mut navigation) in ghosts {
        match *mode {
            GhostMode::Eaten => continue,
            GhostMode::Frightened => {}
            GhostMode::Scatter | GhostMode::Chase => {
                reverse(&mut velocity, &mut buffered, &mut navigation);
            }
        }
        trace!(ghost = ghost.as_ref(), "Ghost frightened");
        set_mode(&mut mode, &mut velocity, GhostMode::Frightened, multiplier);
        frightened += 1;
    }
    debug!(frightened, duration_ticks = FRIGHT_TICKS, "Power pellet eaten, frightening ghosts");
}

/// Eats the item under the player when it is close enough to the tile center.
#[allow(clippy::type_complexity)]
pub fn item_system(
    level: Res<Level>,
    mut pellets: ResMut<Pellets>,
    mut score: ResMut<ScoreResource>,
    mut fright: ResMut<FrightTimer>,
    player: Query<&Position, With<PlayerControlled>>,
    mut ghosts: Query<
        (&Ghost, &mut GhostMode, &mut Velocity, &mut BufferedDirection, &mut Navigation),
        Without<PlayerControlled>,
    >,
    mut events: EventWriter<SessionEvent>,
) {
    for position in player.iter() {
        let tile = position.tile();
        if position.0.distance(tile_center(tile)) >= ITEM_PICKUP_RADIUS {
            continue;
        }

        if pellets.pellets.remove(&tile) {
            score.0 += score::PELLET;
            trace!(?tile, remaining = pellets.remaining(), "Pellet eaten");
            events.write(SessionEvent::PelletEaten { points: score::PELLET });
        } else if pellets.power_pellets.remove(&tile) {
            score.0 += score::POWER_PELLET;
            events.write(SessionEvent::PowerPelletEaten {
                points: score::POWER_PELLET,
            });
            frighten_ghosts(ghosts.iter_mut(), &mut fright, difficulty_multiplier(level.0));
        }
    }
}

/// Awards the active bonus when the player reaches it.
pub fn bonus_pickup_system(
    mut bonus: ResMut<BonusFruit>,
    mut rng: ResMut<GameRng>,
    mut score: ResMut<ScoreResource>,
    player: Query<&Position, With<PlayerControlled>>,
    mut events: EventWriter<SessionEvent>,
) {
    let Some(active) = bonus.active else {
        return;
    };

    if player.iter().any(|position| position.0.distance(active.position) < BONUS_PICKUP_RADIUS) {
        let points = active.kind.points();
        score.0 += points;
        bonus.active = None;
        bonus.spawn_in_ticks = rng.ticks_between(BONUS_SPAWN_SECONDS);
        debug!(kind = active.kind.as_ref(), points, next_in_ticks = bonus.spawn_in_ticks, "Bonus eaten");
        events.write(SessionEvent::BonusEaten {
            kind: active.kind,
            points,
        });
    }
}

/// Spawns the bonus when its countdown elapses, and removes it when it expires uncollected.
pub fn bonus_timer_system(mut bonus: ResMut<BonusFruit>, mut rng: ResMut<GameRng>, pellets: Res<Pellets>) {
    match bonus.active.as_mut() {
        Some(active) => {
            active.remaining_ticks = active.remaining_ticks.saturating_sub(1);
            if active.remaining_ticks == 0 {
                debug!(kind = active.kind.as_ref(), "Bonus expired");
                bonus.clear(&mut rng);
            }
        }
        None => {
            bonus.spawn_in_ticks = bonus.spawn_in_ticks.saturating_sub(1);
            if bonus.spawn_in_ticks > 0 {
                return;
            }

            let tiles = pellets.sorted_tiles();
            let Some(tile) = tiles.choose(&mut rng.0).copied() else {
                // Nothing left to stand on; try again after a fresh delay
                bonus.spawn_in_ticks = rng.ticks_between(BONUS_SPAWN_SECONDS);
                return;
            };
            let kind = if rng.0.random_bool(0.5) {
                BonusKind::Cherry
            } else {
                BonusKind::Strawberry
            };

            debug!(kind = kind.as_ref(), ?tile, "Bonus spawned");
            bonus.active = Some(ActiveBonus {
                kind,
                position: tile_center(tile),
                remaining_ticks: BONUS_ACTIVE_TICKS,
            });
        }
    }
}
