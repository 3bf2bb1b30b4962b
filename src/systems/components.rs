use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::{IVec2, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use strum_macros::AsRefStr;

use crate::constants::{score, tile_center};
use crate::map::builder::TraversalFlags;
use crate::map::direction::Direction;

/// A tag component for the entity steered by input or the pilot.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Continuous position in tile units.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    /// The tile currently containing this position.
    pub fn tile(&self) -> IVec2 {
        self.0.floor().as_ivec2()
    }
}

/// Current facing and speed in tiles per second.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub direction: Direction,
    pub speed: f32,
}

/// The next direction the entity wants to take, applied opportunistically by movement.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedDirection(pub Direction);

/// Last tile where an AI (ghost or pilot) chose its next direction.
///
/// Decisions are made once per tile so a fresh turn cannot be second-guessed
/// before the entity leaves the tile.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
    pub decided_at: Option<IVec2>,
}

impl Navigation {
    /// Forces a new decision on the next step.
    pub fn invalidate(&mut self) {
        self.decided_at = None;
    }
}

/// Which kind of mover an entity is, for gate rules.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal(pub TraversalFlags);

/// Ghost identity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Ghost {
    Red,
    Pink,
    Cyan,
    Orange,
    /// Only present beyond the difficulty cap; hunts the player in every wave.
    Green,
}

impl Ghost {
    /// The four ghosts present on every level.
    pub const CLASSIC: [Ghost; 4] = [Ghost::Red, Ghost::Pink, Ghost::Cyan, Ghost::Orange];

    /// Spawn tile, which is also where an eaten ghost recovers.
    pub const fn spawn_tile(self) -> IVec2 {
        match self {
            Ghost::Red => IVec2::new(10, 8),
            Ghost::Pink | Ghost::Green => IVec2::new(10, 9),
            Ghost::Cyan => IVec2::new(9, 9),
            Ghost::Orange => IVec2::new(11, 9),
        }
    }

    /// Corner targeted during SCATTER.
    pub fn scatter_target(self) -> Vec2 {
        tile_center(match self {
            Ghost::Red => IVec2::new(19, 1),
            Ghost::Pink | Ghost::Green => IVec2::new(1, 1),
            Ghost::Cyan => IVec2::new(19, 18),
            Ghost::Orange => IVec2::new(1, 18),
        })
    }

    /// Whether this ghost ignores scatter waves and always hunts the player.
    pub const fn is_relentless(self) -> bool {
        matches!(self, Ghost::Green)
    }
}

/// Behavioural mode of a ghost.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    /// Eyes heading home after being eaten. Harmless and cannot be eaten again.
    Eaten,
}

/// Where a ghost spawned; the destination of an eaten ghost.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HomePosition(pub Vec2);

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub velocity: Velocity,
    pub buffered_direction: BufferedDirection,
    pub navigation: Navigation,
    pub traversal: Traversal,
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub mode: GhostMode,
    pub home: HomePosition,
    pub position: Position,
    pub velocity: Velocity,
    pub buffered_direction: BufferedDirection,
    pub navigation: Navigation,
    pub traversal: Traversal,
}

/// Kind of bonus object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BonusKind {
    Cherry,
    Strawberry,
}

impl BonusKind {
    pub const fn points(self) -> u32 {
        match self {
            BonusKind::Cherry => score::CHERRY,
            BonusKind::Strawberry => score::STRAWBERRY,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResource(pub u32);

/// Best final score seen by this instance, seeded from configuration.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScore(pub u32);

/// A resource to store the number of player lives.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLives(pub u8);

impl Default for PlayerLives {
    fn default() -> Self {
        Self(3)
    }
}

/// Current level, starting at 1. Drives the difficulty multiplier.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(pub u32);

/// Length of the physics step being simulated, and the running step count.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime {
    pub seconds: f32,
    pub ticks: u64,
}

/// Whether the pilot steers the player even outside DEMO.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Autopilot(pub bool);

/// The only source of randomness in the simulation.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(SmallRng::from_os_rng())
    }

    /// A duration in physics steps drawn uniformly from an inclusive range of seconds.
    pub fn ticks_between(&mut self, (low, high): (f32, f32)) -> u32 {
        crate::constants::timing::seconds_to_ticks(self.0.random_range(low..=high))
    }
}
