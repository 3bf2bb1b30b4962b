//! This module contains all the constants used in the simulation.

use std::time::Duration;

use glam::{IVec2, Vec2};

/// Pacing for the headless runner's driving clock (not the physics step).
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The size of the game board, in cells.
pub const BOARD_CELL_SIZE: IVec2 = IVec2::new(21, 20);

/// An enum representing the content of a single board cell, as written in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    /// A walkable tile with nothing on it.
    Empty,
    /// A wall tile.
    Wall,
    /// An ordinary item.
    Pellet,
    /// A power item, frightens the ghosts when eaten.
    PowerPellet,
    /// The ghost house gate.
    Gate,
}

/// The raw layout of the game board.
///
/// `1` wall, `0` item, `2` power item, `3` empty, `4` gate, `G` ghost marker, `P` player start.
pub const RAW_BOARD: [&str; BOARD_CELL_SIZE.y as usize] = [
    "111111111111111111111",
    "100000000010000000001",
    "121110111010111011121",
    "101110111010111011101",
    "100000000000000000001",
    "101110101111101011101",
    "100000100010001000001",
    "111110111313111011111",
    "3333101333G3331013333",
    "111110131444131011111",
    "333330331333133033333",
    "111110131111131011111",
    "333310133333331011111",
    "111110101111101011111",
    "100000000010000000001",
    "101110111010111011101",
    "1200100000P0000010021",
    "111010101111101010111",
    "100000100010001000001",
    "111111111111111111111",
];

/// The ghost house, inclusive on both corners. Gates open to ghosts standing inside it.
pub mod house {
    use glam::{IVec2, Vec2};

    pub const MIN: IVec2 = IVec2::new(8, 8);
    pub const MAX: IVec2 = IVec2::new(12, 10);
    /// Point ghosts steer towards while leaving the house.
    pub const EXIT: Vec2 = Vec2::new(10.5, 7.5);
}

/// Movement and proximity tuning, all in tiles or tiles per second.
pub mod mechanics {
    /// Player speed at full difficulty.
    pub const PLAYER_SPEED: f32 = 8.0;
    /// Ghost speed at full difficulty, in SCATTER or CHASE.
    pub const GHOST_SPEED: f32 = 7.5;
    /// Ghost speed at full difficulty while FRIGHTENED.
    pub const FRIGHTENED_SPEED: f32 = 5.0;
    /// Speed of an eaten ghost heading home. Not scaled by difficulty.
    pub const EATEN_SPEED: f32 = 15.0;

    /// Maximum offset from a tile center along the facing axis for a turn to be honored.
    pub const TURN_TOLERANCE: f32 = 0.15;
    /// How far past the projected position the wall check looks.
    pub const WALL_LOOKAHEAD: f32 = 0.49;

    pub const ITEM_PICKUP_RADIUS: f32 = 0.4;
    pub const BONUS_PICKUP_RADIUS: f32 = 0.5;
    pub const GHOST_COLLISION_RADIUS: f32 = 0.6;
    /// An eaten ghost closer than this to its home recovers.
    pub const HOME_ARRIVAL_RADIUS: f32 = 1.0;

    /// The pilot only fears ghosts within this many tiles of a candidate tile.
    pub const PILOT_DANGER_RADIUS: f32 = 4.0;
    /// Any ghost this close to a candidate tile makes it a last resort.
    pub const PILOT_PANIC_RADIUS: f32 = 1.5;

    /// Level at which the difficulty ramp flattens out.
    pub const MAX_DIFFICULTY_LEVEL: u32 = 50;
}

/// Simulation clock and durations. Durations are expressed in physics steps.
pub mod timing {
    /// Physics steps per simulated second.
    pub const STEPS_PER_SECOND: u32 = 120;
    /// Length of a single physics step, in seconds.
    pub const SIM_DT: f32 = 1.0 / STEPS_PER_SECOND as f32;
    /// Upper bound on the wall time a single driving tick may feed the accumulator.
    pub const MAX_FRAME_TIME: f32 = 0.1;

    pub const FRIGHT_TICKS: u32 = 7 * STEPS_PER_SECOND;
    pub const RESPAWN_DELAY_TICKS: u32 = 2 * STEPS_PER_SECOND;
    pub const LEVEL_TRANSITION_TICKS: u32 = 2 * STEPS_PER_SECOND;

    /// Bonus objects stay on the board this long before vanishing.
    pub const BONUS_ACTIVE_TICKS: u32 = 10 * STEPS_PER_SECOND;
    /// Delay range before a bonus appears at the start of a round or after one is eaten.
    pub const BONUS_SPAWN_SECONDS: (f32, f32) = (10.0, 20.0);
    /// Delay range before a bonus reappears after expiring uncollected.
    pub const BONUS_RESPAWN_AFTER_MISS_SECONDS: (f32, f32) = (10.0, 25.0);

    /// Alternating scatter/chase phase lengths in seconds, starting with scatter.
    /// Chase continues indefinitely once the table is exhausted.
    pub const SCATTER_CHASE_WAVES: [f32; 7] = [7.0, 20.0, 7.0, 20.0, 5.0, 20.0, 5.0];

    /// Converts a duration in seconds to a whole number of physics steps.
    pub fn seconds_to_ticks(seconds: f32) -> u32 {
        (seconds.max(0.0) * STEPS_PER_SECOND as f32).round() as u32
    }
}

/// Point values.
pub mod score {
    pub const PELLET: u32 = 10;
    pub const POWER_PELLET: u32 = 50;
    pub const GHOST: u32 = 200;
    pub const CHERRY: u32 = 100;
    pub const STRAWBERRY: u32 = 300;
}

/// Returns the center of the given tile.
pub fn tile_center(tile: IVec2) -> Vec2 {
    tile.as_vec2() + Vec2::splat(0.5)
}
