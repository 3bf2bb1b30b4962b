//! Difficulty scaling. Every speed in the simulation is derived here.

use crate::constants::mechanics::{
    EATEN_SPEED, FRIGHTENED_SPEED, GHOST_SPEED, MAX_DIFFICULTY_LEVEL, PLAYER_SPEED,
};
use crate::systems::components::GhostMode;

/// Speed scale for a level: ramps linearly from 0.5 at level 1 to 1.0 at the cap, flat after.
pub fn difficulty_multiplier(level: u32) -> f32 {
    let capped = level.clamp(1, MAX_DIFFICULTY_LEVEL);
    0.5 + 0.5 * (capped - 1) as f32 / (MAX_DIFFICULTY_LEVEL - 1) as f32
}

pub fn player_speed(multiplier: f32) -> f32 {
    PLAYER_SPEED * multiplier
}

/// Ghost speed for a mode. The only place ghost speeds are decided.
pub fn ghost_speed(mode: GhostMode, multiplier: f32) -> f32 {
    match mode {
        GhostMode::Scatter | GhostMode::Chase => GHOST_SPEED * multiplier,
        GhostMode::Frightened => FRIGHTENED_SPEED * multiplier,
        GhostMode::Eaten => EATEN_SPEED,
    }
}

/// Whether the fifth ghost joins at this level.
pub fn has_fifth_ghost(level: u32) -> bool {
    level > MAX_DIFFICULTY_LEVEL
}
