//! Centralized error types for the simulation.
//!
//! Only construction can fail (board parsing, map validation, configuration).
//! Once a [`crate::game::Game`] exists every step is total; inconsistencies found
//! by systems are reported as [`GameError`] events and logged.

use bevy_ecs::event::Event;

/// Main error type for the simulation.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),
}

/// Error type for map parsing operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character in board: {0:?}")]
    UnknownCharacter(char),
    #[error("Second player marker at {second:?}, first at {first:?}")]
    DuplicatePlayerStart { first: (usize, usize), second: (usize, usize) },
    #[error("Row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("Map parsing failed: {0}")]
    ParseFailed(String),
}

/// Errors related to map validation.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),
}

/// Errors related to configuration loading.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors related to entity bookkeeping inside the world.
#[derive(thiserror::Error, Debug)]
pub enum EntityError {
    #[error("Expected exactly one player entity: {0}")]
    Player(String),
}

/// Result type for simulation operations.
pub type GameResult<T> = Result<T, GameError>;
