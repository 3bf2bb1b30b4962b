use bevy_ecs::prelude::*;

use crate::map::direction::Direction;
use crate::systems::components::{BonusKind, Ghost};
use crate::systems::state::Status;

/// Input delivered by a collaborator between steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    /// Buffer a direction; applied when the player can next turn.
    MovePlayer(Direction),
    /// Start a session from INTRO/DEMO, or restart after GAME_OVER.
    Start,
    TogglePause,
    /// Advance exactly one physics step while paused.
    SingleStep,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// Emitted by collision detection for every ghost overlapping the player; resolved in a second pass.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    pub ghost: Entity,
}

/// Requests raised by gameplay systems for the stage machine to act on.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageTransition {
    /// A ghost that was neither frightened nor eaten caught the player.
    PlayerCaught,
}

/// Requests the round to be laid out again: entities back at spawn, ghost modes and timers reset.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetRound {
    /// Also restore every item to the board.
    pub refill_items: bool,
}

/// Discrete outcomes published to presentation, audio and persistence layers.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    PelletEaten { points: u32 },
    PowerPelletEaten { points: u32 },
    BonusEaten { kind: BonusKind, points: u32 },
    GhostEaten { ghost: Ghost, points: u32 },
    LifeLost { remaining: u8 },
    LevelCleared { level: u32 },
    GameOver { score: u32, new_high_score: bool },
    StatusChanged { from: Status, to: Status },
}
