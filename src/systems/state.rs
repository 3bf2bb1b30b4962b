use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::{With, Without},
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use strum_macros::AsRefStr;
use tracing::{debug, info, warn};

use crate::constants::timing::{LEVEL_TRANSITION_TICKS, RESPAWN_DELAY_TICKS};
use crate::constants::tile_center;
use crate::error::{EntityError, GameError};
use crate::events::{GameCommand, GameEvent, ResetRound, SessionEvent, StageTransition};
use crate::map::builder::{Map, TraversalFlags};
use crate::map::direction::Direction;
use crate::systems::components::{
    Autopilot, BufferedDirection, GameRng, Ghost, GhostBundle, GhostMode, HighScore, HomePosition, Level, Navigation,
    PlayerBundle, PlayerControlled, PlayerLives, Position, ScoreResource, Traversal, Velocity,
};
use crate::systems::ghost::{FrightTimer, ModeWaves};
use crate::systems::item::{BonusFruit, Pellets};
use crate::systems::level::{difficulty_multiplier, ghost_speed, has_fifth_ghost, player_speed};

/// A resource to track the overall stage of the session.
#[derive(Resource, Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameStage {
    /// Attract screen; nothing moves.
    Intro { remaining_ticks: u32 },
    /// The pilot plays on its own. Being caught only respawns.
    Demo { remaining_ticks: u32 },
    /// The main gameplay loop is active.
    Playing,
    /// Hold after a life is lost, before the round restarts.
    Paused { remaining_ticks: u32 },
    /// Hold after the board is cleared, before the next level starts.
    LevelTransition { remaining_ticks: u32 },
    /// Lives are exhausted. Only a start command leaves this stage.
    GameOver,
}

/// Payload-free view of [`GameStage`] for collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Intro,
    Demo,
    Playing,
    Paused,
    LevelTransition,
    GameOver,
}

impl GameStage {
    pub fn status(&self) -> Status {
        match self {
            GameStage::Intro { .. } => Status::Intro,
            GameStage::Demo { .. } => Status::Demo,
            GameStage::Playing => Status::Playing,
            GameStage::Paused { .. } => Status::Paused,
            GameStage::LevelTransition { .. } => Status::LevelTransition,
            GameStage::GameOver => Status::GameOver,
        }
    }

    /// Whether entities move and interact during this stage.
    pub fn simulates(&self) -> bool {
        matches!(self, GameStage::Demo { .. } | GameStage::Playing)
    }
}

/// Session parameters fixed at construction.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub starting_lives: u8,
    pub start_level: u32,
    pub intro_ticks: u32,
    pub demo_ticks: u32,
}

/// User-requested pause, independent of the stage machine.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PauseState {
    #[default]
    Inactive,
    /// `Some(n)` lets `n` more steps run before pausing again.
    Active { remaining_ticks: Option<u32> },
}

impl PauseState {
    pub fn active(&self) -> bool {
        matches!(self, PauseState::Active { remaining_ticks: None | Some(0) })
    }

    /// Ticks the pause state
    /// # Returns
    /// `true` if single-stepping just ran out and the pause took hold again
    pub fn tick(&mut self) -> bool {
        match self {
            PauseState::Inactive | PauseState::Active { remaining_ticks: None } => false,
            PauseState::Active {
                remaining_ticks: Some(0 | 1),
            } => {
                *self = PauseState::Active { remaining_ticks: None };
                true
            }
            PauseState::Active {
                remaining_ticks: Some(ticks),
            } => {
                *self = PauseState::Active {
                    remaining_ticks: Some(*ticks - 1),
                };
                false
            }
        }
    }
}

/// Builds the player at its spawn, facing left.
pub fn player_bundle(map: &Map, multiplier: f32) -> PlayerBundle {
    PlayerBundle {
        player: PlayerControlled,
        position: Position(tile_center(map.player_start)),
        velocity: Velocity {
            direction: Direction::Left,
            speed: player_speed(multiplier),
        },
        buffered_direction: BufferedDirection(Direction::Left),
        navigation: Navigation::default(),
        traversal: Traversal(TraversalFlags::PLAYER),
    }
}

/// Builds a ghost at its spawn, facing up.
pub fn ghost_bundle(ghost: Ghost, mode: GhostMode, multiplier: f32) -> GhostBundle {
    let home = tile_center(ghost.spawn_tile());
    GhostBundle {
        ghost,
        mode,
        home: HomePosition(home),
        position: Position(home),
        velocity: Velocity {
            direction: Direction::Up,
            speed: ghost_speed(mode, multiplier),
        },
        buffered_direction: BufferedDirection(Direction::Up),
        navigation: Navigation::default(),
        traversal: Traversal(TraversalFlags::GHOST),
    }
}

fn change_stage(stage: &mut GameStage, next: GameStage, events: &mut EventWriter<SessionEvent>) {
    let (from, to) = (stage.status(), next.status());
    if from != to {
        info!(from = from.as_ref(), to = to.as_ref(), "Stage changed");
        events.write(SessionEvent::StatusChanged { from, to });
    }
    *stage = next;
}

pub fn player_control_system(
    mut events: EventReader<GameEvent>,
    stage: Res<GameStage>,
    autopilot: Res<Autopilot>,
    mut players: Query<&mut BufferedDirection, With<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    let mut buffered = match players.single_mut() {
        Ok(buffered) => buffered,
        Err(e) => {
            errors.write(EntityError::Player(e.to_string()).into());
            return;
        }
    };

    for event in events.read() {
        let GameEvent::Command(GameCommand::MovePlayer(direction)) = event else {
            continue;
        };
        // The pilot owns the player outside of a human session
        if autopilot.0 || matches!(*stage, GameStage::Intro { .. } | GameStage::Demo { .. }) {
            continue;
        }
        buffered.0 = *direction;
    }
}

pub fn handle_pause_command(mut events: EventReader<GameEvent>, mut pause_state: ResMut<PauseState>) {
    for event in events.read() {
        match event {
            GameEvent::Command(GameCommand::TogglePause) => {
                *pause_state = match *pause_state {
                    PauseState::Active { .. } => {
                        info!("Game resumed");
                        PauseState::Inactive
                    }
                    PauseState::Inactive => {
                        info!("Game paused");
                        PauseState::Active { remaining_ticks: None }
                    }
                }
            }
            GameEvent::Command(GameCommand::SingleStep) => {
                // Stepping only makes sense while paused
                if *pause_state == PauseState::Inactive {
                    continue;
                }
                *pause_state = PauseState::Active {
                    remaining_ticks: Some(1),
                };
            }
            _ => {}
        }
    }
}

pub fn manage_pause_state_system(mut pause_state: ResMut<PauseState>) {
    if pause_state.tick() {
        debug!("Single step complete");
    }
}

/// Begins a fresh session from INTRO, DEMO or GAME_OVER.
#[allow(clippy::too_many_arguments)]
pub fn start_command_system(
    mut commands: EventReader<GameEvent>,
    settings: Res<SessionSettings>,
    mut stage: ResMut<GameStage>,
    mut score: ResMut<ScoreResource>,
    mut lives: ResMut<PlayerLives>,
    mut level: ResMut<Level>,
    mut resets: EventWriter<ResetRound>,
    mut events: EventWriter<SessionEvent>,
) {
    for command in commands.read() {
        if *command != GameEvent::Command(GameCommand::Start) {
            continue;
        }
        if !matches!(
            *stage,
            GameStage::Intro { .. } | GameStage::Demo { .. } | GameStage::GameOver
        ) {
            debug!(stage = stage.status().as_ref(), "Ignoring start command mid-session");
            continue;
        }

        info!(level = settings.start_level, lives = settings.starting_lives, "Starting session");
        score.0 = 0;
        lives.0 = settings.starting_lives;
        level.0 = settings.start_level;
        resets.write(ResetRound { refill_items: true });
        change_stage(&mut stage, GameStage::Playing, &mut events);
    }
}

/// Drives the stage machine: countdowns, life loss, level completion and the attract loop.
#[allow(clippy::too_many_arguments)]
pub fn stage_system(
    settings: Res<SessionSettings>,
    pellets: Res<Pellets>,
    mut stage: ResMut<GameStage>,
    mut lives: ResMut<PlayerLives>,
    mut level: ResMut<Level>,
    mut score: ResMut<ScoreResource>,
    mut high_score: ResMut<HighScore>,
    mut bonus: ResMut<BonusFruit>,
    mut rng: ResMut<GameRng>,
    mut transitions: EventReader<StageTransition>,
    mut resets: EventWriter<ResetRound>,
    mut events: EventWriter<SessionEvent>,
) {
    let caught = transitions
        .read()
        .fold(false, |caught, transition| caught || *transition == StageTransition::PlayerCaught);

    let next = match *stage {
        GameStage::Intro { remaining_ticks } if remaining_ticks > 1 => GameStage::Intro {
            remaining_ticks: remaining_ticks - 1,
        },
        GameStage::Intro { .. } => {
            score.0 = 0;
            level.0 = 1;
            resets.write(ResetRound { refill_items: true });
            GameStage::Demo {
                remaining_ticks: settings.demo_ticks,
            }
        }
        GameStage::Demo { remaining_ticks } => {
            if remaining_ticks <= 1 {
                level.0 = 1;
                resets.write(ResetRound { refill_items: true });
                GameStage::Intro {
                    remaining_ticks: settings.intro_ticks,
                }
            } else {
                if pellets.is_empty() {
                    debug!("Demo cleared the board, refilling");
                    resets.write(ResetRound { refill_items: true });
                } else if caught {
                    debug!("Demo player caught, respawning");
                    bonus.clear(&mut rng);
                    resets.write(ResetRound { refill_items: false });
                }
                GameStage::Demo {
                    remaining_ticks: remaining_ticks - 1,
                }
            }
        }
        GameStage::Playing => {
            if pellets.is_empty() {
                info!(level = level.0, score = score.0, "Level cleared");
                events.write(SessionEvent::LevelCleared { level: level.0 });
                GameStage::LevelTransition {
                    remaining_ticks: LEVEL_TRANSITION_TICKS,
                }
            } else if caught {
                lives.0 = lives.0.saturating_sub(1);
                bonus.clear(&mut rng);
                info!(remaining = lives.0, "Life lost");
                events.write(SessionEvent::LifeLost { remaining: lives.0 });

                if lives.0 == 0 {
                    let new_high_score = score.0 > high_score.0;
                    if new_high_score {
                        high_score.0 = score.0;
                    }
                    info!(score = score.0, new_high_score, "Game over");
                    events.write(SessionEvent::GameOver {
                        score: score.0,
                        new_high_score,
                    });
                    GameStage::GameOver
                } else {
                    GameStage::Paused {
                        remaining_ticks: RESPAWN_DELAY_TICKS,
                    }
                }
            } else {
                GameStage::Playing
            }
        }
        GameStage::Paused { remaining_ticks } if remaining_ticks > 1 => GameStage::Paused {
            remaining_ticks: remaining_ticks - 1,
        },
        GameStage::Paused { .. } => {
            resets.write(ResetRound { refill_items: false });
            GameStage::Playing
        }
        GameStage::LevelTransition { remaining_ticks } if remaining_ticks > 1 => GameStage::LevelTransition {
            remaining_ticks: remaining_ticks - 1,
        },
        GameStage::LevelTransition { .. } => {
            level.0 += 1;
            info!(level = level.0, multiplier = difficulty_multiplier(level.0), "Starting next level");
            resets.write(ResetRound { refill_items: true });
            GameStage::Playing
        }
        GameStage::GameOver => GameStage::GameOver,
    };

    if next != *stage {
        change_stage(&mut stage, next, &mut events);
    }
}

/// Lays the round out again: entities at spawn with speeds for the current level, modes,
/// fright and bonus timers reset, and optionally a full board.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn round_reset_system(
    mut commands: Commands,
    mut resets: EventReader<ResetRound>,
    map: Res<Map>,
    level: Res<Level>,
    mut pellets: ResMut<Pellets>,
    mut bonus: ResMut<BonusFruit>,
    mut fright: ResMut<FrightTimer>,
    mut waves: ResMut<ModeWaves>,
    mut rng: ResMut<GameRng>,
    mut player: Query<(&mut Position, &mut Velocity, &mut BufferedDirection, &mut Navigation), With<PlayerControlled>>,
    mut ghosts: Query<
        (Entity, &Ghost, &mut GhostMode, &mut Position, &mut Velocity, &mut BufferedDirection, &mut Navigation),
        Without<PlayerControlled>,
    >,
) {
    let Some(refill_items) = resets
        .read()
        .fold(None, |refill, reset| Some(refill.unwrap_or(false) || reset.refill_items))
    else {
        return;
    };

    let multiplier = difficulty_multiplier(level.0);
    if refill_items {
        *pellets = Pellets::from_map(&map);
    }
    *fright = FrightTimer::default();
    *waves = ModeWaves::default();
    // A respawn keeps the countdown drawn when the life was lost
    if refill_items {
        *bonus = BonusFruit::scheduled(&mut rng);
    }

    let template = player_bundle(&map, multiplier);
    if player.is_empty() {
        warn!("No player to reset");
    }
    for (mut position, mut velocity, mut buffered, mut navigation) in player.iter_mut() {
        *position = template.position;
        *velocity = template.velocity;
        *buffered = template.buffered_direction;
        *navigation = template.navigation;
    }

    let mode = waves.mode();
    let mut fifth_present = false;
    for (entity, ghost, mut ghost_mode, mut position, mut velocity, mut buffered, mut navigation) in ghosts.iter_mut() {
        if ghost.is_relentless() {
            if !has_fifth_ghost(level.0) {
                debug!(ghost = ghost.as_ref(), "Removing fifth ghost");
                commands.entity(entity).despawn();
                continue;
            }
            fifth_present = true;
        }

        let template = ghost_bundle(*ghost, mode, multiplier);
        *ghost_mode = template.mode;
        *position = template.position;
        *velocity = template.velocity;
        *buffered = template.buffered_direction;
        *navigation = template.navigation;
    }

    if has_fifth_ghost(level.0) && !fifth_present {
        info!(level = level.0, "Fifth ghost joins");
        commands.spawn(ghost_bundle(Ghost::Green, mode, multiplier));
    }

    debug!(level = level.0, multiplier, refill_items, remaining = pellets.remaining(), "Round reset");
}
