//! This module contains the simulation orchestrator.

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::query::{With, Without};
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use glam::Vec2;
use tracing::{debug, error, info};

use crate::config::GameConfig;
use crate::constants::timing::{seconds_to_ticks, MAX_FRAME_TIME, SIM_DT};
use crate::constants::RAW_BOARD;
use crate::error::{EntityError, GameResult};
use crate::events::{CollisionEvent, GameCommand, GameEvent, ResetRound, SessionEvent, StageTransition};
use crate::formatter;
use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::systems::collision::{collision_system, ghost_collision_system};
use crate::systems::components::{
    Autopilot, DeltaTime, GameRng, Ghost, GhostMode, HighScore, Level, PlayerControlled, PlayerLives, Position,
    ScoreResource, Velocity,
};
use crate::systems::ghost::{
    eaten_arrival_system, fright_timer_system, ghost_decision_system, mode_wave_system, FrightTimer, ModeWaves,
};
use crate::systems::item::{bonus_pickup_system, bonus_timer_system, item_system, ActiveBonus, BonusFruit, Pellets};
use crate::systems::level::difficulty_multiplier;
use crate::systems::movement::{ghost_movement_system, player_movement_system};
use crate::systems::pilot::pilot_system;
use crate::systems::state::{
    ghost_bundle, handle_pause_command, manage_pause_state_system, player_bundle, player_control_system,
    round_reset_system, stage_system, start_command_system, GameStage, PauseState, SessionSettings, Status,
};

/// The fixed per-step pipeline. Each set runs strictly after the previous one.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum SimulationSet {
    /// Commands from collaborators
    Input,
    /// Pending round resets, applied before anything moves
    Setup,
    /// Pilot and ghost direction choices
    Decide,
    Movement,
    /// Items and bonus pickup
    Consumption,
    /// Detection, then resolution
    Collision,
    /// Eaten recovery, fright expiry, scatter/chase waves, bonus timers
    ModeTransitions,
    Stage,
}

fn gameplay_active(stage: Res<GameStage>, pause: Res<PauseState>) -> bool {
    stage.simulates() && !pause.active()
}

fn pilot_enabled(stage: Res<GameStage>, autopilot: Res<Autopilot>) -> bool {
    autopilot.0 || matches!(*stage, GameStage::Demo { .. })
}

/// Presentation view of one mover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub position: Vec2,
    pub facing: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostSnapshot {
    pub ghost: Ghost,
    pub position: Vec2,
    pub facing: Direction,
    pub mode: GhostMode,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub player: EntitySnapshot,
    /// Sorted by ghost identity.
    pub ghosts: Vec<GhostSnapshot>,
    pub score: u32,
    pub high_score: u32,
    pub lives: u8,
    pub level: u32,
    pub status: Status,
    pub bonus: Option<ActiveBonus>,
    pub items_remaining: usize,
}

/// Core simulation state manager built on the Bevy ECS architecture.
///
/// Owns a `World` holding every entity and resource, and a `Schedule` that runs the
/// per-step pipeline in a fixed order. Wall-clock time fed to [`Game::tick`] is turned
/// into whole physics steps through an accumulator, so identical inputs and seed
/// always produce identical runs.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    accumulator: f32,
    pending_events: Vec<SessionEvent>,
}

impl Game {
    /// Creates a simulation on the standard board.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the board cannot be built.
    pub fn new(config: &GameConfig) -> GameResult<Game> {
        Self::with_board(config, &RAW_BOARD)
    }

    /// Creates a simulation on a custom board layout.
    pub fn with_board(config: &GameConfig, board: &[&str]) -> GameResult<Game> {
        info!(seed = ?config.seed, start_level = config.start_level, lives = config.lives, "Initializing simulation");

        let map = Map::new(board)?;
        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::register_events(&mut world);
        Self::insert_resources(&mut world, config, map);
        Self::spawn_entities(&mut world);

        debug!("Configuring system execution schedule");
        Self::configure_schedule(&mut schedule);

        Ok(Game {
            world,
            schedule,
            accumulator: 0.0,
            pending_events: Vec::new(),
        })
    }

    fn register_events(world: &mut World) {
        EventRegistry::register_event::<crate::error::GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<CollisionEvent>(world);
        EventRegistry::register_event::<StageTransition>(world);
        EventRegistry::register_event::<ResetRound>(world);
        EventRegistry::register_event::<SessionEvent>(world);
    }

    fn insert_resources(world: &mut World, config: &GameConfig, map: Map) {
        let mut rng = match config.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::from_entropy(),
        };
        let settings = SessionSettings {
            starting_lives: config.lives,
            start_level: config.start_level,
            intro_ticks: seconds_to_ticks(config.intro_seconds),
            demo_ticks: seconds_to_ticks(config.demo_seconds),
        };

        world.insert_resource(Pellets::from_map(&map));
        world.insert_resource(map);
        world.insert_resource(BonusFruit::scheduled(&mut rng));
        world.insert_resource(rng);
        world.insert_resource(GameStage::Intro {
            remaining_ticks: settings.intro_ticks,
        });
        world.insert_resource(settings);
        world.insert_resource(PauseState::default());
        world.insert_resource(Autopilot(config.autopilot));
        world.insert_resource(Level(1));
        world.insert_resource(PlayerLives(config.lives));
        world.insert_resource(ScoreResource(0));
        world.insert_resource(HighScore(config.high_score));
        world.insert_resource(FrightTimer::default());
        world.insert_resource(ModeWaves::default());
        world.insert_resource(DeltaTime {
            seconds: SIM_DT,
            ticks: 0,
        });
    }

    fn spawn_entities(world: &mut World) {
        let multiplier = difficulty_multiplier(world.resource::<Level>().0);
        let mode = world.resource::<ModeWaves>().mode();
        let player = player_bundle(world.resource::<Map>(), multiplier);
        world.spawn(player);
        for ghost in Ghost::CLASSIC {
            world.spawn(ghost_bundle(ghost, mode, multiplier));
        }
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);

        schedule
            .add_systems((
                (player_control_system, handle_pause_command, start_command_system)
                    .chain()
                    .in_set(SimulationSet::Input),
                round_reset_system.in_set(SimulationSet::Setup),
                (pilot_system.run_if(pilot_enabled), ghost_decision_system)
                    .chain()
                    .in_set(SimulationSet::Decide),
                (player_movement_system, ghost_movement_system)
                    .chain()
                    .in_set(SimulationSet::Movement),
                (item_system, bonus_pickup_system).chain().in_set(SimulationSet::Consumption),
                (collision_system, ghost_collision_system)
                    .chain()
                    .in_set(SimulationSet::Collision),
                (eaten_arrival_system, fright_timer_system, mode_wave_system, bonus_timer_system)
                    .chain()
                    .in_set(SimulationSet::ModeTransitions),
                stage_system.in_set(SimulationSet::Stage),
                manage_pause_state_system.after(SimulationSet::Stage),
            ))
            .configure_sets(
                (
                    SimulationSet::Input,
                    SimulationSet::Setup,
                    SimulationSet::Decide.run_if(gameplay_active),
                    SimulationSet::Movement.run_if(gameplay_active),
                    SimulationSet::Consumption.run_if(gameplay_active),
                    SimulationSet::Collision.run_if(gameplay_active),
                    SimulationSet::ModeTransitions.run_if(gameplay_active),
                    SimulationSet::Stage.run_if(|pause: Res<PauseState>| !pause.active()),
                )
                    .chain(),
            );
    }

    /// Queues a command; it takes effect on the next physics step.
    pub fn send_command(&mut self, command: GameCommand) {
        debug!(?command, "Command received");
        self.world.send_event(GameEvent::from(command));
    }

    /// Feeds wall-clock time into the accumulator and runs every whole physics step it covers.
    ///
    /// `dt` is clamped so a stall cannot trigger a runaway catch-up. Negative or NaN
    /// frames count as zero.
    ///
    /// # Returns
    ///
    /// The number of physics steps executed.
    pub fn tick(&mut self, dt: f32) -> u32 {
        // NaN maps to zero so one bad frame cannot poison the accumulator
        self.accumulator += dt.max(0.0).min(MAX_FRAME_TIME);

        let mut steps = 0;
        while self.accumulator >= SIM_DT {
            self.step();
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }

    /// Runs exactly one physics step.
    pub fn step(&mut self) {
        formatter::increment_step();
        self.world.resource_mut::<DeltaTime>().ticks += 1;

        self.schedule.run(&mut self.world);

        let session_events = self.world.resource_mut::<Events<SessionEvent>>().drain().collect::<Vec<_>>();
        self.pending_events.extend(session_events);

        for error in self.world.resource_mut::<Events<crate::error::GameError>>().drain() {
            error!(%error, "Simulation error");
        }

        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<CollisionEvent>>().update();
        self.world.resource_mut::<Events<StageTransition>>().update();
        self.world.resource_mut::<Events<ResetRound>>().update();
    }

    /// Takes every session event produced since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn status(&self) -> Status {
        self.world.resource::<GameStage>().status()
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreResource>().0
    }

    pub fn high_score(&self) -> u32 {
        self.world.resource::<HighScore>().0
    }

    pub fn lives(&self) -> u8 {
        self.world.resource::<PlayerLives>().0
    }

    pub fn level(&self) -> u32 {
        self.world.resource::<Level>().0
    }

    /// Number of physics steps run so far.
    pub fn ticks(&self) -> u64 {
        self.world.resource::<DeltaTime>().ticks
    }

    /// Captures the current state for presentation.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the world does not hold exactly one player.
    pub fn snapshot(&mut self) -> GameResult<Snapshot> {
        let player = {
            let mut query = self.world.query_filtered::<(&Position, &Velocity), With<PlayerControlled>>();
            let (position, velocity) = query
                .single(&self.world)
                .map_err(|e| EntityError::Player(e.to_string()))?;
            EntitySnapshot {
                position: position.0,
                facing: velocity.direction,
            }
        };

        let mut ghosts: Vec<GhostSnapshot> = self
            .world
            .query_filtered::<(&Ghost, &GhostMode, &Position, &Velocity), Without<PlayerControlled>>()
            .iter(&self.world)
            .map(|(ghost, mode, position, velocity)| GhostSnapshot {
                ghost: *ghost,
                position: position.0,
                facing: velocity.direction,
                mode: *mode,
            })
            .collect();
        ghosts.sort_by_key(|snapshot| snapshot.ghost);

        Ok(Snapshot {
            player,
            ghosts,
            score: self.score(),
            high_score: self.high_score(),
            lives: self.lives(),
            level: self.level(),
            status: self.status(),
            bonus: self.world.resource::<BonusFruit>().active,
            items_remaining: self.world.resource::<Pellets>().remaining(),
        })
    }
}
