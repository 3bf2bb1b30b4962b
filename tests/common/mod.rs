#![allow(dead_code)]

use bevy_ecs::{entity::Entity, event::Events, world::World};
use glam::{IVec2, Vec2};
use maze_chase::{
    config::{seeded_config, GameConfig},
    constants::{tile_center, timing::SIM_DT, RAW_BOARD},
    error::GameError,
    events::{CollisionEvent, GameCommand, GameEvent, ResetRound, SessionEvent, StageTransition},
    map::{builder::Map, direction::Direction},
    systems::{
        components::{
            Autopilot, DeltaTime, GameRng, Ghost, GhostMode, HighScore, Level, PlayerLives, Position, ScoreResource,
            Velocity,
        },
        ghost::{FrightTimer, ModeWaves},
        item::{BonusFruit, Pellets},
        level::difficulty_multiplier,
        state::{ghost_bundle, player_bundle, GameStage, PauseState, SessionSettings},
    },
};

/// A 7x5 box with a horizontal tunnel through the middle row.
pub const TUNNEL_BOARD: [&str; 5] = [
    "1111111", //
    "1000001", //
    "300P003", //
    "1000001", //
    "1111111", //
];

/// A single dead-end corridor: the player starts at the closed west end.
pub const CORRIDOR_BOARD: [&str; 3] = [
    "111111", //
    "1P0021", //
    "111111", //
];

/// Creates a basic test world on the given board with every resource the systems need.
///
/// The stage starts in PLAYING so gameplay systems can be exercised directly.
pub fn create_test_world(board: &[&str]) -> World {
    let mut world = World::new();
    let map = Map::new(board).expect("test board should build");
    let mut rng = GameRng::seeded(7);

    world.insert_resource(Events::<GameEvent>::default());
    world.insert_resource(Events::<GameError>::default());
    world.insert_resource(Events::<CollisionEvent>::default());
    world.insert_resource(Events::<StageTransition>::default());
    world.insert_resource(Events::<ResetRound>::default());
    world.insert_resource(Events::<SessionEvent>::default());

    world.insert_resource(Pellets::from_map(&map));
    world.insert_resource(map);
    world.insert_resource(BonusFruit::scheduled(&mut rng));
    world.insert_resource(rng);
    world.insert_resource(GameStage::Playing);
    world.insert_resource(SessionSettings {
        starting_lives: 3,
        start_level: 1,
        intro_ticks: 10,
        demo_ticks: 20,
    });
    world.insert_resource(PauseState::default());
    world.insert_resource(Autopilot(false));
    world.insert_resource(Level(1));
    world.insert_resource(PlayerLives(3));
    world.insert_resource(ScoreResource(0));
    world.insert_resource(HighScore(0));
    world.insert_resource(FrightTimer::default());
    world.insert_resource(ModeWaves::default());
    world.insert_resource(DeltaTime {
        seconds: SIM_DT,
        ticks: 1,
    });

    world
}

/// Creates a test world on the standard board.
pub fn create_standard_world() -> World {
    create_test_world(&RAW_BOARD)
}

/// Spawns the player at its start tile, then moves it to `position` facing `direction`.
pub fn spawn_test_player(world: &mut World, position: Vec2, direction: Direction) -> Entity {
    let map = world.resource::<Map>().clone();
    let mut bundle = player_bundle(&map, difficulty_multiplier(1));
    bundle.position = Position(position);
    bundle.velocity.direction = direction;
    bundle.buffered_direction.0 = direction;
    world.spawn(bundle).id()
}

/// Spawns a ghost in `mode` at the center of `tile`, facing `direction`.
pub fn spawn_test_ghost(world: &mut World, ghost: Ghost, mode: GhostMode, tile: IVec2, direction: Direction) -> Entity {
    let mut bundle = ghost_bundle(ghost, mode, difficulty_multiplier(1));
    bundle.position = Position(tile_center(tile));
    bundle.velocity.direction = direction;
    bundle.buffered_direction.0 = direction;
    world.spawn(bundle).id()
}

pub fn ghost_mode(world: &World, entity: Entity) -> GhostMode {
    *world.get::<GhostMode>(entity).expect("ghost should exist")
}

pub fn velocity(world: &World, entity: Entity) -> Velocity {
    *world.get::<Velocity>(entity).expect("entity should have a velocity")
}

pub fn position(world: &World, entity: Entity) -> Vec2 {
    world.get::<Position>(entity).expect("entity should have a position").0
}

/// Sends a command to the world
pub fn send_command(world: &mut World, command: GameCommand) {
    world.send_event(GameEvent::from(command));
}

/// Takes all session events written so far.
pub fn drain_session_events(world: &mut World) -> Vec<SessionEvent> {
    world.resource_mut::<Events<SessionEvent>>().drain().collect()
}

/// A reproducible configuration with short attract timers.
pub fn test_config() -> GameConfig {
    GameConfig {
        intro_seconds: 0.5,
        demo_seconds: 1.0,
        ..seeded_config(1234)
    }
}
