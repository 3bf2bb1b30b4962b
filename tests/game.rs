use glam::Vec2;
use maze_chase::config::GameConfig;
use maze_chase::constants::timing::{LEVEL_TRANSITION_TICKS, SIM_DT};
use maze_chase::constants::{score, tile_center};
use maze_chase::events::{GameCommand, SessionEvent};
use maze_chase::game::Game;
use maze_chase::map::direction::Direction;
use maze_chase::systems::components::{Ghost, GhostMode, PlayerControlled, Velocity};
use maze_chase::systems::level::{difficulty_multiplier, player_speed};
use maze_chase::systems::state::Status;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

/// A sealed cell for the player on the red ghost's spawn, with one unreachable item elsewhere.
const TRAP_BOARD: [&str; 11] = [
    "111111111111111111111", //
    "101111111111111111111", //
    "111111111111111111111", //
    "111111111111111111111", //
    "111111111111111111111", //
    "111111111111111111111", //
    "111111111111111111111", //
    "111111111111111111111", //
    "1111111111P1111111111", //
    "111111111111111111111", //
    "111111111111111111111", //
];

fn new_game(config: &GameConfig) -> Game {
    Game::new(config).expect("game should build")
}

fn run_steps(game: &mut Game, steps: u32) {
    for _ in 0..steps {
        game.step();
    }
}

fn player_velocity(game: &mut Game) -> Velocity {
    *game
        .world
        .query_filtered::<&Velocity, bevy_ecs::query::With<PlayerControlled>>()
        .single(&game.world)
        .expect("one player")
}

#[test]
fn test_new_game_starts_on_intro() {
    let mut game = new_game(&common::test_config());
    let snapshot = game.snapshot().expect("snapshot");

    assert_eq!(snapshot.status, Status::Intro);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.lives, 3);
    assert_eq!(snapshot.level, 1);
    assert_eq!(snapshot.items_remaining, 149);
    assert_that(&snapshot.bonus).is_none();
    assert_eq!(snapshot.player.position, tile_center(glam::IVec2::new(10, 16)));
    assert_eq!(snapshot.player.facing, Direction::Left);
    assert_eq!(
        snapshot.ghosts.iter().map(|ghost| ghost.ghost).collect::<Vec<_>>(),
        Ghost::CLASSIC.to_vec()
    );
    assert!(snapshot.ghosts.iter().all(|ghost| ghost.mode == GhostMode::Scatter));
}

#[test]
fn test_invalid_board_is_rejected() {
    let result = Game::with_board(&common::test_config(), &["111", "101", "111"]);
    assert_that(&result.is_err()).is_true();
}

#[test]
fn test_tick_runs_whole_steps() {
    let mut game = new_game(&common::test_config());

    assert_eq!(game.tick(SIM_DT * 5.4), 5);
    assert_eq!(game.ticks(), 5);
    assert_eq!(game.tick(0.0), 0);
    assert_eq!(game.tick(-1.0), 0);
}

#[test]
fn test_tick_recovers_from_nan_frame() {
    let mut game = new_game(&common::test_config());

    assert_eq!(game.tick(f32::NAN), 0);
    assert_eq!(game.tick(SIM_DT * 2.5), 2);
    assert_eq!(game.ticks(), 2);
}

#[test]
fn test_tick_clamps_long_frames() {
    let mut game = new_game(&common::test_config());

    // A multi-second stall only feeds a tenth of a second into the accumulator
    let steps = game.tick(3.0);
    assert_that(&steps).is_greater_than_or_equal_to(11);
    assert_that(&steps).is_less_than_or_equal_to(12);
}

#[test]
fn test_intro_rolls_into_demo() {
    let mut game = new_game(&common::test_config());

    run_steps(&mut game, 59);
    assert_eq!(game.status(), Status::Intro);
    run_steps(&mut game, 1);
    assert_eq!(game.status(), Status::Demo);

    assert_that(&game.drain_events()).contains(SessionEvent::StatusChanged {
        from: Status::Intro,
        to: Status::Demo,
    });
    assert_that(&game.drain_events()).is_empty();
}

#[test]
fn test_demo_pilot_moves_player() {
    let mut game = new_game(&common::test_config());
    run_steps(&mut game, 60 + 60);

    let snapshot = game.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, Status::Demo);
    assert_that(&snapshot.player.position).is_not_equal_to(tile_center(glam::IVec2::new(10, 16)));
    assert_that(&snapshot.score).is_greater_than_or_equal_to(score::PELLET);
}

#[test]
fn test_demo_ignores_player_commands() {
    let mut game = new_game(&common::test_config());
    run_steps(&mut game, 60);
    assert_eq!(game.status(), Status::Demo);

    game.send_command(GameCommand::MovePlayer(Direction::Right));
    run_steps(&mut game, 1);
    let snapshot = game.snapshot().expect("snapshot");
    assert_eq!(snapshot.player.facing, Direction::Left);
}

#[test]
fn test_start_command_enters_playing() {
    let mut game = new_game(&common::test_config());
    game.send_command(GameCommand::Start);
    game.step();

    assert_eq!(game.status(), Status::Playing);
    assert_eq!(
        game.drain_events(),
        vec![SessionEvent::StatusChanged {
            from: Status::Intro,
            to: Status::Playing
        }]
    );
}

#[test]
fn test_start_level_from_config() {
    let config = GameConfig {
        start_level: 20,
        ..common::test_config()
    };
    let mut game = new_game(&config);
    game.send_command(GameCommand::Start);
    game.step();

    assert_eq!(game.level(), 20);
    assert_eq!(player_velocity(&mut game).speed, player_speed(difficulty_multiplier(20)));
}

#[test]
fn test_user_pause_and_single_step() {
    let mut game = new_game(&common::test_config());
    game.send_command(GameCommand::Start);
    run_steps(&mut game, 2);

    game.send_command(GameCommand::TogglePause);
    game.step();
    let frozen = game.snapshot().expect("snapshot");
    run_steps(&mut game, 20);
    assert_eq!(game.snapshot().expect("snapshot"), frozen);

    game.send_command(GameCommand::SingleStep);
    game.step();
    let stepped = game.snapshot().expect("snapshot");
    assert_that(&stepped.player.position.x).is_less_than(frozen.player.position.x);

    run_steps(&mut game, 20);
    assert_eq!(game.snapshot().expect("snapshot"), stepped);

    game.send_command(GameCommand::TogglePause);
    game.step();
    assert_that(&game.snapshot().expect("snapshot").player.position.x).is_less_than(stepped.player.position.x);
}

#[test]
fn test_same_seed_same_run() {
    let run = || {
        let mut game = new_game(&common::test_config());
        run_steps(&mut game, 30);
        game.send_command(GameCommand::Start);
        game.send_command(GameCommand::MovePlayer(Direction::Right));
        let mut events = Vec::new();
        for _ in 0..1200 {
            game.tick(SIM_DT);
            events.extend(game.drain_events());
        }
        (game.snapshot().expect("snapshot"), events, game.ticks())
    };

    assert_eq!(run(), run());
}

#[test]
fn test_clearing_board_advances_level() {
    let mut game = Game::with_board(&common::test_config(), &common::CORRIDOR_BOARD).expect("game should build");
    game.send_command(GameCommand::Start);
    game.step();
    game.send_command(GameCommand::MovePlayer(Direction::Right));

    let mut steps = 0;
    while game.status() == Status::Playing && steps < 300 {
        game.step();
        steps += 1;
    }

    assert_eq!(game.status(), Status::LevelTransition);
    assert_eq!(game.score(), 2 * score::PELLET + score::POWER_PELLET);
    assert_that(&game.drain_events()).contains(SessionEvent::LevelCleared { level: 1 });

    run_steps(&mut game, LEVEL_TRANSITION_TICKS);
    assert_eq!(game.status(), Status::Playing);
    assert_eq!(game.level(), 2);

    game.step();
    let snapshot = game.snapshot().expect("snapshot");
    assert_eq!(snapshot.items_remaining, 3);
    assert_eq!(snapshot.player.position, Vec2::new(1.5, 1.5));
    assert_eq!(player_velocity(&mut game).speed, player_speed(difficulty_multiplier(2)));
}

#[test]
fn test_caught_on_last_life_ends_game() {
    let config = GameConfig {
        lives: 1,
        high_score: 500,
        ..common::test_config()
    };
    let mut game = Game::with_board(&config, &TRAP_BOARD).expect("game should build");
    game.send_command(GameCommand::Start);
    game.step();

    assert_eq!(game.status(), Status::GameOver);
    assert_eq!(game.lives(), 0);
    assert_eq!(game.high_score(), 500);
    assert_eq!(
        game.drain_events(),
        vec![
            SessionEvent::StatusChanged {
                from: Status::Intro,
                to: Status::Playing
            },
            SessionEvent::LifeLost { remaining: 0 },
            SessionEvent::GameOver {
                score: 0,
                new_high_score: false
            },
            SessionEvent::StatusChanged {
                from: Status::Playing,
                to: Status::GameOver
            },
        ]
    );

    // Nothing happens until a new session is started
    run_steps(&mut game, 100);
    assert_eq!(game.status(), Status::GameOver);

    game.send_command(GameCommand::Start);
    game.step();
    assert_that(&game.drain_events()).contains(SessionEvent::StatusChanged {
        from: Status::GameOver,
        to: Status::Playing,
    });
    assert_eq!(game.status(), Status::GameOver);
    assert_eq!(game.lives(), 0);
}
